use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

pub const UNSET_TS: u64 = 0;

/// Lock-free counters for queue drain activity.
#[derive(Debug)]
pub struct DrainMetrics {
    items_synced: AtomicU64,
    items_failed: AtomicU64,
    drains_completed: AtomicU64,
    last_drain_ms: AtomicU64,
}

#[derive(Debug, Clone, Copy)]
pub struct DrainSnapshot {
    pub items_synced: u64,
    pub items_failed: u64,
    pub drains_completed: u64,
    pub last_drain_ms: Option<u64>,
}

impl DrainMetrics {
    pub const fn new() -> Self {
        Self {
            items_synced: AtomicU64::new(0),
            items_failed: AtomicU64::new(0),
            drains_completed: AtomicU64::new(0),
            last_drain_ms: AtomicU64::new(UNSET_TS),
        }
    }

    pub fn record_synced(&self, count: u64) {
        self.items_synced.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_failed(&self, count: u64) {
        self.items_failed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_drain(&self) {
        self.drains_completed.fetch_add(1, Ordering::Relaxed);
        self.last_drain_ms
            .store(current_unix_ms(), Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DrainSnapshot {
        DrainSnapshot {
            items_synced: self.items_synced.load(Ordering::Relaxed),
            items_failed: self.items_failed.load(Ordering::Relaxed),
            drains_completed: self.drains_completed.load(Ordering::Relaxed),
            last_drain_ms: timestamp_to_option(self.last_drain_ms.load(Ordering::Relaxed)),
        }
    }

    pub fn reset(&self) {
        self.items_synced.store(0, Ordering::Relaxed);
        self.items_failed.store(0, Ordering::Relaxed);
        self.drains_completed.store(0, Ordering::Relaxed);
        self.last_drain_ms.store(UNSET_TS, Ordering::Relaxed);
    }
}

impl Default for DrainMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
pub fn current_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or(UNSET_TS)
}

#[inline]
pub fn timestamp_to_option(value: u64) -> Option<u64> {
    if value == UNSET_TS {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_recorded_counts() {
        let metrics = DrainMetrics::new();
        metrics.record_synced(3);
        metrics.record_failed(1);
        metrics.record_drain();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.items_synced, 3);
        assert_eq!(snapshot.items_failed, 1);
        assert_eq!(snapshot.drains_completed, 1);
        assert!(snapshot.last_drain_ms.is_some());
    }

    #[test]
    fn test_reset_clears_everything() {
        let metrics = DrainMetrics::new();
        metrics.record_synced(2);
        metrics.record_drain();
        metrics.reset();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.items_synced, 0);
        assert_eq!(snapshot.drains_completed, 0);
        assert!(snapshot.last_drain_ms.is_none());
    }
}
