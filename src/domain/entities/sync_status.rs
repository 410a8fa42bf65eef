use crate::domain::entities::queue_item::QueueItem;
use crate::domain::value_objects::Priority;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate queue state for UI display. Derived, never persisted;
/// recomputed after every mutation to the queue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncStatusSnapshot {
    pub pending_count: u32,
    pub failed_count: u32,
    pub p0_count: u32,
    pub p1_count: u32,
    pub p2_count: u32,
    pub p3_count: u32,
    pub is_syncing: bool,
    pub last_sync_time: Option<DateTime<Utc>>,
}

impl SyncStatusSnapshot {
    pub fn compute(
        items: &[QueueItem],
        is_syncing: bool,
        last_sync_time: Option<DateTime<Utc>>,
    ) -> Self {
        let mut snapshot = Self {
            is_syncing,
            last_sync_time,
            ..Self::default()
        };

        for item in items {
            if item.is_failed() {
                snapshot.failed_count += 1;
                continue;
            }
            snapshot.pending_count += 1;
            match item.priority {
                Priority::P0 => snapshot.p0_count += 1,
                Priority::P1 => snapshot.p1_count += 1,
                Priority::P2 => snapshot.p2_count += 1,
                Priority::P3 => snapshot.p3_count += 1,
            }
        }

        snapshot
    }
}
