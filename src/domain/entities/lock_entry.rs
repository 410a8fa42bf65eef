use crate::domain::value_objects::EntityId;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// TTL-bound snapshot of a work item's remote authorization state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LockEntry {
    pub entity_id: EntityId,
    pub is_locked: bool,
    pub ever_approved: bool,
    pub access_requested: bool,
    /// Raw remote status string, kept for diagnostics.
    pub status: String,
    pub cached_at: DateTime<Utc>,
}

impl LockEntry {
    /// An entry at or past the TTL must be treated as absent.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.cached_at >= ttl
    }
}
