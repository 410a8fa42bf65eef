use crate::domain::value_objects::{EntityId, EntityType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fan-out record for "something changed while you weren't looking".
///
/// Created by a live-subscription update or by the queue's post-drain hook;
/// consumed by marking it read. Never deleted automatically, only displaced
/// by the retention bound.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: String,
    pub entity_id: EntityId,
    pub entity_type: EntityType,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub message: String,
}

impl Notification {
    pub fn new(
        entity_type: EntityType,
        entity_id: EntityId,
        message: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            entity_id,
            entity_type,
            read: false,
            created_at,
            message,
        }
    }
}
