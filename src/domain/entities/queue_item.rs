use crate::domain::value_objects::{
    EntityId, EntityType, MutationPayload, Priority, QueueItemId, QueueItemStatus,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The write the queue will replay against the remote store.
///
/// Create and Update both resolve to a document set (last-writer-wins at the
/// document level), so replaying either is idempotent by id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueueOperation {
    Create { payload: MutationPayload },
    Update { payload: MutationPayload },
    Delete,
}

impl QueueOperation {
    pub fn payload(&self) -> Option<&MutationPayload> {
        match self {
            QueueOperation::Create { payload } | QueueOperation::Update { payload } => {
                Some(payload)
            }
            QueueOperation::Delete => None,
        }
    }
}

/// One pending or failed mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueueItem {
    pub id: QueueItemId,
    pub operation: QueueOperation,
    pub entity_type: EntityType,
    pub entity_id: EntityId,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub retry_count: u32,
    pub last_error: Option<String>,
    pub status: QueueItemStatus,
}

impl QueueItem {
    pub fn new(
        operation: QueueOperation,
        entity_type: EntityType,
        entity_id: EntityId,
        priority: Priority,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: QueueItemId::generate(),
            operation,
            entity_type,
            entity_id,
            priority,
            created_at,
            retry_count: 0,
            last_error: None,
            status: QueueItemStatus::Pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == QueueItemStatus::Pending
    }

    pub fn is_failed(&self) -> bool {
        self.status == QueueItemStatus::Failed
    }

    pub fn record_failure(&mut self, error: String, max_retries: u32) {
        self.retry_count += 1;
        self.last_error = Some(error);
        self.status = if self.retry_count >= max_retries {
            QueueItemStatus::Failed
        } else {
            QueueItemStatus::Pending
        };
    }

    pub fn reset_for_retry(&mut self) {
        self.retry_count = 0;
        self.last_error = None;
        self.status = QueueItemStatus::Pending;
    }
}
