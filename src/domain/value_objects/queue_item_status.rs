use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueItemStatus {
    Pending,
    Syncing,
    Failed,
}

impl QueueItemStatus {
    pub fn as_str(&self) -> &str {
        match self {
            QueueItemStatus::Pending => "pending",
            QueueItemStatus::Syncing => "syncing",
            QueueItemStatus::Failed => "failed",
        }
    }
}

impl From<&str> for QueueItemStatus {
    fn from(value: &str) -> Self {
        match value {
            "syncing" => QueueItemStatus::Syncing,
            "failed" => QueueItemStatus::Failed,
            _ => QueueItemStatus::Pending,
        }
    }
}
