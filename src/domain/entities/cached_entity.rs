use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Remote,
    Local,
}

/// The freshest known copy of an entity, as judged by timestamp comparison.
///
/// Replaced wholesale on every reconciliation; never merged field-by-field.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedEntity<T> {
    pub data: T,
    pub timestamp: DateTime<Utc>,
    pub source: DataSource,
    pub is_fresh: bool,
}

/// Serialized envelope stored in the local store under `entity_cache:{key}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedRecord {
    pub data: Value,
    pub timestamp: DateTime<Utc>,
}

impl CachedRecord {
    pub fn new(data: Value, timestamp: DateTime<Utc>) -> Self {
        Self { data, timestamp }
    }
}
