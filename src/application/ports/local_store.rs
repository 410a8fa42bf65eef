use crate::shared::error::AppError;
use async_trait::async_trait;

/// Durable key-value storage surviving process restarts.
///
/// Keys are namespaced per owning service (`sync_queue:*`, `entity_cache:*`,
/// `notifications:*`, `lock_cache:*`); no service writes outside its own
/// namespace.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn set(&self, key: &str, value: String) -> Result<(), AppError>;
    async fn remove(&self, key: &str) -> Result<(), AppError>;
    async fn multi_get(&self, keys: &[String]) -> Result<Vec<(String, Option<String>)>, AppError>;
    async fn multi_remove(&self, keys: &[String]) -> Result<(), AppError>;
    async fn get_all_keys(&self) -> Result<Vec<String>, AppError>;
}
