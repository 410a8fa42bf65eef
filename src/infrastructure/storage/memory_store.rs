use crate::application::ports::LocalStore;
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory `LocalStore`. Not durable; used in tests and as a fallback when
/// no database path is available.
#[derive(Clone, Default)]
pub struct MemoryLocalStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl LocalStore for MemoryLocalStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), AppError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn multi_get(&self, keys: &[String]) -> Result<Vec<(String, Option<String>)>, AppError> {
        let entries = self.entries.read().await;
        Ok(keys
            .iter()
            .map(|key| (key.clone(), entries.get(key).cloned()))
            .collect())
    }

    async fn multi_remove(&self, keys: &[String]) -> Result<(), AppError> {
        let mut entries = self.entries.write().await;
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }

    async fn get_all_keys(&self) -> Result<Vec<String>, AppError> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove_round_trip() {
        let store = MemoryLocalStore::new();
        store.set("a", "1".into()).await.unwrap();
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("1"));

        store.remove("a").await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_multi_get_preserves_key_order_with_gaps() {
        let store = MemoryLocalStore::new();
        store.set("a", "1".into()).await.unwrap();
        store.set("c", "3".into()).await.unwrap();

        let result = store
            .multi_get(&["a".into(), "b".into(), "c".into()])
            .await
            .unwrap();
        assert_eq!(
            result,
            vec![
                ("a".to_string(), Some("1".to_string())),
                ("b".to_string(), None),
                ("c".to_string(), Some("3".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn test_multi_remove_ignores_missing_keys() {
        let store = MemoryLocalStore::new();
        store.set("a", "1".into()).await.unwrap();
        store
            .multi_remove(&["a".into(), "missing".into()])
            .await
            .unwrap();
        assert!(store.is_empty().await);
    }
}
