use crate::application::ports::{LocalStore, RemoteDocument, RemoteStore};
use crate::domain::entities::LockEntry;
use crate::domain::value_objects::EntityId;
use crate::shared::clock::Clock;
use crate::shared::config::CacheConfig;
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const LOCK_CACHE_PREFIX: &str = "lock_cache:";

/// Short-TTL read-through cache for work-item lock state, fronting the
/// expensive remote authorization check so UI gating can happen without a
/// network round trip on every render.
///
/// Expiry is evaluated lazily on read; there is no background sweep. An
/// expired entry is indistinguishable from an absent one.
#[derive(Clone)]
pub struct LockCacheService {
    remote: Arc<dyn RemoteStore>,
    local: Arc<dyn LocalStore>,
    clock: Arc<dyn Clock>,
    config: CacheConfig,
    entries: Arc<RwLock<HashMap<String, LockEntry>>>,
    hydrated: Arc<OnceCell<()>>,
}

impl LockCacheService {
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        local: Arc<dyn LocalStore>,
        clock: Arc<dyn Clock>,
        config: CacheConfig,
    ) -> Self {
        Self {
            remote,
            local,
            clock,
            config,
            entries: Arc::new(RwLock::new(HashMap::new())),
            hydrated: Arc::new(OnceCell::new()),
        }
    }

    /// Serve from cache, or nothing. Never returns an entry at or past the
    /// TTL, regardless of whether the remote state actually changed.
    pub async fn get(&self, id: &str) -> Option<LockEntry> {
        self.hydrate().await;
        let entries = self.entries.read().await;
        entries
            .get(id)
            .filter(|entry| !entry.is_expired(self.clock.now(), self.ttl()))
            .cloned()
    }

    /// Perform the remote authorization check and cache the result.
    ///
    /// Cancellation before the remote call resolves yields no result and no
    /// cache mutation. A missing remote document also yields no result.
    pub async fn check_lock_state(
        &self,
        id: &str,
        token: &CancellationToken,
    ) -> Result<Option<LockEntry>, AppError> {
        self.hydrate().await;

        if token.is_cancelled() {
            debug!(entity = id, "lock check cancelled before dispatch");
            return Ok(None);
        }

        let limit = std::time::Duration::from_secs(self.config.check_timeout_secs);
        let fetched = tokio::select! {
            _ = token.cancelled() => {
                debug!(entity = id, "lock check cancelled in flight");
                return Ok(None);
            }
            result = tokio::time::timeout(
                limit,
                self.remote.get_document(&self.config.lock_collection, id),
            ) => match result {
                Ok(outcome) => outcome?,
                Err(_) => {
                    return Err(AppError::Network(format!(
                        "lock check timed out after {}s",
                        self.config.check_timeout_secs
                    )));
                }
            },
        };

        let Some(doc) = fetched else {
            debug!(entity = id, "no remote lock document");
            return Ok(None);
        };

        let entry = Self::entry_from_document(id, &doc, self.clock.now())?;
        {
            let mut entries = self.entries.write().await;
            entries.insert(id.to_string(), entry.clone());
        }
        self.local
            .set(
                &format!("{LOCK_CACHE_PREFIX}{id}"),
                serde_json::to_string(&entry)?,
            )
            .await?;

        Ok(Some(entry))
    }

    /// Warm the cache for a screen listing many work items at once. One bad
    /// id never fails the batch.
    pub async fn prefetch_lock_states(&self, ids: &[String]) {
        let token = CancellationToken::new();
        let checks = ids.iter().map(|id| {
            let service = self.clone();
            let token = token.clone();
            let id = id.clone();
            async move {
                if let Err(err) = service.check_lock_state(&id, &token).await {
                    warn!(entity = %id, error = %err, "lock state prefetch failed");
                }
            }
        });
        futures::future::join_all(checks).await;
    }

    pub async fn invalidate(&self, id: &str) -> Result<(), AppError> {
        self.hydrate().await;
        self.entries.write().await.remove(id);
        self.local.remove(&format!("{LOCK_CACHE_PREFIX}{id}")).await
    }

    /// Idempotent: clearing an empty cache is a no-op.
    pub async fn clear_all(&self) -> Result<(), AppError> {
        self.hydrate().await;
        self.entries.write().await.clear();

        let keys: Vec<String> = self
            .local
            .get_all_keys()
            .await?
            .into_iter()
            .filter(|key| key.starts_with(LOCK_CACHE_PREFIX))
            .collect();
        if !keys.is_empty() {
            self.local.multi_remove(&keys).await?;
        }
        Ok(())
    }

    pub async fn cached_count(&self) -> usize {
        self.entries.read().await.len()
    }

    fn ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.config.lock_ttl_secs as i64)
    }

    /// Locked unless the item has ever been approved; approval permanently
    /// unlocks it regardless of the current status.
    fn entry_from_document(
        id: &str,
        doc: &RemoteDocument,
        now: DateTime<Utc>,
    ) -> Result<LockEntry, AppError> {
        let status = doc
            .data
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        let ever_approved = doc
            .data
            .get("ever_approved")
            .and_then(Value::as_bool)
            .unwrap_or(false)
            || status == "approved";
        let access_requested = doc
            .data
            .get("access_requested")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Ok(LockEntry {
            entity_id: EntityId::new(id.to_string()).map_err(AppError::InvalidInput)?,
            is_locked: !ever_approved,
            ever_approved,
            access_requested,
            status,
            cached_at: now,
        })
    }

    async fn hydrate(&self) {
        self.hydrated
            .get_or_init(|| async {
                let keys: Vec<String> = match self.local.get_all_keys().await {
                    Ok(keys) => keys
                        .into_iter()
                        .filter(|key| key.starts_with(LOCK_CACHE_PREFIX))
                        .collect(),
                    Err(err) => {
                        warn!(error = %err, "failed to enumerate persisted lock entries");
                        return;
                    }
                };
                if keys.is_empty() {
                    return;
                }

                let pairs = match self.local.multi_get(&keys).await {
                    Ok(pairs) => pairs,
                    Err(err) => {
                        warn!(error = %err, "failed to read persisted lock entries");
                        return;
                    }
                };

                let mut entries = self.entries.write().await;
                for (key, value) in pairs {
                    let Some(raw) = value else { continue };
                    match serde_json::from_str::<LockEntry>(&raw) {
                        Ok(entry) => {
                            entries.insert(entry.entity_id.as_str().to_string(), entry);
                        }
                        Err(err) => {
                            warn!(%key, error = %err, "corrupt persisted lock entry, skipping");
                        }
                    }
                }
            })
            .await;
    }
}
