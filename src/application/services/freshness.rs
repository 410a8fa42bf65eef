use crate::application::ports::{
    ConnectivityMonitor, LocalStore, RemoteDocument, RemoteStore, SyncEventSink,
};
use crate::domain::entities::{CachedEntity, CachedRecord, DataSource, Notification, QueueItem};
use crate::domain::value_objects::{EntityId, EntityType};
use crate::shared::clock::Clock;
use crate::shared::config::NotificationConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, OnceCell};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Sentinel subscription key returned when a subscription is requested while
/// offline. Safe to pass back to `unsubscribe_from_document`.
pub const OFFLINE_SKIP_KEY: &str = "offline_skip";

const ENTITY_CACHE_PREFIX: &str = "entity_cache:";
const NOTIFICATIONS_KEY: &str = "notifications:items";

/// Bound on the remote subscription handshake.
const SUBSCRIBE_TIMEOUT_SECS: u64 = 30;

/// Inputs for one reconciliation decision.
pub struct FreshnessParams<T> {
    pub remote_data: Option<T>,
    pub remote_timestamp: Option<DateTime<Utc>>,
    pub local_key: String,
    /// Tie-break when remote and local carry the same timestamp.
    pub prefer: DataSource,
}

/// Read-side reconciler: decides, per entity, whether the remote copy or the
/// locally cached copy is authoritative, by timestamp rather than by source.
///
/// A naive "always prefer remote" would regress optimistic local writes; a
/// naive "always prefer local" would never surface external updates.
#[derive(Clone)]
pub struct FreshnessService {
    remote: Arc<dyn RemoteStore>,
    local: Arc<dyn LocalStore>,
    connectivity: Arc<dyn ConnectivityMonitor>,
    clock: Arc<dyn Clock>,
    config: NotificationConfig,
    notifications: Arc<Mutex<VecDeque<Notification>>>,
    notification_tx: broadcast::Sender<Notification>,
    key_locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
    subscriptions: Arc<Mutex<HashMap<String, JoinHandle<()>>>>,
    hydrated: Arc<OnceCell<()>>,
}

impl FreshnessService {
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        local: Arc<dyn LocalStore>,
        connectivity: Arc<dyn ConnectivityMonitor>,
        clock: Arc<dyn Clock>,
        config: NotificationConfig,
    ) -> Self {
        let (notification_tx, _rx) = broadcast::channel(64);
        Self {
            remote,
            local,
            connectivity,
            clock,
            config,
            notifications: Arc::new(Mutex::new(VecDeque::new())),
            notification_tx,
            key_locks: Arc::new(Mutex::new(HashMap::new())),
            subscriptions: Arc::new(Mutex::new(HashMap::new())),
            hydrated: Arc::new(OnceCell::new()),
        }
    }

    /// Return the freshest known copy of an entity.
    ///
    /// A winning remote copy becomes the new local baseline. A local-sourced
    /// result is always flagged `is_fresh = false` so the caller can decide
    /// whether to show a staleness indicator. Both sides absent is an empty
    /// result, not an error.
    pub async fn get_freshest_data<T>(
        &self,
        params: FreshnessParams<T>,
    ) -> Result<Option<CachedEntity<T>>, AppError>
    where
        T: Serialize + DeserializeOwned,
    {
        let storage_key = format!("{ENTITY_CACHE_PREFIX}{}", params.local_key);
        let prefer = params.prefer;
        let guard = self.key_lock(&params.local_key).await;
        let _guard = guard.lock().await;

        let local = self.read_local_record(&storage_key).await?;

        match (params.remote_data, params.remote_timestamp) {
            (Some(data), Some(remote_ts))
                if Self::remote_wins(remote_ts, local.as_ref(), prefer) =>
            {
                let record = CachedRecord::new(serde_json::to_value(&data)?, remote_ts);
                self.local
                    .set(&storage_key, serde_json::to_string(&record)?)
                    .await?;
                Ok(Some(CachedEntity {
                    data,
                    timestamp: remote_ts,
                    source: DataSource::Remote,
                    is_fresh: true,
                }))
            }
            _ => match local {
                Some(record) => {
                    let data: T = serde_json::from_value(record.data)?;
                    Ok(Some(CachedEntity {
                        data,
                        timestamp: record.timestamp,
                        source: DataSource::Local,
                        is_fresh: false,
                    }))
                }
                None => Ok(None),
            },
        }
    }

    /// Open a live subscription for one document. Offline at call time is a
    /// sentinel no-op; the caller polls or waits for the next online
    /// transition. One subscription per `(collection, id)` — a second call
    /// replaces the first.
    pub async fn subscribe_to_document<T, F>(
        &self,
        collection: &str,
        id: &str,
        local_key: &str,
        on_update: F,
    ) -> Result<String, AppError>
    where
        T: DeserializeOwned + Send + 'static,
        F: Fn(T, DateTime<Utc>) + Send + Sync + 'static,
    {
        self.hydrate().await;

        if !self.connectivity.fetch().await.is_connected {
            debug!(collection, id, "offline, skipping document subscription");
            return Ok(OFFLINE_SKIP_KEY.to_string());
        }

        let key = subscription_key(collection, id);
        let mut stream = tokio::time::timeout(
            std::time::Duration::from_secs(SUBSCRIBE_TIMEOUT_SECS),
            self.remote.subscribe(collection, id),
        )
        .await
        .map_err(|_| {
            AppError::Network(format!(
                "subscription setup timed out after {SUBSCRIBE_TIMEOUT_SECS}s"
            ))
        })??;

        let service = self.clone();
        let collection = collection.to_string();
        let id = id.to_string();
        let local_key = local_key.to_string();
        let task = tokio::spawn(async move {
            while let Some(doc) = stream.next().await {
                if let Err(err) = service
                    .apply_remote_update(&collection, &id, &local_key, doc, &on_update)
                    .await
                {
                    warn!(%collection, %id, error = %err, "failed to apply subscription update");
                }
            }
        });

        let mut subscriptions = self.subscriptions.lock().await;
        if let Some(previous) = subscriptions.insert(key.clone(), task) {
            previous.abort();
        }
        Ok(key)
    }

    /// Idempotent; safe on an already-closed or sentinel key.
    pub async fn unsubscribe_from_document(&self, key: &str) {
        if key == OFFLINE_SKIP_KEY {
            return;
        }
        let mut subscriptions = self.subscriptions.lock().await;
        if let Some(task) = subscriptions.remove(key) {
            task.abort();
        }
    }

    pub async fn active_subscription_count(&self) -> usize {
        self.subscriptions.lock().await.len()
    }

    /// Fan-out channel for "something changed while you weren't looking".
    /// Separate from per-document subscriptions.
    pub fn subscribe_to_notifications(&self) -> broadcast::Receiver<Notification> {
        self.notification_tx.subscribe()
    }

    pub async fn list_notifications(&self) -> Vec<Notification> {
        self.hydrate().await;
        self.notifications.lock().await.iter().cloned().collect()
    }

    /// No-op when the id is unknown: the notification may already have been
    /// displaced by the retention bound.
    pub async fn mark_notification_as_read(&self, id: &str) -> Result<(), AppError> {
        self.hydrate().await;
        let mut notifications = self.notifications.lock().await;
        match notifications.iter_mut().find(|n| n.id == id) {
            Some(notification) => notification.read = true,
            None => {
                debug!(id, "notification not found, already displaced");
                return Ok(());
            }
        }
        self.persist_notifications(&notifications).await
    }

    pub async fn publish_notification(
        &self,
        entity_type: EntityType,
        entity_id: EntityId,
        message: impl Into<String>,
    ) -> Result<Notification, AppError> {
        self.hydrate().await;
        let notification =
            Notification::new(entity_type, entity_id, message.into(), self.clock.now());
        {
            let mut notifications = self.notifications.lock().await;
            notifications.push_back(notification.clone());
            while notifications.len() > self.config.retention {
                notifications.pop_front();
            }
            self.persist_notifications(&notifications).await?;
        }
        let _ = self.notification_tx.send(notification.clone());
        Ok(notification)
    }

    async fn apply_remote_update<T, F>(
        &self,
        collection: &str,
        id: &str,
        local_key: &str,
        doc: RemoteDocument,
        on_update: &F,
    ) -> Result<(), AppError>
    where
        T: DeserializeOwned,
        F: Fn(T, DateTime<Utc>),
    {
        {
            let guard = self.key_lock(local_key).await;
            let _guard = guard.lock().await;

            let record = CachedRecord::new(doc.data.clone(), doc.updated_at);
            self.local
                .set(
                    &format!("{ENTITY_CACHE_PREFIX}{local_key}"),
                    serde_json::to_string(&record)?,
                )
                .await?;

            match serde_json::from_value::<T>(doc.data) {
                Ok(data) => on_update(data, doc.updated_at),
                Err(err) => warn!(collection, id, error = %err, "subscription payload decode failed"),
            }
        }

        let entity_type = EntityType::new(collection.to_string()).map_err(AppError::InvalidInput)?;
        let entity_id = EntityId::new(id.to_string()).map_err(AppError::InvalidInput)?;
        self.publish_notification(entity_type, entity_id, "Updated remotely while open")
            .await?;
        Ok(())
    }

    fn remote_wins(
        remote_ts: DateTime<Utc>,
        local: Option<&CachedRecord>,
        prefer: DataSource,
    ) -> bool {
        match local {
            Some(record) => {
                remote_ts > record.timestamp
                    || (remote_ts == record.timestamp && prefer == DataSource::Remote)
            }
            None => true,
        }
    }

    async fn read_local_record(&self, storage_key: &str) -> Result<Option<CachedRecord>, AppError> {
        match self.local.get(storage_key).await? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(record) => Ok(Some(record)),
                Err(err) => {
                    warn!(key = storage_key, error = %err, "corrupt cached record, ignoring");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn key_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.key_locks.lock().await;
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn hydrate(&self) {
        self.hydrated
            .get_or_init(|| async {
                let loaded: VecDeque<Notification> = match self.local.get(NOTIFICATIONS_KEY).await {
                    Ok(Some(raw)) => match serde_json::from_str(&raw) {
                        Ok(list) => list,
                        Err(err) => {
                            warn!(error = %err, "persisted notifications corrupt, starting empty");
                            VecDeque::new()
                        }
                    },
                    Ok(None) => VecDeque::new(),
                    Err(err) => {
                        warn!(error = %err, "failed to read persisted notifications");
                        VecDeque::new()
                    }
                };
                *self.notifications.lock().await = loaded;
            })
            .await;
    }

    async fn persist_notifications(
        &self,
        notifications: &VecDeque<Notification>,
    ) -> Result<(), AppError> {
        let raw = serde_json::to_string(notifications)?;
        self.local.set(NOTIFICATIONS_KEY, raw).await
    }
}

/// The queue's post-drain hook: surface completed high-priority syncs so
/// visible screens know to refetch.
#[async_trait]
impl SyncEventSink for FreshnessService {
    async fn mutations_synced(&self, items: &[QueueItem]) {
        for item in items.iter().filter(|item| item.priority.is_high()) {
            let message = format!(
                "Background sync completed for {} {}",
                item.entity_type, item.entity_id
            );
            if let Err(err) = self
                .publish_notification(item.entity_type.clone(), item.entity_id.clone(), message)
                .await
            {
                warn!(item = %item.id, error = %err, "failed to record sync notification");
            }
        }
    }
}

fn subscription_key(collection: &str, id: &str) -> String {
    format!("{collection}/{id}")
}
