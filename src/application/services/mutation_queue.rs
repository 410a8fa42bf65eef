use crate::application::ports::{ConnectivityMonitor, LocalStore, RemoteStore, SyncEventSink};
use crate::domain::entities::{QueueItem, QueueOperation, SyncStatusSnapshot};
use crate::domain::value_objects::{EntityId, EntityType, Priority, QueueItemId, QueueItemStatus};
use crate::shared::clock::Clock;
use crate::shared::config::SyncConfig;
use crate::shared::error::AppError;
use crate::shared::metrics::DrainMetrics;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock as StdRwLock};
use tokio::sync::{watch, Mutex, OnceCell};
use tracing::{debug, error, info, warn};

const QUEUE_ITEMS_KEY: &str = "sync_queue:items";
const LAST_SYNC_KEY: &str = "sync_queue:last_sync";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Drain every pending item.
    Full,
    /// Drain only items enqueued since the last completed drain.
    Incremental,
}

#[derive(Default)]
struct QueueState {
    items: Vec<QueueItem>,
    last_sync_time: Option<DateTime<Utc>>,
}

/// Durable, priority-ordered mutation queue.
///
/// Mutations are persisted to the local store before `enqueue` returns and
/// drained against the remote store in `(priority, created_at)` order.
/// Drains are single-flight: a `sync_queue` call while one is in flight is
/// a no-op, never queued.
#[derive(Clone)]
pub struct MutationQueueService {
    remote: Arc<dyn RemoteStore>,
    local: Arc<dyn LocalStore>,
    connectivity: Arc<dyn ConnectivityMonitor>,
    clock: Arc<dyn Clock>,
    config: SyncConfig,
    state: Arc<Mutex<QueueState>>,
    hydrated: Arc<OnceCell<()>>,
    draining: Arc<AtomicBool>,
    status_tx: Arc<watch::Sender<SyncStatusSnapshot>>,
    metrics: Arc<DrainMetrics>,
    event_sink: Arc<StdRwLock<Option<Arc<dyn SyncEventSink>>>>,
}

impl MutationQueueService {
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        local: Arc<dyn LocalStore>,
        connectivity: Arc<dyn ConnectivityMonitor>,
        clock: Arc<dyn Clock>,
        config: SyncConfig,
    ) -> Self {
        let (status_tx, _status_rx) = watch::channel(SyncStatusSnapshot::default());
        Self {
            remote,
            local,
            connectivity,
            clock,
            config,
            state: Arc::new(Mutex::new(QueueState::default())),
            hydrated: Arc::new(OnceCell::new()),
            draining: Arc::new(AtomicBool::new(false)),
            status_tx: Arc::new(status_tx),
            metrics: Arc::new(DrainMetrics::new()),
            event_sink: Arc::new(StdRwLock::new(None)),
        }
    }

    /// Wire the post-drain hook. Called once by the composition root.
    pub fn set_event_sink(&self, sink: Arc<dyn SyncEventSink>) {
        *self.event_sink.write().expect("event sink lock poisoned") = Some(sink);
    }

    /// Durably record a mutation. Never touches the network; the only
    /// failure a caller must handle is local storage itself failing, in
    /// which case the mutation is not recorded anywhere.
    pub async fn enqueue(
        &self,
        operation: QueueOperation,
        entity_type: EntityType,
        entity_id: EntityId,
        priority: Priority,
    ) -> Result<QueueItemId, AppError> {
        self.hydrate().await;

        let item = QueueItem::new(operation, entity_type, entity_id, priority, self.clock.now());
        let id = item.id.clone();

        {
            let mut state = self.state.lock().await;
            state.items.push(item);
            if let Err(err) = self.persist_items(&state.items).await {
                state.items.pop();
                return Err(err);
            }
        }
        self.broadcast_status().await;

        if self.config.auto_sync && self.connectivity.fetch().await.is_connected {
            self.spawn_drain(SyncMode::Full);
        }

        Ok(id)
    }

    /// Submit a drain to the background and return immediately.
    pub fn spawn_drain(&self, mode: SyncMode) {
        let service = self.clone();
        tokio::spawn(async move {
            service.sync_queue(mode).await;
        });
    }

    /// One complete drain attempt. Per-item failures are recorded on the
    /// items and surfaced through the status snapshot; this method itself
    /// never fails.
    pub async fn sync_queue(&self, mode: SyncMode) {
        self.hydrate().await;

        if self
            .draining
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("drain already in flight, ignoring");
            return;
        }

        if !self.connectivity.fetch().await.is_connected {
            debug!("offline, deferring drain");
            self.draining.store(false, Ordering::SeqCst);
            return;
        }

        let synced = self.drain_cycle(mode).await;

        {
            let mut state = self.state.lock().await;
            state.last_sync_time = Some(self.clock.now());
            if let Err(err) = self.persist_items(&state.items).await {
                error!(error = %err, "failed to persist queue after drain");
            }
            if let Err(err) = self.persist_last_sync(state.last_sync_time).await {
                warn!(error = %err, "failed to persist last sync time");
            }
        }
        self.metrics.record_drain();

        if synced.iter().any(|item| item.priority.is_high()) {
            let sink = self
                .event_sink
                .read()
                .expect("event sink lock poisoned")
                .clone();
            if let Some(sink) = sink {
                sink.mutations_synced(&synced).await;
            }
        }

        self.draining.store(false, Ordering::SeqCst);
        self.broadcast_status().await;
    }

    /// Reset every failed item and drain again.
    pub async fn retry_failed_items(&self) -> Result<(), AppError> {
        self.hydrate().await;
        {
            let mut state = self.state.lock().await;
            for item in state.items.iter_mut().filter(|item| item.is_failed()) {
                item.reset_for_retry();
            }
            self.persist_items(&state.items).await?;
        }
        self.broadcast_status().await;
        self.sync_queue(SyncMode::Full).await;
        Ok(())
    }

    /// Permanently discard failed items. Explicit data loss; only the
    /// diagnostic surface may call this.
    pub async fn clear_failed_items(&self) -> Result<u32, AppError> {
        self.hydrate().await;
        let removed = {
            let mut state = self.state.lock().await;
            let before = state.items.len();
            state.items.retain(|item| !item.is_failed());
            let removed = (before - state.items.len()) as u32;
            self.persist_items(&state.items).await?;
            removed
        };
        if removed > 0 {
            info!(count = removed, "cleared failed queue items");
        }
        self.broadcast_status().await;
        Ok(removed)
    }

    pub async fn get_sync_status(&self) -> SyncStatusSnapshot {
        self.hydrate().await;
        let state = self.state.lock().await;
        SyncStatusSnapshot::compute(
            &state.items,
            self.draining.load(Ordering::SeqCst),
            state.last_sync_time,
        )
    }

    /// All queued items (pending and failed) in drain order.
    pub async fn get_queued_items(&self) -> Vec<QueueItem> {
        self.hydrate().await;
        let state = self.state.lock().await;
        let mut items = state.items.clone();
        items.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then(a.created_at.cmp(&b.created_at))
        });
        items
    }

    /// Latest status snapshot channel. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> watch::Receiver<SyncStatusSnapshot> {
        self.status_tx.subscribe()
    }

    pub fn metrics(&self) -> &DrainMetrics {
        &self.metrics
    }

    /// Drain once per offline-to-online transition. The single-flight guard
    /// debounces bursts of connectivity events.
    pub fn spawn_connectivity_listener(&self) -> tokio::task::JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            let mut was_online = service.connectivity.fetch().await.is_connected;
            let mut changes = service.connectivity.subscribe();
            while let Some(state) = changes.next().await {
                if state.is_connected && !was_online {
                    info!("connectivity restored, draining queue");
                    service.sync_queue(SyncMode::Full).await;
                }
                was_online = state.is_connected;
            }
        })
    }

    /// Interval-based incremental drain, gated by `SyncConfig::auto_sync`.
    pub fn spawn_periodic_drain(&self) -> tokio::task::JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            let period = std::time::Duration::from_secs(service.config.sync_interval.max(1));
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            loop {
                interval.tick().await;
                service.sync_queue(SyncMode::Incremental).await;
            }
        })
    }

    async fn drain_cycle(&self, mode: SyncMode) -> Vec<QueueItem> {
        let candidates: Vec<QueueItem> = {
            let state = self.state.lock().await;
            let cutoff = state.last_sync_time;
            let mut candidates: Vec<QueueItem> = state
                .items
                .iter()
                .filter(|item| item.is_pending())
                .filter(|item| match (mode, cutoff) {
                    (SyncMode::Incremental, Some(t)) => item.created_at > t,
                    _ => true,
                })
                .cloned()
                .collect();
            candidates.sort_by(|a, b| {
                a.priority
                    .cmp(&b.priority)
                    .then(a.created_at.cmp(&b.created_at))
            });
            candidates
        };

        let mut synced = Vec::new();
        for candidate in candidates {
            self.mark_item_status(&candidate.id, QueueItemStatus::Syncing)
                .await;

            match self.push_to_remote(&candidate).await {
                Ok(()) => {
                    let mut state = self.state.lock().await;
                    state.items.retain(|item| item.id != candidate.id);
                    drop(state);
                    self.metrics.record_synced(1);
                    synced.push(candidate);
                }
                Err(err) => {
                    warn!(item = %candidate.id, error = %err, "queue item sync failed");
                    self.metrics.record_failed(1);
                    {
                        let mut state = self.state.lock().await;
                        if let Some(item) =
                            state.items.iter_mut().find(|item| item.id == candidate.id)
                        {
                            item.record_failure(err.to_string(), self.config.max_retries);
                        }
                    }
                    if self.config.retry_backoff_secs > 0 {
                        tokio::time::sleep(std::time::Duration::from_secs(
                            self.config.retry_backoff_secs,
                        ))
                        .await;
                    }
                }
            }
        }
        synced
    }

    async fn push_to_remote(&self, item: &QueueItem) -> Result<(), AppError> {
        let collection = item.entity_type.as_str();
        let id = item.entity_id.as_str();
        let limit = std::time::Duration::from_secs(self.config.request_timeout_secs);

        let call = async {
            match &item.operation {
                QueueOperation::Create { payload } | QueueOperation::Update { payload } => {
                    self.remote
                        .update_document(collection, id, payload.as_json().clone())
                        .await
                }
                QueueOperation::Delete => self.remote.delete_document(collection, id).await,
            }
        };

        match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Network(format!(
                "remote call timed out after {}s",
                self.config.request_timeout_secs
            ))),
        }
    }

    async fn mark_item_status(&self, id: &QueueItemId, status: QueueItemStatus) {
        let mut state = self.state.lock().await;
        if let Some(item) = state.items.iter_mut().find(|item| &item.id == id) {
            item.status = status;
        }
    }

    async fn hydrate(&self) {
        self.hydrated
            .get_or_init(|| async {
                let (items, last_sync_time) = self.load_persisted().await;
                let mut state = self.state.lock().await;
                state.items = items;
                state.last_sync_time = last_sync_time;
            })
            .await;
    }

    async fn load_persisted(&self) -> (Vec<QueueItem>, Option<DateTime<Utc>>) {
        let mut items: Vec<QueueItem> = match self.local.get(QUEUE_ITEMS_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(items) => items,
                Err(err) => {
                    error!(error = %err, "persisted queue state is corrupt, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                error!(error = %err, "failed to read persisted queue, starting empty");
                Vec::new()
            }
        };

        // A crash mid-drain leaves items marked syncing; they never completed.
        for item in items.iter_mut() {
            if item.status == QueueItemStatus::Syncing {
                item.status = QueueItemStatus::Pending;
            }
        }

        let last_sync_time = match self.local.get(LAST_SYNC_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).ok(),
            _ => None,
        };

        (items, last_sync_time)
    }

    async fn persist_items(&self, items: &[QueueItem]) -> Result<(), AppError> {
        let raw = serde_json::to_string(items)?;
        self.local.set(QUEUE_ITEMS_KEY, raw).await
    }

    async fn persist_last_sync(
        &self,
        last_sync_time: Option<DateTime<Utc>>,
    ) -> Result<(), AppError> {
        match last_sync_time {
            Some(ts) => {
                let raw = serde_json::to_string(&ts)?;
                self.local.set(LAST_SYNC_KEY, raw).await
            }
            None => self.local.remove(LAST_SYNC_KEY).await,
        }
    }

    async fn broadcast_status(&self) {
        let snapshot = {
            let state = self.state.lock().await;
            SyncStatusSnapshot::compute(
                &state.items,
                self.draining.load(Ordering::SeqCst),
                state.last_sync_time,
            )
        };
        self.status_tx.send_replace(snapshot);
    }
}
