use std::sync::Arc;

use crate::application::ports::{ConnectivityMonitor, LocalStore, RemoteStore};
use crate::application::services::{FreshnessService, LockCacheService, MutationQueueService};
use crate::infrastructure::storage::SqliteLocalStore;
use crate::shared::clock::SystemClock;
use crate::shared::config::AppConfig;

/// Application-wide service wiring.
///
/// The composition root owns every service instance; nothing in the crate
/// reaches for global state. The remote store and connectivity signal are
/// platform collaborators and must be supplied by the host application.
#[derive(Clone)]
pub struct AppState {
    pub queue: MutationQueueService,
    pub freshness: FreshnessService,
    pub lock_cache: LockCacheService,
}

impl AppState {
    /// Wire the three services over the default SQLite-backed local store.
    pub async fn new(
        remote: Arc<dyn RemoteStore>,
        connectivity: Arc<dyn ConnectivityMonitor>,
        config: AppConfig,
    ) -> anyhow::Result<Self> {
        config
            .validate()
            .map_err(|msg| anyhow::anyhow!("invalid configuration: {msg}"))?;

        // The sqlite file's directory must exist before the pool opens it.
        if let Some(path) = config
            .database
            .url
            .strip_prefix("sqlite:")
            .map(|rest| rest.split('?').next().unwrap_or(rest))
        {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        let local: Arc<dyn LocalStore> = Arc::new(
            SqliteLocalStore::initialize(&config.database.url, config.database.max_connections)
                .await?,
        );

        Ok(Self::with_local_store(remote, local, connectivity, config))
    }

    /// Wire the services over a caller-provided local store.
    pub fn with_local_store(
        remote: Arc<dyn RemoteStore>,
        local: Arc<dyn LocalStore>,
        connectivity: Arc<dyn ConnectivityMonitor>,
        config: AppConfig,
    ) -> Self {
        let clock = Arc::new(SystemClock);

        let queue = MutationQueueService::new(
            remote.clone(),
            local.clone(),
            connectivity.clone(),
            clock.clone(),
            config.sync.clone(),
        );
        let freshness = FreshnessService::new(
            remote.clone(),
            local.clone(),
            connectivity.clone(),
            clock.clone(),
            config.notifications.clone(),
        );
        let lock_cache = LockCacheService::new(remote, local, clock, config.cache.clone());

        // Completed high-priority drains surface on the reconciler's
        // notification channel.
        queue.set_event_sink(Arc::new(freshness.clone()));

        Self {
            queue,
            freshness,
            lock_cache,
        }
    }

    /// Start the background workers: the offline-to-online drain trigger
    /// and, when auto-sync is on, the periodic incremental drain.
    pub fn start_background_sync(&self, config: &AppConfig) -> Vec<tokio::task::JoinHandle<()>> {
        let mut handles = vec![self.queue.spawn_connectivity_listener()];
        if config.sync.auto_sync {
            handles.push(self.queue.spawn_periodic_drain());
        }
        handles
    }
}
