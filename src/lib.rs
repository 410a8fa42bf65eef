pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
pub mod state;

pub use application::ports::{
    ConnectionType, ConnectivityMonitor, ConnectivityState, ConnectivityStream, DocumentStream,
    LocalStore, RemoteDocument, RemoteStore, SyncEventSink,
};
pub use application::services::{
    FreshnessParams, FreshnessService, LockCacheService, MutationQueueService, SyncMode,
    OFFLINE_SKIP_KEY,
};
pub use domain::entities::{
    CachedEntity, CachedRecord, DataSource, LockEntry, Notification, QueueItem, QueueOperation,
    SyncStatusSnapshot,
};
pub use domain::value_objects::{
    EntityId, EntityType, MutationPayload, Priority, QueueItemId, QueueItemStatus,
};
pub use infrastructure::storage::{MemoryLocalStore, SqliteLocalStore};
pub use shared::clock::{Clock, SystemClock};
pub use shared::config::AppConfig;
pub use shared::error::AppError;
pub use state::AppState;

/// Initialize tracing for host applications that have no subscriber of
/// their own. Safe to skip when the host installs one.
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fieldsync=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
