pub mod ports;
pub mod services;

pub use services::{
    FreshnessParams, FreshnessService, LockCacheService, MutationQueueService, SyncMode,
    OFFLINE_SKIP_KEY,
};
