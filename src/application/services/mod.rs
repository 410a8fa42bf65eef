pub mod freshness;
pub mod lock_cache;
pub mod mutation_queue;

#[cfg(test)]
pub(crate) mod test_support;

pub use freshness::{FreshnessParams, FreshnessService, OFFLINE_SKIP_KEY};
pub use lock_cache::LockCacheService;
pub use mutation_queue::{MutationQueueService, SyncMode};
