pub mod entities;
pub mod value_objects;

pub use entities::{
    CachedEntity, CachedRecord, DataSource, LockEntry, Notification, QueueItem, QueueOperation,
    SyncStatusSnapshot,
};
pub use value_objects::{
    EntityId, EntityType, MutationPayload, Priority, QueueItemId, QueueItemStatus,
};
