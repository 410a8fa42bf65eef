pub mod cached_entity;
pub mod lock_entry;
pub mod notification;
pub mod queue_item;
pub mod sync_status;

pub use cached_entity::{CachedEntity, CachedRecord, DataSource};
pub use lock_entry::LockEntry;
pub use notification::Notification;
pub use queue_item::{QueueItem, QueueOperation};
pub use sync_status::SyncStatusSnapshot;
