pub mod entity_id;
pub mod entity_type;
pub mod payload;
pub mod priority;
pub mod queue_item_id;
pub mod queue_item_status;

pub use entity_id::EntityId;
pub use entity_type::EntityType;
pub use payload::MutationPayload;
pub use priority::Priority;
pub use queue_item_id::QueueItemId;
pub use queue_item_status::QueueItemStatus;
