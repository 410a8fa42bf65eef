use crate::domain::entities::QueueItem;
use async_trait::async_trait;

/// Post-drain hook between the mutation queue and the read side.
///
/// The composition root wires the freshness service in here so visible
/// screens learn that a background sync just landed.
#[async_trait]
pub trait SyncEventSink: Send + Sync {
    async fn mutations_synced(&self, items: &[QueueItem]);
}
