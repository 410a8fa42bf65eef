use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    Wifi,
    Cellular,
    Ethernet,
    Unknown,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivityState {
    pub is_connected: bool,
    pub connection_type: ConnectionType,
}

impl ConnectivityState {
    pub fn online(connection_type: ConnectionType) -> Self {
        Self {
            is_connected: true,
            connection_type,
        }
    }

    pub fn offline() -> Self {
        Self {
            is_connected: false,
            connection_type: ConnectionType::None,
        }
    }
}

pub type ConnectivityStream = BoxStream<'static, ConnectivityState>;

/// OS-level reachability signal. External collaborator.
#[async_trait]
pub trait ConnectivityMonitor: Send + Sync {
    /// Point-in-time check.
    async fn fetch(&self) -> ConnectivityState;

    /// Change events. Dropping the stream unsubscribes.
    fn subscribe(&self) -> ConnectivityStream;
}
