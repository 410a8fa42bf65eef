pub mod connectivity;
pub mod local_store;
pub mod remote_store;
pub mod sync_events;

pub use connectivity::{ConnectionType, ConnectivityMonitor, ConnectivityState, ConnectivityStream};
pub use local_store::LocalStore;
pub use remote_store::{DocumentStream, RemoteDocument, RemoteStore};
pub use sync_events::SyncEventSink;
