use crate::application::ports::{
    ConnectivityMonitor, ConnectivityState, ConnectionType, ConnectivityStream, DocumentStream,
    LocalStore, RemoteDocument, RemoteStore, SyncEventSink,
};
use crate::domain::entities::QueueItem;
use crate::shared::error::AppError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex as StdMutex;
use tokio::sync::{broadcast, mpsc};

/// Programmable remote store: records calls, serves canned documents, and
/// can be told to fail globally or per id.
#[derive(Default)]
pub struct MockRemoteStore {
    pub calls: StdMutex<Vec<String>>,
    pub fail: AtomicBool,
    pub fail_ids: StdMutex<HashSet<String>>,
    pub delay_ms: AtomicU64,
    pub documents: StdMutex<HashMap<String, RemoteDocument>>,
    pub subscriptions: StdMutex<Vec<mpsc::UnboundedSender<RemoteDocument>>>,
}

impl MockRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_document(&self, collection: &str, doc: RemoteDocument) {
        self.documents
            .lock()
            .unwrap()
            .insert(format!("{collection}/{}", doc.id), doc);
    }

    pub fn recorded_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn push_update(&self, doc: RemoteDocument) {
        for tx in self.subscriptions.lock().unwrap().iter() {
            let _ = tx.send(doc.clone());
        }
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.lock().unwrap().len()
    }

    fn should_fail(&self, id: &str) -> bool {
        self.fail.load(Ordering::SeqCst) || self.fail_ids.lock().unwrap().contains(id)
    }

    async fn simulate_latency(&self) {
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
        }
    }
}

#[async_trait]
impl RemoteStore for MockRemoteStore {
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<RemoteDocument>, AppError> {
        self.simulate_latency().await;
        self.calls
            .lock()
            .unwrap()
            .push(format!("get:{collection}/{id}"));
        if self.should_fail(id) {
            return Err(AppError::Network("mock remote unavailable".into()));
        }
        Ok(self
            .documents
            .lock()
            .unwrap()
            .get(&format!("{collection}/{id}"))
            .cloned())
    }

    async fn query_documents(
        &self,
        collection: &str,
        _filters: &[(String, Value)],
    ) -> Result<Vec<RemoteDocument>, AppError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("query:{collection}"));
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Network("mock remote unavailable".into()));
        }
        let prefix = format!("{collection}/");
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .map(|(_, doc)| doc.clone())
            .collect())
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        _data: Value,
    ) -> Result<(), AppError> {
        self.simulate_latency().await;
        self.calls
            .lock()
            .unwrap()
            .push(format!("update:{collection}/{id}"));
        if self.should_fail(id) {
            return Err(AppError::Network("mock remote unavailable".into()));
        }
        Ok(())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), AppError> {
        self.simulate_latency().await;
        self.calls
            .lock()
            .unwrap()
            .push(format!("delete:{collection}/{id}"));
        if self.should_fail(id) {
            return Err(AppError::Network("mock remote unavailable".into()));
        }
        Ok(())
    }

    async fn subscribe(&self, collection: &str, id: &str) -> Result<DocumentStream, AppError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("subscribe:{collection}/{id}"));
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscriptions.lock().unwrap().push(tx);
        Ok(Box::pin(futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|doc| (doc, rx))
        })))
    }
}

/// Connectivity signal driven by the test.
pub struct MockConnectivity {
    online: AtomicBool,
    tx: broadcast::Sender<ConnectivityState>,
}

impl MockConnectivity {
    pub fn new(online: bool) -> Self {
        let (tx, _rx) = broadcast::channel(16);
        Self {
            online: AtomicBool::new(online),
            tx,
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
        let state = if online {
            ConnectivityState::online(ConnectionType::Wifi)
        } else {
            ConnectivityState::offline()
        };
        let _ = self.tx.send(state);
    }
}

#[async_trait]
impl ConnectivityMonitor for MockConnectivity {
    async fn fetch(&self) -> ConnectivityState {
        if self.online.load(Ordering::SeqCst) {
            ConnectivityState::online(ConnectionType::Wifi)
        } else {
            ConnectivityState::offline()
        }
    }

    fn subscribe(&self) -> ConnectivityStream {
        let rx = self.tx.subscribe();
        Box::pin(futures::stream::unfold(rx, |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(state) => return Some((state, rx)),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        }))
    }
}

/// Local store whose writes always fail.
pub struct FailingLocalStore;

#[async_trait]
impl LocalStore for FailingLocalStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, AppError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: String) -> Result<(), AppError> {
        Err(AppError::Storage("disk full".into()))
    }

    async fn remove(&self, _key: &str) -> Result<(), AppError> {
        Err(AppError::Storage("disk full".into()))
    }

    async fn multi_get(&self, keys: &[String]) -> Result<Vec<(String, Option<String>)>, AppError> {
        Ok(keys.iter().map(|key| (key.clone(), None)).collect())
    }

    async fn multi_remove(&self, _keys: &[String]) -> Result<(), AppError> {
        Err(AppError::Storage("disk full".into()))
    }

    async fn get_all_keys(&self) -> Result<Vec<String>, AppError> {
        Ok(Vec::new())
    }
}

/// Records every post-drain hook invocation.
#[derive(Default)]
pub struct RecordingSink {
    pub batches: StdMutex<Vec<Vec<QueueItem>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batch_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }
}

#[async_trait]
impl SyncEventSink for RecordingSink {
    async fn mutations_synced(&self, items: &[QueueItem]) {
        self.batches.lock().unwrap().push(items.to_vec());
    }
}
