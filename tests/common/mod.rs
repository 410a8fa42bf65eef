#![allow(dead_code)]

use async_trait::async_trait;
use fieldsync::shared::error::AppError;
use fieldsync::{
    ConnectionType, ConnectivityMonitor, ConnectivityState, ConnectivityStream, DocumentStream,
    RemoteDocument, RemoteStore,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex as StdMutex;
use tokio::sync::{broadcast, mpsc};

/// Remote store double shared by the integration tests: records calls,
/// serves canned documents, and pushes subscription updates on demand.
#[derive(Default)]
pub struct FakeRemote {
    pub calls: StdMutex<Vec<String>>,
    pub fail: AtomicBool,
    pub documents: StdMutex<HashMap<String, RemoteDocument>>,
    subscriptions: StdMutex<Vec<mpsc::UnboundedSender<RemoteDocument>>>,
}

impl FakeRemote {
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

    fn record(&self, call: String) -> Result<(), AppError> {
        self.calls.lock().unwrap().push(call);
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Network("fake remote unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for FakeRemote {
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<RemoteDocument>, AppError> {
        self.record(format!("get:{collection}/{id}"))?;
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
        self.record(format!("query:{collection}"))?;
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
        self.record(format!("update:{collection}/{id}"))
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), AppError> {
        self.record(format!("delete:{collection}/{id}"))
    }

    async fn subscribe(&self, collection: &str, id: &str) -> Result<DocumentStream, AppError> {
        self.record(format!("subscribe:{collection}/{id}"))?;
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscriptions.lock().unwrap().push(tx);
        Ok(Box::pin(futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|doc| (doc, rx))
        })))
    }
}

/// Connectivity signal the test flips at will.
pub struct FakeConnectivity {
    online: AtomicBool,
    tx: broadcast::Sender<ConnectivityState>,
}

impl FakeConnectivity {
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
impl ConnectivityMonitor for FakeConnectivity {
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
