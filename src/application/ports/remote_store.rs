use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A document as the remote store returns it, stamped with the server-side
/// write time used for freshness comparison.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteDocument {
    pub id: String,
    pub data: Value,
    pub updated_at: DateTime<Utc>,
}

/// Live change feed for one document.
pub type DocumentStream = BoxStream<'static, RemoteDocument>;

/// Authoritative document storage. External collaborator; the core only
/// consumes this surface and never implements it.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<RemoteDocument>, AppError>;

    /// Field-equality filtered query.
    async fn query_documents(
        &self,
        collection: &str,
        filters: &[(String, Value)],
    ) -> Result<Vec<RemoteDocument>, AppError>;

    /// Set semantics: creates the document when absent, replaces it when
    /// present. Document-level last-writer-wins.
    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        data: Value,
    ) -> Result<(), AppError>;

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), AppError>;

    /// Per-document change subscription. Dropping the stream unsubscribes.
    async fn subscribe(&self, collection: &str, id: &str) -> Result<DocumentStream, AppError>;
}
