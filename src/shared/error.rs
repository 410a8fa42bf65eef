use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Remote store rejected request: {0}")]
    RemoteRejection(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether a failed drain attempt should count against `retry_count`.
    ///
    /// Remote rejections are retried identically to network failures: the
    /// remote store does not distinguish permanent validation errors from
    /// transient ones, so neither does the queue.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Network(_) | AppError::RemoteRejection(_))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::InvalidInput(err)
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
