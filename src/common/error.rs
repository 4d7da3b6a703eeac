//! Error types for the relay core.

use thiserror::Error;

/// Top-level relay error.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("no bridge configured for chat {chat_id}")]
    Unroutable { chat_id: i64 },

    #[error("correlation store error: {0}")]
    Store(#[from] StoreError),

    #[error("destination send failed on bridge '{bridge}': {source}")]
    DestinationSend {
        bridge: String,
        #[source]
        source: SendError,
    },

    #[error("source platform call failed: {message}")]
    SourceCall { message: String },
}

/// Correlation store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no correlation entry for {key}")]
    NotFound { key: String },

    #[error("database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("value encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl StoreError {
    /// True when this is a lookup miss rather than a storage failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Errors from sending to the destination platform.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("attachment exceeds the destination size limit")]
    AttachmentTooLarge,

    #[error("send failed: {message}")]
    Failed { message: String },
}

/// Errors from resolving a file's direct content link on the source platform.
#[derive(Debug, Error)]
pub enum FileLinkError {
    #[error("file exceeds the platform download limit")]
    TooLarge,

    #[error("file link resolution failed: {message}")]
    Failed { message: String },
}

/// Result type alias using RelayError.
pub type RelayResult<T> = std::result::Result<T, RelayError>;

/// Result type alias for correlation store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
