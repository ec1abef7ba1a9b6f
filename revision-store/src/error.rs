//! Error types for the revision store

use thiserror::Error;
use uuid::Uuid;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// No revision exists for the logical key
    #[error("Entity not found: {0}")]
    EntityNotFound(Uuid),

    /// The key exists but has no revision usable for the requested operation
    /// (e.g. deleting an already deleted key, restoring a live one)
    #[error("Revision not found for key: {0}")]
    RevisionNotFound(Uuid),

    /// Update payload equals the current active revision
    #[error("Entity not modified: {0}")]
    NotModified(Uuid),

    /// Concurrent writer superseded the revision this operation expected
    #[error("Revision mismatch for key {key}: expected {expected}, found {found}")]
    RevisionMismatch {
        /// Logical key under contention
        key: Uuid,
        /// Revision number the caller based its write on
        expected: i32,
        /// Revision number actually current
        found: i32,
    },

    /// Storage error (RocksDB)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rocksdb::Error> for StoreError {
    fn from(err: rocksdb::Error) -> Self {
        StoreError::Storage(err.to_string())
    }
}
