//! Error types for the currency catalog

use revision_store::StoreError;
use thiserror::Error;

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Catalog errors
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or out-of-range input; detected before any store access
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No active record for the key, or no historic record at the requested
    /// time
    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage-layer failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Anything else; surfaced as an opaque internal failure
    #[error("{0}")]
    Internal(String),
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            // Write-path conflicts collapse to NotFound: the core does not
            // retry, the caller must re-read.
            StoreError::EntityNotFound(key) | StoreError::RevisionNotFound(key) => {
                Error::NotFound(key.to_string())
            }
            StoreError::RevisionMismatch { key, .. } => Error::NotFound(key.to_string()),
            // Callers intercept NotModified before converting; reaching this
            // arm means a no-op write leaked out of its recovery path.
            StoreError::NotModified(key) => {
                Error::Internal(format!("unhandled no-op update for key {key}"))
            }
            StoreError::Storage(msg) => Error::Storage(msg),
            StoreError::Serialization(err) => Error::Storage(err.to_string()),
            StoreError::Io(err) => Error::Storage(err.to_string()),
        }
    }
}
