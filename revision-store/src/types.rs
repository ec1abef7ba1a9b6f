//! Core types for the revision store
//!
//! All stored values are designed for deterministic serialization (bincode)
//! and structural equality, which the store relies on to detect no-op
//! updates.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

/// Bound alias for entity payloads the store can hold.
///
/// Structural equality (`PartialEq`) is load-bearing: an update whose payload
/// equals the current active revision is rejected with
/// [`StoreError::NotModified`](crate::StoreError::NotModified).
pub trait Entity:
    Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

impl<T> Entity for T where
    T: Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

/// Lifecycle action recorded on a revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RevisionAction {
    /// First revision of a logical key
    Created,
    /// Content changed
    Updated,
    /// Soft-deleted; the entity remains readable through history
    Deleted,
    /// A previously deleted key was brought back
    Restored,
    /// Read-time label only: the record did not change between two observed
    /// snapshots. Never persisted by a write path.
    Unmodified,
}

/// Whether a revision is the latest for its key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RevisionStatus {
    /// Latest revision for the key
    Active,
    /// Retained for history; no longer the latest
    Superseded,
}

/// Immutable metadata attached to every entity mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    /// Logical key this revision belongs to
    pub key: Uuid,

    /// Per-key counter, contiguous from 1
    pub number: i32,

    /// Creation timestamp; shared across all revisions written by one
    /// logical transaction
    pub created_at: DateTime<Utc>,

    /// Lifecycle action
    pub action: RevisionAction,

    /// Active or superseded
    pub status: RevisionStatus,
}

/// Caller-supplied parts of a revision to be written.
///
/// A hint lets one request pre-choose the logical key (for creates) and pin a
/// shared timestamp so every revision written during the request is
/// temporally aligned and can later be reconstructed as one transaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct RevisionHint {
    /// Logical key to assign (creates only; ignored elsewhere)
    pub key: Option<Uuid>,

    /// Timestamp to record instead of the store's own clock
    pub created_at: Option<DateTime<Utc>>,
}

impl RevisionHint {
    /// Hint pinning only the timestamp
    pub fn at(created_at: DateTime<Utc>) -> Self {
        Self {
            key: None,
            created_at: Some(created_at),
        }
    }

    /// Hint pinning the logical key and the timestamp
    pub fn keyed(key: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            key: Some(key),
            created_at: Some(created_at),
        }
    }

    /// Resolve the timestamp, falling back to the store clock
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.created_at.unwrap_or_else(Utc::now)
    }
}

/// An entity snapshot paired with its revision metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Versioned<E> {
    /// Entity state as of this revision
    pub entity: E,

    /// Revision metadata
    pub revision: Revision,
}

impl<E> Versioned<E> {
    /// Logical key of the underlying entity
    pub fn key(&self) -> Uuid {
        self.revision.key
    }

    /// True when the latest known action is a soft delete
    pub fn is_deleted(&self) -> bool {
        self.revision.action == RevisionAction::Deleted
    }
}
