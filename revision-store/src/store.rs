//! The revisioned entity store contract
//!
//! Every mutation appends a revision; the previous revision for the key is
//! marked superseded in the same atomic step. Reads never observe a key with
//! two active revisions.

use crate::error::Result;
use crate::types::{Entity, Revision, RevisionHint, Versioned};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Append-only lifecycle store, polymorphic over the entity type.
///
/// A [`RevisionHint`] lets the caller pin the logical key and/or the recorded
/// timestamp. Requests that touch several records pass the same timestamp to
/// every call so the whole request can later be reconstructed as one logical
/// transaction.
#[async_trait]
pub trait RevisionStore<E: Entity>: Send + Sync {
    /// Append revision 1 (`Created`) under a fresh key, or under
    /// `hint.key` when supplied.
    async fn create(&self, entity: E, hint: Option<RevisionHint>) -> Result<Versioned<E>>;

    /// Append an `Updated` revision.
    ///
    /// Fails with [`StoreError::NotModified`](crate::StoreError::NotModified)
    /// when `entity` equals the current active payload, with
    /// [`StoreError::EntityNotFound`](crate::StoreError::EntityNotFound) when
    /// the key has no revisions, and with
    /// [`StoreError::RevisionNotFound`](crate::StoreError::RevisionNotFound)
    /// when the latest revision is a delete.
    async fn update(&self, key: Uuid, entity: E, hint: Option<RevisionHint>)
        -> Result<Versioned<E>>;

    /// Append a `Deleted` revision. Fails with `RevisionNotFound` when the
    /// key is absent or already deleted.
    async fn delete(&self, key: Uuid, hint: Option<RevisionHint>) -> Result<Versioned<E>>;

    /// Append a `Restored` revision carrying the last payload before the
    /// delete. Fails with `RevisionNotFound` when the key is absent or not
    /// currently deleted.
    async fn restore(&self, key: Uuid, hint: Option<RevisionHint>) -> Result<Versioned<E>>;

    /// Latest revision for the key, or the revision with the given number
    /// when `number` is supplied. `None` when nothing matches.
    async fn get_current(&self, key: Uuid, number: Option<i32>) -> Result<Option<Versioned<E>>>;

    /// Latest revision with `created_at <= at`, or `None`.
    async fn get_historic(&self, key: Uuid, at: DateTime<Utc>) -> Result<Option<Versioned<E>>>;

    /// Every revision for the key, newest first. Empty when the key is
    /// unknown.
    async fn get_all_revisions(&self, key: Uuid) -> Result<Vec<Versioned<E>>>;

    /// Every stored revision matching both predicates, across all keys.
    async fn find_all<P, Q>(&self, entity_pred: P, revision_pred: Q) -> Result<Vec<Versioned<E>>>
    where
        P: Fn(&E) -> bool + Send + Sync,
        Q: Fn(&Revision) -> bool + Send + Sync;
}
