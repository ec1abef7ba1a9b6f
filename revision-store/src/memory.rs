//! In-memory store implementation
//!
//! Keeps every revision in a `HashMap` of per-key vectors behind a
//! `parking_lot` RwLock. Used as the test double for the reconciliation
//! logic and usable as a real backend for ephemeral deployments.

use crate::error::{Result, StoreError};
use crate::store::RevisionStore;
use crate::types::{Entity, Revision, RevisionAction, RevisionHint, RevisionStatus, Versioned};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

/// In-memory revision store
pub struct MemoryStore<E> {
    // Revisions per key, oldest first. Invariant: only the last element has
    // RevisionStatus::Active.
    inner: RwLock<HashMap<Uuid, Vec<Versioned<E>>>>,
}

impl<E: Entity> MemoryStore<E> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    fn append_locked(
        revisions: &mut Vec<Versioned<E>>,
        key: Uuid,
        entity: E,
        action: RevisionAction,
        created_at: DateTime<Utc>,
    ) -> Versioned<E> {
        let number = revisions.last().map(|v| v.revision.number).unwrap_or(0) + 1;

        if let Some(last) = revisions.last_mut() {
            last.revision.status = RevisionStatus::Superseded;
        }

        let versioned = Versioned {
            entity,
            revision: Revision {
                key,
                number,
                created_at,
                action,
                status: RevisionStatus::Active,
            },
        };
        revisions.push(versioned.clone());
        versioned
    }
}

impl<E: Entity> Default for MemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Entity> RevisionStore<E> for MemoryStore<E> {
    async fn create(&self, entity: E, hint: Option<RevisionHint>) -> Result<Versioned<E>> {
        let hint = hint.unwrap_or_default();
        let key = hint.key.unwrap_or_else(Uuid::new_v4);
        let created_at = hint.timestamp();

        let mut inner = self.inner.write();
        let revisions = inner.entry(key).or_default();
        if !revisions.is_empty() {
            return Err(StoreError::Storage(format!(
                "key {key} already has revisions"
            )));
        }

        Ok(Self::append_locked(
            revisions,
            key,
            entity,
            RevisionAction::Created,
            created_at,
        ))
    }

    async fn update(
        &self,
        key: Uuid,
        entity: E,
        hint: Option<RevisionHint>,
    ) -> Result<Versioned<E>> {
        let created_at = hint.unwrap_or_default().timestamp();

        let mut inner = self.inner.write();
        let revisions = inner.get_mut(&key).ok_or(StoreError::EntityNotFound(key))?;
        let last = revisions.last().ok_or(StoreError::EntityNotFound(key))?;

        if last.revision.action == RevisionAction::Deleted {
            return Err(StoreError::RevisionNotFound(key));
        }
        if last.entity == entity {
            return Err(StoreError::NotModified(key));
        }

        Ok(Self::append_locked(
            revisions,
            key,
            entity,
            RevisionAction::Updated,
            created_at,
        ))
    }

    async fn delete(&self, key: Uuid, hint: Option<RevisionHint>) -> Result<Versioned<E>> {
        let created_at = hint.unwrap_or_default().timestamp();

        let mut inner = self.inner.write();
        let revisions = inner
            .get_mut(&key)
            .ok_or(StoreError::RevisionNotFound(key))?;
        let last = revisions.last().ok_or(StoreError::RevisionNotFound(key))?;

        if last.revision.action == RevisionAction::Deleted {
            return Err(StoreError::RevisionNotFound(key));
        }

        let entity = last.entity.clone();
        Ok(Self::append_locked(
            revisions,
            key,
            entity,
            RevisionAction::Deleted,
            created_at,
        ))
    }

    async fn restore(&self, key: Uuid, hint: Option<RevisionHint>) -> Result<Versioned<E>> {
        let created_at = hint.unwrap_or_default().timestamp();

        let mut inner = self.inner.write();
        let revisions = inner
            .get_mut(&key)
            .ok_or(StoreError::RevisionNotFound(key))?;
        let last = revisions.last().ok_or(StoreError::RevisionNotFound(key))?;

        if last.revision.action != RevisionAction::Deleted {
            return Err(StoreError::RevisionNotFound(key));
        }

        let entity = last.entity.clone();
        Ok(Self::append_locked(
            revisions,
            key,
            entity,
            RevisionAction::Restored,
            created_at,
        ))
    }

    async fn get_current(&self, key: Uuid, number: Option<i32>) -> Result<Option<Versioned<E>>> {
        let inner = self.inner.read();
        let Some(revisions) = inner.get(&key) else {
            return Ok(None);
        };

        let found = match number {
            Some(n) => revisions.iter().find(|v| v.revision.number == n),
            None => revisions.last(),
        };
        Ok(found.cloned())
    }

    async fn get_historic(&self, key: Uuid, at: DateTime<Utc>) -> Result<Option<Versioned<E>>> {
        let inner = self.inner.read();
        let Some(revisions) = inner.get(&key) else {
            return Ok(None);
        };

        Ok(revisions
            .iter()
            .filter(|v| v.revision.created_at <= at)
            .max_by_key(|v| v.revision.number)
            .cloned())
    }

    async fn get_all_revisions(&self, key: Uuid) -> Result<Vec<Versioned<E>>> {
        let inner = self.inner.read();
        let mut revisions = inner.get(&key).cloned().unwrap_or_default();
        revisions.reverse();
        Ok(revisions)
    }

    async fn find_all<P, Q>(&self, entity_pred: P, revision_pred: Q) -> Result<Vec<Versioned<E>>>
    where
        P: Fn(&E) -> bool + Send + Sync,
        Q: Fn(&Revision) -> bool + Send + Sync,
    {
        let inner = self.inner.read();
        let mut matches: Vec<Versioned<E>> = inner
            .values()
            .flatten()
            .filter(|v| entity_pred(&v.entity) && revision_pred(&v.revision))
            .cloned()
            .collect();

        // HashMap iteration order is arbitrary; keep results deterministic.
        matches.sort_by_key(|v| (v.revision.created_at, v.revision.key, v.revision.number));
        Ok(matches)
    }
}
