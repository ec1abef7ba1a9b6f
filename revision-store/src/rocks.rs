//! RocksDB-backed store implementation
//!
//! # Layout
//!
//! One column family, `revisions`, keyed by `logical key (16 bytes) ||
//! revision number (4 bytes, big-endian)` so every revision of a key is
//! adjacent and ordered. Values are bincode-encoded [`Versioned`] records.
//!
//! Appending a revision and superseding the previous one happen in a single
//! `WriteBatch`, so readers never observe two active revisions for a key.

use crate::error::{Result, StoreError};
use crate::store::RevisionStore;
use crate::types::{Entity, Revision, RevisionAction, RevisionHint, RevisionStatus, Versioned};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, DBCompressionType, Direction, IteratorMode, Options,
    WriteBatch, DB,
};
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

const CF_REVISIONS: &str = "revisions";

/// RocksDB revision store
pub struct RocksStore<E> {
    db: Arc<DB>,

    // Serializes read-modify-write mutations; reads go straight to the DB.
    write_lock: Mutex<()>,

    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> RocksStore<E> {
    /// Open or create the database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        std::fs::create_dir_all(path.as_ref())?;

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        let mut cf_opts = Options::default();
        cf_opts.set_compression_type(DBCompressionType::Zstd);
        let cf_descriptors = vec![ColumnFamilyDescriptor::new(CF_REVISIONS, cf_opts)];

        let db = DB::open_cf_descriptors(&db_opts, path.as_ref(), cf_descriptors)?;

        tracing::info!(path = %path.as_ref().display(), "Opened revision store");

        Ok(Self {
            db: Arc::new(db),
            write_lock: Mutex::new(()),
            _entity: PhantomData,
        })
    }

    fn cf(&self) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(CF_REVISIONS)
            .ok_or_else(|| StoreError::Storage(format!("Column family {CF_REVISIONS} not found")))
    }

    fn record_key(key: Uuid, number: i32) -> [u8; 20] {
        let mut bytes = [0u8; 20];
        bytes[..16].copy_from_slice(key.as_bytes());
        bytes[16..].copy_from_slice(&number.to_be_bytes());
        bytes
    }

    /// All revisions for a key, oldest first
    fn revisions_of(&self, key: Uuid) -> Result<Vec<Versioned<E>>> {
        let cf = self.cf()?;
        let prefix = key.as_bytes();

        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(prefix, Direction::Forward));

        let mut revisions = Vec::new();
        for item in iter {
            let (record_key, value) = item?;
            if record_key.len() < 16 || &record_key[..16] != prefix.as_slice() {
                break;
            }
            revisions.push(bincode::deserialize(&value)?);
        }
        Ok(revisions)
    }

    /// Write the new revision and mark the previous one superseded, atomically
    fn append(
        &self,
        previous: Option<&Versioned<E>>,
        key: Uuid,
        entity: E,
        action: RevisionAction,
        created_at: DateTime<Utc>,
    ) -> Result<Versioned<E>> {
        let cf = self.cf()?;
        let number = previous.map(|v| v.revision.number).unwrap_or(0) + 1;

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

        let mut batch = WriteBatch::default();
        if let Some(previous) = previous {
            let mut superseded = previous.clone();
            superseded.revision.status = RevisionStatus::Superseded;
            batch.put_cf(
                cf,
                Self::record_key(key, superseded.revision.number),
                bincode::serialize(&superseded)?,
            );
        }
        batch.put_cf(
            cf,
            Self::record_key(key, number),
            bincode::serialize(&versioned)?,
        );
        self.db.write(batch)?;

        tracing::debug!(%key, number, ?action, "Revision appended");

        Ok(versioned)
    }
}

#[async_trait]
impl<E: Entity> RevisionStore<E> for RocksStore<E> {
    async fn create(&self, entity: E, hint: Option<RevisionHint>) -> Result<Versioned<E>> {
        let hint = hint.unwrap_or_default();
        let key = hint.key.unwrap_or_else(Uuid::new_v4);
        let created_at = hint.timestamp();

        let _guard = self.write_lock.lock();
        if !self.revisions_of(key)?.is_empty() {
            return Err(StoreError::Storage(format!(
                "key {key} already has revisions"
            )));
        }

        self.append(None, key, entity, RevisionAction::Created, created_at)
    }

    async fn update(
        &self,
        key: Uuid,
        entity: E,
        hint: Option<RevisionHint>,
    ) -> Result<Versioned<E>> {
        let created_at = hint.unwrap_or_default().timestamp();

        let _guard = self.write_lock.lock();
        let revisions = self.revisions_of(key)?;
        let last = revisions.last().ok_or(StoreError::EntityNotFound(key))?;

        if last.revision.action == RevisionAction::Deleted {
            return Err(StoreError::RevisionNotFound(key));
        }
        if last.entity == entity {
            return Err(StoreError::NotModified(key));
        }

        self.append(Some(last), key, entity, RevisionAction::Updated, created_at)
    }

    async fn delete(&self, key: Uuid, hint: Option<RevisionHint>) -> Result<Versioned<E>> {
        let created_at = hint.unwrap_or_default().timestamp();

        let _guard = self.write_lock.lock();
        let revisions = self.revisions_of(key)?;
        let last = revisions.last().ok_or(StoreError::RevisionNotFound(key))?;

        if last.revision.action == RevisionAction::Deleted {
            return Err(StoreError::RevisionNotFound(key));
        }

        let entity = last.entity.clone();
        self.append(Some(last), key, entity, RevisionAction::Deleted, created_at)
    }

    async fn restore(&self, key: Uuid, hint: Option<RevisionHint>) -> Result<Versioned<E>> {
        let created_at = hint.unwrap_or_default().timestamp();

        let _guard = self.write_lock.lock();
        let revisions = self.revisions_of(key)?;
        let last = revisions.last().ok_or(StoreError::RevisionNotFound(key))?;

        if last.revision.action != RevisionAction::Deleted {
            return Err(StoreError::RevisionNotFound(key));
        }

        let entity = last.entity.clone();
        self.append(
            Some(last),
            key,
            entity,
            RevisionAction::Restored,
            created_at,
        )
    }

    async fn get_current(&self, key: Uuid, number: Option<i32>) -> Result<Option<Versioned<E>>> {
        let revisions = self.revisions_of(key)?;
        let found = match number {
            Some(n) => revisions.into_iter().find(|v| v.revision.number == n),
            None => revisions.into_iter().last(),
        };
        Ok(found)
    }

    async fn get_historic(&self, key: Uuid, at: DateTime<Utc>) -> Result<Option<Versioned<E>>> {
        let revisions = self.revisions_of(key)?;
        Ok(revisions
            .into_iter()
            .filter(|v| v.revision.created_at <= at)
            .max_by_key(|v| v.revision.number))
    }

    async fn get_all_revisions(&self, key: Uuid) -> Result<Vec<Versioned<E>>> {
        let mut revisions = self.revisions_of(key)?;
        revisions.reverse();
        Ok(revisions)
    }

    async fn find_all<P, Q>(&self, entity_pred: P, revision_pred: Q) -> Result<Vec<Versioned<E>>>
    where
        P: Fn(&E) -> bool + Send + Sync,
        Q: Fn(&Revision) -> bool + Send + Sync,
    {
        let cf = self.cf()?;
        let iter = self.db.iterator_cf(cf, IteratorMode::Start);

        let mut matches = Vec::new();
        for item in iter {
            let (_, value) = item?;
            let versioned: Versioned<E> = bincode::deserialize(&value)?;
            if entity_pred(&versioned.entity) && revision_pred(&versioned.revision) {
                matches.push(versioned);
            }
        }

        matches.sort_by_key(|v| (v.revision.created_at, v.revision.key, v.revision.number));
        Ok(matches)
    }
}
