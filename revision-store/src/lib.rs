//! Generic revisioned entity store
//!
//! Append-only lifecycle store for logical entities. Every mutation writes a
//! new revision instead of overwriting state; entities are never physically
//! destroyed.
//!
//! # Architecture
//!
//! - **Logical keys**: a stable `Uuid` identifies an entity across all its
//!   revisions
//! - **Revisions**: per-key counters are contiguous from 1 and strictly
//!   increasing with creation time
//! - **Single active revision**: appending a revision supersedes the previous
//!   one atomically
//! - **Soft deletion**: `delete` is a state transition (`Deleted` action) and
//!   can be undone with `restore`

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod error;
pub mod memory;
pub mod rocks;
pub mod store;
pub mod types;

// Re-exports
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use rocks::RocksStore;
pub use store::RevisionStore;
pub use types::{Entity, Revision, RevisionAction, RevisionHint, RevisionStatus, Versioned};
