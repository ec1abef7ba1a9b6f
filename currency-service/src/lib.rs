//! Currency catalog service
//!
//! Currencies and their denominations with a full audit trail: every write
//! appends revisions to a [`revision_store`], and reads can reconstruct the
//! aggregate at any point of its history.
//!
//! # Architecture
//!
//! - **Reconciliation**: updates synchronize the active denomination set
//!   against a caller-supplied target, keyed by monetary value
//! - **Shared timestamps**: every revision written by one request carries the
//!   same creation time, so history reconstruction can treat a multi-record
//!   change as one logical transaction
//! - **Soft deletion**: records are never destroyed; deletes and restores are
//!   lifecycle transitions

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod grpc;
pub mod history;
pub mod metrics;
pub mod reconcile;
pub mod snapshot;
pub mod types;
pub mod validation;

// Re-exports
pub use catalog::CurrencyCatalog;
pub use config::Config;
pub use error::{Error, Result};
pub use grpc::CurrencyGrpcServer;
pub use metrics::Metrics;
pub use types::{Currency, CurrencySnapshot, Denomination, DenominationSpec};
