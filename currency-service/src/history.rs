//! Temporal reconciliation
//!
//! Rebuilds the complete revision history of a currency aggregate from the
//! raw revision streams of the currency and its denominations. Each distinct
//! creation timestamp across both streams is one time slice (one logical
//! transaction); the engine reconstructs the aggregate as of every slice and
//! annotates each record with its lifecycle action relative to the
//! next-older slice.

use crate::types::{Currency, CurrencySnapshot, Denomination};
use chrono::{DateTime, Utc};
use revision_store::{Entity, RevisionAction, Versioned};
use std::collections::HashMap;
use uuid::Uuid;

/// Latest revision at or before `at`, per logical key (highest revision
/// number wins within a key).
pub(crate) fn latest_per_key_at<E: Entity>(
    revisions: &[Versioned<E>],
    at: DateTime<Utc>,
) -> Vec<Versioned<E>> {
    let mut latest: HashMap<Uuid, &Versioned<E>> = HashMap::new();
    for versioned in revisions {
        if versioned.revision.created_at > at {
            continue;
        }
        match latest.get(&versioned.key()) {
            Some(current) if current.revision.number >= versioned.revision.number => {}
            _ => {
                latest.insert(versioned.key(), versioned);
            }
        }
    }

    let mut resolved: Vec<Versioned<E>> = latest.into_values().cloned().collect();
    resolved.sort_by_key(|v| (v.revision.created_at, v.revision.key));
    resolved
}

/// Reconstruct the ordered snapshot history, newest first.
///
/// Inputs are the full revision streams: every revision of the currency key
/// and every revision of every denomination ever owned by it. The number of
/// returned snapshots equals the number of distinct timestamps across both
/// streams.
pub fn reconstruct(
    currency_revisions: &[Versioned<Currency>],
    denomination_revisions: &[Versioned<Denomination>],
) -> Vec<CurrencySnapshot> {
    // One slice per distinct transaction timestamp, newest first.
    let mut slices: Vec<DateTime<Utc>> = currency_revisions
        .iter()
        .map(|v| v.revision.created_at)
        .chain(denomination_revisions.iter().map(|v| v.revision.created_at))
        .collect();
    slices.sort_unstable();
    slices.dedup();
    slices.reverse();

    tracing::debug!(
        currency_revisions = currency_revisions.len(),
        denomination_revisions = denomination_revisions.len(),
        slices = slices.len(),
        "Reconstructing revision history"
    );

    // Composite snapshot per slice. Every slice timestamp comes from an
    // actual revision, and the currency stream has revision 1 at or before
    // the oldest slice it contributed; slices older than the currency's
    // creation can only exist if a denomination somehow predates its owner,
    // which the write paths never produce.
    let composites: Vec<CurrencySnapshot> = slices
        .iter()
        .filter_map(|slice| {
            let currency = latest_per_key_at(currency_revisions, *slice)
                .into_iter()
                .next()?;
            Some(CurrencySnapshot {
                currency,
                denominations: latest_per_key_at(denomination_revisions, *slice),
            })
        })
        .collect();

    // Relabel each snapshot relative to its chronological predecessor (the
    // next-older composite). Comparisons always use the originally resolved
    // actions, never already-relabelled ones.
    composites
        .iter()
        .enumerate()
        .map(|(i, composite)| {
            let predecessor = composites.get(i + 1);
            relabel(composite, predecessor)
        })
        .collect()
}

fn relabel(
    composite: &CurrencySnapshot,
    predecessor: Option<&CurrencySnapshot>,
) -> CurrencySnapshot {
    let mut currency = composite.currency.clone();
    if let Some(predecessor) = predecessor {
        // The currency did not change at this slice; it is carried forward.
        if predecessor.currency.revision.number == currency.revision.number {
            currency.revision.action = RevisionAction::Unmodified;
        }
    }

    let denominations = composite
        .denominations
        .iter()
        .filter(|denomination| {
            // A deletion surfaces once, at its own slice; suppress it in
            // every newer slice.
            !predecessor.is_some_and(|p| {
                p.denominations
                    .iter()
                    .any(|prev| prev.key() == denomination.key() && prev.is_deleted())
            })
        })
        .map(|denomination| {
            let carried_forward = predecessor.is_some_and(|p| {
                p.denominations.iter().any(|prev| {
                    prev.key() == denomination.key()
                        && prev.revision.action == denomination.revision.action
                })
            });
            let mut denomination = denomination.clone();
            if carried_forward {
                denomination.revision.action = RevisionAction::Unmodified;
            }
            denomination
        })
        .collect();

    CurrencySnapshot {
        currency,
        denominations,
    }
}
