//! Denomination reconciliation
//!
//! Computes and executes the minimal set of lifecycle operations that turns a
//! currency's active denomination set into a caller-supplied target set.
//! Matching is keyed by monetary value (see [`crate::types::value_key`]), not
//! by logical key: a value that was deleted and later re-supplied is restored
//! under its original key instead of recreated.

use crate::error::Result;
use crate::types::Denomination;
use chrono::{DateTime, Utc};
use revision_store::{RevisionAction, RevisionHint, RevisionStore, Versioned};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// The five disjoint operation sets of one reconciliation.
///
/// Their union covers every record touched: each active member lands in
/// exactly one of delete/restore/update/unchanged, and each target value not
/// present in the active set lands in create.
#[derive(Debug, Default)]
pub struct ReconciliationPlan {
    /// Active members whose value is absent from the target
    pub to_delete: Vec<Versioned<Denomination>>,

    /// Target values never seen in the active set
    pub to_create: Vec<Denomination>,

    /// Deleted members whose value reappears in the target
    pub to_restore: Vec<Versioned<Denomination>>,

    /// Matched members whose description changed; `entity` carries the new
    /// content
    pub to_update: Vec<Versioned<Denomination>>,

    /// Matched members with no content difference
    pub unchanged: Vec<Versioned<Denomination>>,
}

impl ReconciliationPlan {
    /// True when no store operation would be issued
    pub fn is_noop(&self) -> bool {
        self.to_delete.is_empty()
            && self.to_create.is_empty()
            && self.to_restore.is_empty()
            && self.to_update.is_empty()
    }
}

/// Compute the reconciliation plan.
///
/// `active` is the currency's denomination set with full revision metadata
/// (latest revision per key, Deleted members included); `target` is the
/// caller-supplied desired state.
pub fn plan(active: &[Versioned<Denomination>], target: &[Denomination]) -> ReconciliationPlan {
    let target_keys: HashSet<Decimal> = target.iter().map(|d| d.value_key()).collect();
    let active_by_value: HashMap<Decimal, &Versioned<Denomination>> = active
        .iter()
        .map(|existing| (existing.entity.value_key(), existing))
        .collect();

    let mut plan = ReconciliationPlan::default();

    for existing in active {
        let wanted = target_keys.contains(&existing.entity.value_key());
        match (existing.is_deleted(), wanted) {
            (false, false) => plan.to_delete.push(existing.clone()),
            (true, true) => plan.to_restore.push(existing.clone()),
            // Deleted and still unwanted: stays deleted, untouched.
            (true, false) => {}
            // Live and wanted: split below into update vs unchanged.
            (false, true) => {}
        }
    }

    for desired in target {
        match active_by_value.get(&desired.value_key()) {
            None => plan.to_create.push(desired.clone()),
            Some(existing) if existing.is_deleted() => {
                // Handled as a restore above.
            }
            Some(existing) => {
                if existing.entity.description == desired.description {
                    plan.unchanged.push((*existing).clone());
                } else {
                    plan.to_update.push(Versioned {
                        entity: desired.clone(),
                        revision: existing.revision.clone(),
                    });
                }
            }
        }
    }

    plan
}

/// Execute a plan against the store.
///
/// Operations run strictly in delete → create → restore → update order, every
/// revision carrying the caller's shared `timestamp` so the whole request
/// reads back as one logical transaction. Unchanged members are relabelled
/// `Unmodified` in the result without a store call.
pub async fn apply<DS>(
    store: &DS,
    currency_key: Uuid,
    timestamp: DateTime<Utc>,
    plan: ReconciliationPlan,
) -> Result<Vec<Versioned<Denomination>>>
where
    DS: RevisionStore<Denomination>,
{
    tracing::debug!(
        %currency_key,
        deletes = plan.to_delete.len(),
        creates = plan.to_create.len(),
        restores = plan.to_restore.len(),
        updates = plan.to_update.len(),
        unchanged = plan.unchanged.len(),
        "Applying denomination reconciliation"
    );

    let mut results = Vec::new();

    for existing in plan.to_delete {
        let hint = RevisionHint::keyed(existing.key(), timestamp);
        results.push(store.delete(existing.key(), Some(hint)).await?);
    }

    for mut desired in plan.to_create {
        desired.currency_key = currency_key;
        let hint = RevisionHint::keyed(Uuid::new_v4(), timestamp);
        results.push(store.create(desired, Some(hint)).await?);
    }

    for existing in plan.to_restore {
        let hint = RevisionHint::keyed(existing.key(), timestamp);
        results.push(store.restore(existing.key(), Some(hint)).await?);
    }

    for updated in plan.to_update {
        let mut entity = updated.entity;
        entity.currency_key = currency_key;
        let hint = RevisionHint::keyed(updated.revision.key, timestamp);
        results.push(store.update(updated.revision.key, entity, Some(hint)).await?);
    }

    for mut unchanged in plan.unchanged {
        unchanged.revision.action = RevisionAction::Unmodified;
        results.push(unchanged);
    }

    Ok(results)
}
