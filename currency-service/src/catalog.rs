//! Catalog orchestration layer
//!
//! High-level API over the two revision stores. Each write operation captures
//! one timestamp at the start of the request and threads it through every
//! store call, so all revisions written by the request share an identical
//! creation time and history reconstruction can treat them as one logical
//! transaction.

use crate::error::{Error, Result};
use crate::history;
use crate::reconcile;
use crate::snapshot;
use crate::types::{Currency, CurrencySnapshot, Denomination, DenominationSpec};
use chrono::{DateTime, Utc};
use revision_store::{
    RevisionAction, RevisionHint, RevisionStatus, RevisionStore, StoreError, Versioned,
};
use uuid::Uuid;

/// Currency catalog over a pair of revision stores
pub struct CurrencyCatalog<CS, DS> {
    currencies: CS,
    denominations: DS,
}

impl<CS, DS> CurrencyCatalog<CS, DS>
where
    CS: RevisionStore<Currency>,
    DS: RevisionStore<Denomination>,
{
    /// Create a catalog over the given stores
    pub fn new(currencies: CS, denominations: DS) -> Self {
        Self {
            currencies,
            denominations,
        }
    }

    /// Create a currency with its initial denomination set
    pub async fn create(
        &self,
        currency: Currency,
        denominations: Vec<DenominationSpec>,
    ) -> Result<CurrencySnapshot> {
        tracing::info!(name = %currency.name, "Creating currency");
        let timestamp = Utc::now();

        let created = self
            .currencies
            .create(currency, Some(RevisionHint::at(timestamp)))
            .await?;
        let key = created.key();

        let mut results = Vec::with_capacity(denominations.len());
        for spec in denominations {
            let hint = RevisionHint::keyed(Uuid::new_v4(), timestamp);
            let denomination = self
                .denominations
                .create(spec.into_denomination(key), Some(hint))
                .await?;
            results.push(denomination);
        }

        Ok(CurrencySnapshot {
            currency: created,
            denominations: results,
        })
    }

    /// Update a currency and reconcile its denomination set against `target`
    pub async fn update(
        &self,
        key: Uuid,
        currency: Currency,
        target: Vec<DenominationSpec>,
    ) -> Result<CurrencySnapshot> {
        tracing::info!(%key, "Updating currency");
        let timestamp = Utc::now();

        let parent = match self
            .currencies
            .update(key, currency, Some(RevisionHint::at(timestamp)))
            .await
        {
            Ok(updated) => updated,
            // A no-op parent update is not an error; fall back to the
            // current snapshot and report it unmodified.
            Err(StoreError::NotModified(_)) => {
                let mut current = self
                    .currencies
                    .get_current(key, None)
                    .await?
                    .ok_or_else(|| Error::NotFound(key.to_string()))?;
                current.revision.action = RevisionAction::Unmodified;
                current
            }
            Err(StoreError::EntityNotFound(_)) | Err(StoreError::RevisionNotFound(_)) => {
                return Err(Error::NotFound(key.to_string()));
            }
            Err(err) => return Err(err.into()),
        };

        let active = self
            .denominations
            .find_all(
                |d| d.currency_key == key,
                |r| r.status == RevisionStatus::Active,
            )
            .await?;

        let target: Vec<Denomination> = target
            .into_iter()
            .map(|spec| spec.into_denomination(key))
            .collect();

        let plan = reconcile::plan(&active, &target);
        let results = reconcile::apply(&self.denominations, key, timestamp, plan).await?;

        Ok(CurrencySnapshot {
            currency: parent,
            denominations: results,
        })
    }

    /// Soft-delete a currency and all of its live denominations
    pub async fn delete(&self, key: Uuid) -> Result<CurrencySnapshot> {
        tracing::info!(%key, "Deleting currency");

        let current = self.currencies.get_current(key, None).await?;
        match current {
            None => return Err(Error::NotFound(key.to_string())),
            Some(ref currency) if currency.is_deleted() => {
                return Err(Error::NotFound(key.to_string()));
            }
            Some(_) => {}
        }

        let live = self
            .denominations
            .find_all(
                |d| d.currency_key == key,
                |r| r.status == RevisionStatus::Active && r.action != RevisionAction::Deleted,
            )
            .await?;

        let timestamp = Utc::now();

        let mut results = Vec::with_capacity(live.len());
        for denomination in live {
            let hint = RevisionHint::keyed(denomination.key(), timestamp);
            results.push(
                self.denominations
                    .delete(denomination.key(), Some(hint))
                    .await?,
            );
        }

        let deleted = self
            .currencies
            .delete(key, Some(RevisionHint::at(timestamp)))
            .await?;

        tracing::info!(%key, denominations = results.len(), "Currency deleted");

        Ok(CurrencySnapshot {
            currency: deleted,
            denominations: results,
        })
    }

    /// Current state of a currency; NotFound when absent or deleted
    pub async fn get(&self, key: Uuid) -> Result<CurrencySnapshot> {
        let current = self
            .currencies
            .get_current(key, None)
            .await?
            .filter(|currency| !currency.is_deleted())
            .ok_or_else(|| Error::NotFound(key.to_string()))?;

        Ok(CurrencySnapshot::currency_only(current))
    }

    /// Every currency whose latest revision is not a delete
    pub async fn get_all(&self) -> Result<Vec<CurrencySnapshot>> {
        let currencies = self
            .currencies
            .find_all(
                |_| true,
                |r| r.status == RevisionStatus::Active && r.action != RevisionAction::Deleted,
            )
            .await?;

        Ok(currencies
            .into_iter()
            .map(CurrencySnapshot::currency_only)
            .collect())
    }

    /// Active currencies whose name contains `name`, case-insensitively
    pub async fn get_all_by_name(&self, name: &str) -> Result<Vec<CurrencySnapshot>> {
        let needle = name.to_lowercase();
        let currencies = self
            .currencies
            .find_all(
                |c| c.name.to_lowercase().contains(&needle),
                |r| r.status == RevisionStatus::Active && r.action != RevisionAction::Deleted,
            )
            .await?;

        Ok(currencies
            .into_iter()
            .map(CurrencySnapshot::currency_only)
            .collect())
    }

    /// The aggregate as it existed at or before `at`
    pub async fn get_revision(&self, key: Uuid, at: DateTime<Utc>) -> Result<CurrencySnapshot> {
        snapshot::resolve_at(&self.currencies, &self.denominations, key, at)
            .await?
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }

    /// Full revision history, newest first, with relative lifecycle actions
    pub async fn get_all_revisions(&self, key: Uuid) -> Result<Vec<CurrencySnapshot>> {
        let currency_revisions = self.currencies.get_all_revisions(key).await?;
        if currency_revisions.is_empty() {
            return Err(Error::NotFound(key.to_string()));
        }

        let denomination_revisions = self
            .denominations
            .find_all(|d| d.currency_key == key, |_| true)
            .await?;

        Ok(history::reconstruct(
            &currency_revisions,
            &denomination_revisions,
        ))
    }

    /// Denomination revisions are retained even after deletion; exposed for
    /// audit tooling.
    pub async fn get_denomination_revisions(
        &self,
        denomination_key: Uuid,
    ) -> Result<Vec<Versioned<Denomination>>> {
        Ok(self
            .denominations
            .get_all_revisions(denomination_key)
            .await?)
    }
}
