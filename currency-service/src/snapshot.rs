//! Point-in-time snapshot resolution
//!
//! Resolves the state of a currency and its denominations as they existed at
//! or before a given timestamp. Every record, the currency and each
//! denomination alike, resolves independently to its latest revision at or
//! before the requested time; deleted denominations are included so the
//! caller sees the full state of that moment.

use crate::error::Result;
use crate::history::latest_per_key_at;
use crate::types::{Currency, CurrencySnapshot, Denomination};
use chrono::{DateTime, Utc};
use revision_store::RevisionStore;
use uuid::Uuid;

/// Resolve the aggregate at or before `at`. `None` when the currency has no
/// revision at or before that time.
pub async fn resolve_at<CS, DS>(
    currencies: &CS,
    denominations: &DS,
    key: Uuid,
    at: DateTime<Utc>,
) -> Result<Option<CurrencySnapshot>>
where
    CS: RevisionStore<Currency>,
    DS: RevisionStore<Denomination>,
{
    let Some(currency) = currencies.get_historic(key, at).await? else {
        return Ok(None);
    };

    let owned = denominations
        .find_all(|d| d.currency_key == key, |_| true)
        .await?;
    let resolved = latest_per_key_at(&owned, at);

    tracing::debug!(%key, %at, denominations = resolved.len(), "Resolved historic snapshot");

    Ok(Some(CurrencySnapshot {
        currency,
        denominations: resolved,
    }))
}
