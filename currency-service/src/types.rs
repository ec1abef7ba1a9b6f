//! Domain types for the currency catalog
//!
//! All monetary values use exact decimals. Structural equality on the entity
//! types is what the store uses to detect no-op updates, so the field sets
//! here must match what callers are allowed to change.

use revision_store::Versioned;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Decimal places denomination values are stored and compared with
pub const VALUE_SCALE: u32 = 4;

/// Comparison key for value-based denomination identity.
///
/// Two denominations under the same currency are "the same" across time when
/// their values agree at the stored scale, even across a delete/recreate
/// cycle. Rounding policy lives here and nowhere else.
pub fn value_key(value: Decimal) -> Decimal {
    value.round_dp(VALUE_SCALE).normalize()
}

/// Currency (parent entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    /// Display name
    pub name: String,

    /// Short code (e.g. "EUR")
    pub code: String,

    /// Optional symbol (e.g. "€")
    pub symbol: Option<String>,
}

/// Denomination (child entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Denomination {
    /// Logical key of the owning currency
    pub currency_key: Uuid,

    /// Monetary value, > 0
    pub value: Decimal,

    /// Optional description
    pub description: Option<String>,
}

impl Denomination {
    /// Identity key for reconciliation
    pub fn value_key(&self) -> Decimal {
        value_key(self.value)
    }
}

/// A denomination as supplied by a caller: value and description only, no
/// identifiers. The owning currency is assigned when the request is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenominationSpec {
    /// Monetary value, > 0
    pub value: Decimal,

    /// Optional description
    pub description: Option<String>,
}

impl DenominationSpec {
    /// Bind to the owning currency
    pub fn into_denomination(self, currency_key: Uuid) -> Denomination {
        Denomination {
            currency_key,
            value: self.value,
            description: self.description,
        }
    }
}

/// A currency with its denominations as of one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencySnapshot {
    /// The currency and its revision metadata
    pub currency: Versioned<Currency>,

    /// Denominations owned by the currency, with revision metadata
    pub denominations: Vec<Versioned<Denomination>>,
}

impl CurrencySnapshot {
    /// Snapshot without denominations
    pub fn currency_only(currency: Versioned<Currency>) -> Self {
        Self {
            currency,
            denominations: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_key_normalizes_scale() {
        // 1.00 == 1
        assert_eq!(value_key(Decimal::new(100, 2)), value_key(Decimal::new(1, 0)));
        // 0.50 == 0.5000
        assert_eq!(
            value_key(Decimal::new(50, 2)),
            value_key(Decimal::new(5000, 4))
        );
        // 1.0001 != 1
        assert_ne!(
            value_key(Decimal::new(10001, 4)),
            value_key(Decimal::new(1, 0))
        );
    }

    proptest::proptest! {
        #[test]
        fn test_value_key_is_idempotent(mantissa in 1i64..100_000_000, scale in 0u32..6) {
            let value = Decimal::new(mantissa, scale);
            proptest::prop_assert_eq!(value_key(value_key(value)), value_key(value));
        }

        #[test]
        fn test_trailing_zeros_never_change_identity(mantissa in 1i64..1_000_000, scale in 0u32..4) {
            let value = Decimal::new(mantissa, scale);
            let padded = Decimal::new(mantissa * 100, scale + 2);
            proptest::prop_assert_eq!(value_key(value), value_key(padded));
        }
    }

    #[test]
    fn test_value_key_rounds_past_stored_scale() {
        // 1.00004 rounds to 1.0000
        assert_eq!(
            value_key(Decimal::new(100_004, 5)),
            value_key(Decimal::new(1, 0))
        );
        // 0.99996 rounds to 1.0000
        assert_eq!(
            value_key(Decimal::new(99_996, 5)),
            value_key(Decimal::new(1, 0))
        );
    }
}
