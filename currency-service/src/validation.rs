//! Request validation
//!
//! All checks run before any store access; a failed validation is never
//! partially applied.

use crate::error::{Error, Result};
use crate::types::value_key;
use rust_decimal::Decimal;
use std::collections::HashSet;
use uuid::Uuid;

/// Maximum currency name length
pub const MAX_NAME_LEN: usize = 100;

/// Maximum currency code length
pub const MAX_CODE_LEN: usize = 3;

/// Maximum currency symbol length
pub const MAX_SYMBOL_LEN: usize = 10;

/// Maximum denomination description length
pub const MAX_DESCRIPTION_LEN: usize = 255;

/// Parse a logical key from its wire form
pub fn parse_key(key: &str) -> Result<Uuid> {
    if key.is_empty() {
        return Err(Error::Validation("key must not be empty".to_string()));
    }
    Uuid::parse_str(key).map_err(|e| Error::Validation(format!("key is not a valid UUID: {e}")))
}

/// Validate currency fields
pub fn validate_currency(name: &str, code: &str, symbol: Option<&str>) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Validation("name must not be empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(Error::Validation(format!(
            "name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    if code.is_empty() {
        return Err(Error::Validation("code must not be empty".to_string()));
    }
    if code.chars().count() > MAX_CODE_LEN {
        return Err(Error::Validation(format!(
            "code must be at most {MAX_CODE_LEN} characters"
        )));
    }
    if let Some(symbol) = symbol {
        let len = symbol.chars().count();
        if len == 0 || len > MAX_SYMBOL_LEN {
            return Err(Error::Validation(format!(
                "symbol must be 1 to {MAX_SYMBOL_LEN} characters"
            )));
        }
    }
    Ok(())
}

/// Validate a denomination target list: positive values, bounded
/// descriptions, values unique within the request.
pub fn validate_denominations(denominations: &[(Decimal, Option<String>)]) -> Result<()> {
    let mut seen = HashSet::new();

    for (value, description) in denominations {
        if *value <= Decimal::ZERO {
            return Err(Error::Validation(format!(
                "denomination value must be positive, got {value}"
            )));
        }
        if let Some(description) = description {
            if description.chars().count() > MAX_DESCRIPTION_LEN {
                return Err(Error::Validation(format!(
                    "denomination description must be at most {MAX_DESCRIPTION_LEN} characters"
                )));
            }
        }
        if !seen.insert(value_key(*value)) {
            return Err(Error::Validation(format!(
                "denomination values must be unique, {value} appears more than once"
            )));
        }
    }
    Ok(())
}
