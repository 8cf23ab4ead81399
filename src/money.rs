//! Lossless raw encoding for monetary amounts.
//!
//! Amounts are persisted twice: a `numeric` column for querying and a JSON
//! column holding the exact decimal string. Some backends (SQLite) store
//! `numeric` as a float, so the raw column is the source of truth when a
//! record is read back.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Precision recorded alongside raw values when none is given.
pub const DEFAULT_PRECISION: u32 = 20;

#[derive(Debug, Error)]
pub enum RawAmountError {
    #[error("invalid raw amount value '{0}'")]
    InvalidValue(String),

    #[error("malformed raw amount: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Raw, arbitrary-precision form of an amount.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAmount {
    pub value: String,
    #[serde(default = "default_precision")]
    pub precision: u32,
}

fn default_precision() -> u32 {
    DEFAULT_PRECISION
}

impl RawAmount {
    pub fn from_decimal(amount: &Decimal) -> Self {
        Self {
            value: amount.normalize().to_string(),
            precision: DEFAULT_PRECISION,
        }
    }

    pub fn to_decimal(&self) -> Result<Decimal, RawAmountError> {
        Decimal::from_str(self.value.trim())
            .or_else(|_| Decimal::from_scientific(self.value.trim()))
            .map_err(|_| RawAmountError::InvalidValue(self.value.clone()))
    }

    pub fn to_json(&self) -> JsonValue {
        serde_json::json!({
            "value": self.value,
            "precision": self.precision,
        })
    }

    pub fn from_json(value: &JsonValue) -> Result<Self, RawAmountError> {
        let raw: RawAmount = serde_json::from_value(value.clone())?;
        raw.to_decimal()?;
        Ok(raw)
    }

    /// Whether this raw value and `amount` denote the same number.
    pub fn matches(&self, amount: &Decimal) -> bool {
        self.to_decimal()
            .map(|raw| raw.normalize() == amount.normalize())
            .unwrap_or(false)
    }
}

impl From<Decimal> for RawAmount {
    fn from(amount: Decimal) -> Self {
        Self::from_decimal(&amount)
    }
}

/// Decodes a JSON raw column straight into a decimal.
pub fn decimal_from_raw_json(value: &JsonValue) -> Result<Decimal, RawAmountError> {
    RawAmount::from_json(value)?.to_decimal()
}
