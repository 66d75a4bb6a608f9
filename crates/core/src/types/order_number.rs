//! Human-readable sequential order numbers.
//!
//! Order numbers look like `TC-00042`: a fixed prefix plus a zero-padded
//! sequential suffix. The suffix keeps counting past five digits once the
//! sequence outgrows the padding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix shared by every order number.
pub const ORDER_NUMBER_PREFIX: &str = "TC-";


/// Error parsing an order number from its string form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderNumberError {
    #[error("order number must start with {ORDER_NUMBER_PREFIX}: {0}")]
    BadPrefix(String),
    #[error("order number has a non-numeric suffix: {0}")]
    BadSuffix(String),
}

/// A validated, human-readable order number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Build an order number from its numeric suffix.
    #[must_use]
    pub fn from_suffix(suffix: u32) -> Self {
        Self(format!("{ORDER_NUMBER_PREFIX}{suffix:05}"))
    }

    /// The order number following the given highest existing suffix.
    ///
    /// `highest` is 0 when no orders exist yet, so the sequence starts at
    /// `TC-00001`.
    #[must_use]
    pub fn next_after(highest: u32) -> Self {
        Self::from_suffix(highest + 1)
    }

    /// Parse and validate a stored order number.
    ///
    /// # Errors
    ///
    /// Returns `OrderNumberError` if the prefix is wrong or the suffix is
    /// not numeric.
    pub fn parse(s: &str) -> Result<Self, OrderNumberError> {
        let suffix = s
            .strip_prefix(ORDER_NUMBER_PREFIX)
            .ok_or_else(|| OrderNumberError::BadPrefix(s.to_owned()))?;
        if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OrderNumberError::BadSuffix(s.to_owned()));
        }
        Ok(Self(s.to_owned()))
    }

    /// The numeric suffix used for sequence allocation.
    #[must_use]
    pub fn suffix(&self) -> u32 {
        self.0
            .get(ORDER_NUMBER_PREFIX.len()..)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    }

    /// The full string form (e.g. `TC-00042`).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
