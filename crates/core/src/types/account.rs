//! Account roles and the per-request account snapshot.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::AccountId;

/// Account role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountRole {
    /// Regular customer: owns one draft order, places and cancels orders.
    Customer,
    /// Administrator: drives fulfillment status and resolves market prices.
    Admin,
}

impl std::fmt::Display for AccountRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "CUSTOMER"),
            Self::Admin => write!(f, "ADMIN"),
        }
    }
}

impl std::str::FromStr for AccountRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CUSTOMER" => Ok(Self::Customer),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(format!("invalid account role: {s}")),
        }
    }
}

/// Immutable view of the calling account, resolved once per request.
///
/// Everything the engine needs to know about the caller: identity,
/// approval gate for checkout, role for admin operations, and the price
/// multiplier applied to catalog prices. The engine never mutates
/// accounts; admin account management lives outside this service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub id: AccountId,
    pub email: String,
    pub approved: bool,
    pub role: AccountRole,
    pub price_multiplier: Decimal,
}

impl AccountSnapshot {
    /// Whether the account may perform admin-only operations.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, AccountRole::Admin)
    }
}
