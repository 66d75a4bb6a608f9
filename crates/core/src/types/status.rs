//! Order fulfillment status and the transition table.

use serde::{Deserialize, Serialize};

/// Order fulfillment status.
///
/// An order starts as a draft (`Cart`), becomes `Pending` at checkout, and
/// then moves through the fulfillment sequence under admin control. The only
/// way back into `Cart` after checkout is a customer cancel with
/// convert-to-cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Cart,
    Pending,
    Confirmed,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// All known statuses, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Cart,
        Self::Pending,
        Self::Confirmed,
        Self::OutForDelivery,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Whether an order in this status has left the draft stage.
    ///
    /// Placed orders carry frozen line snapshots; draft orders compute
    /// prices live from the catalog.
    #[must_use]
    pub const fn is_placed(self) -> bool {
        !matches!(self, Self::Cart)
    }

    /// Whether no further transition leaves this status.
    ///
    /// `Cancelled` is terminal for the fulfillment sequence; the customer
    /// convert-to-cart path is modeled separately because it only applies
    /// to `Pending` orders.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether the customer cancel path applies.
    ///
    /// Only `Pending` orders may be cancelled (or converted back to a cart)
    /// by their owner.
    #[must_use]
    pub const fn is_cancellable(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Whether `self -> target` is a legal edge of the fulfillment state
    /// machine.
    ///
    /// Edges: `Cart -> Pending` (checkout); `Pending -> Cancelled | Cart`
    /// (customer cancel); `Pending -> Confirmed -> OutForDelivery ->
    /// Delivered` (admin); `Pending | Confirmed | OutForDelivery ->
    /// Cancelled` (admin). Nothing leaves `Delivered` or `Cancelled`.
    ///
    /// Note that the admin status-update operation does NOT enforce this
    /// table; it accepts any enum member. The table exists so that the gap
    /// is documented and a guard is one call away.
    #[must_use]
    pub const fn can_transition(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Cart, Self::Pending)
                | (Self::Pending, Self::Cancelled | Self::Cart | Self::Confirmed)
                | (Self::Confirmed, Self::OutForDelivery | Self::Cancelled)
                | (Self::OutForDelivery, Self::Delivered | Self::Cancelled)
        )
    }

    /// Database/wire representation (`SCREAMING_SNAKE_CASE`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cart => "CART",
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::OutForDelivery => "OUT_FOR_DELIVERY",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CART" => Ok(Self::Cart),
            "PENDING" => Ok(Self::Pending),
            "CONFIRMED" => Ok(Self::Confirmed),
            "OUT_FOR_DELIVERY" => Ok(Self::OutForDelivery),
            "DELIVERED" => Ok(Self::Delivered),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}
