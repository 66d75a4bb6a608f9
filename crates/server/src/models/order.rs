//! Order aggregate models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use tradecart_core::{
    AccountId, AddressId, CatalogItemId, OrderId, OrderLineId, OrderNumber, OrderStatus, pricing,
};

/// The order aggregate header.
///
/// An order with status `CART` is the account's single draft order. Its
/// `delivery_address_id` points at a placeholder row until checkout
/// replaces it with the real delivery address.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub account_id: AccountId,
    pub status: OrderStatus,
    pub delivery_address_id: AddressId,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line on an order.
///
/// While the parent order is a draft, the stored `price` is a placeholder
/// and `name_snapshot`/`image_snapshot` are empty; the cart view computes
/// prices live from the catalog instead. Checkout freezes all three. After
/// checkout, `price = None` specifically means "market-priced, awaiting
/// admin entry" - catalog changes never touch a placed line.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub order_id: OrderId,
    pub catalog_item_id: CatalogItemId,
    pub quantity: i32,
    pub price: Option<Decimal>,
    pub name_snapshot: Option<String>,
    pub image_snapshot: Option<String>,
}

/// A placed order with its lines and computed total.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithLines {
    #[serde(flatten)]
    pub order: Order,
    pub lines: Vec<OrderLine>,
    pub total: Decimal,
}

impl OrderWithLines {
    /// Assemble an order response, computing the total from frozen line
    /// prices (`None` contributes zero).
    #[must_use]
    pub fn assemble(order: Order, lines: Vec<OrderLine>) -> Self {
        let total = pricing::order_total(lines.iter().map(|l| (l.price, l.quantity)));
        Self {
            order,
            lines,
            total,
        }
    }
}
