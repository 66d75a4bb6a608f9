//! Catalog item model.

use rust_decimal::Decimal;
use serde::Serialize;

use tradecart_core::CatalogItemId;

/// A purchasable catalog entry.
///
/// `base_price` is `None` for market-priced items: their true price is
/// unknown until an admin sets it on the order line after checkout.
/// Catalog administration happens outside this engine; the engine only
/// reads these rows.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogItem {
    pub id: CatalogItemId,
    pub name: String,
    pub image: Option<String>,
    pub base_price: Option<Decimal>,
}
