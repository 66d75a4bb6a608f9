//! Live cart view with multiplier-adjusted prices.

use rust_decimal::Decimal;
use serde::Serialize;

use tradecart_core::{CatalogItemId, OrderId, OrderLineId, OrderNumber, pricing};

/// One draft-order line joined to current catalog data.
///
/// Produced by the cart query; prices here are the catalog base prices,
/// not yet adjusted for the account.
#[derive(Debug, Clone)]
pub struct CartLineData {
    pub line_id: OrderLineId,
    pub catalog_item_id: CatalogItemId,
    pub name: String,
    pub image: Option<String>,
    pub quantity: i32,
    pub base_price: Option<Decimal>,
}

/// A cart line as returned to the client.
///
/// `unit_price` is the account-adjusted price, computed on read; it is
/// never persisted while the order is a draft. Market-priced items show
/// no unit price and contribute zero to the total.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub line_id: OrderLineId,
    pub catalog_item_id: CatalogItemId,
    pub name: String,
    pub image: Option<String>,
    pub quantity: i32,
    pub unit_price: Option<Decimal>,
    pub line_total: Decimal,
}

/// The account's draft order, priced live.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub order_id: OrderId,
    pub order_number: OrderNumber,
    pub lines: Vec<CartLineView>,
    pub total: Decimal,
}

impl CartView {
    /// Assemble the cart view by adjusting each line's base price with the
    /// account multiplier and summing line totals.
    #[must_use]
    pub fn assemble(
        order_id: OrderId,
        order_number: OrderNumber,
        lines: Vec<CartLineData>,
        multiplier: Decimal,
    ) -> Self {
        let lines: Vec<CartLineView> = lines
            .into_iter()
            .map(|data| {
                let unit_price = pricing::adjust(data.base_price, multiplier);
                let line_total = pricing::line_total(unit_price, data.quantity);
                CartLineView {
                    line_id: data.line_id,
                    catalog_item_id: data.catalog_item_id,
                    name: data.name,
                    image: data.image,
                    quantity: data.quantity,
                    unit_price,
                    line_total,
                }
            })
            .collect();
        let total = pricing::order_total(lines.iter().map(|l| (l.unit_price, l.quantity)));
        Self {
            order_id,
            order_number,
            lines,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().expect("decimal literal")
    }

    fn data(id: i32, base_price: Option<Decimal>, quantity: i32) -> CartLineData {
        CartLineData {
            line_id: OrderLineId::new(id),
            catalog_item_id: CatalogItemId::new(id),
            name: format!("Item {id}"),
            image: None,
            quantity,
            base_price,
        }
    }

    #[test]
    fn test_assemble_adjusts_prices_live() {
        let view = CartView::assemble(
            OrderId::new(1),
            OrderNumber::from_suffix(1),
            vec![data(1, Some(dec("25.00")), 2)],
            dec("1.5"),
        );
        let line = view.lines.first().expect("one line");
        assert_eq!(line.unit_price, Some(dec("37.50")));
        assert_eq!(line.line_total, dec("75.00"));
        assert_eq!(view.total, dec("75.00"));
    }

    #[test]
    fn test_market_priced_lines_contribute_zero() {
        let view = CartView::assemble(
            OrderId::new(1),
            OrderNumber::from_suffix(1),
            vec![data(1, None, 4), data(2, Some(dec("10.00")), 1)],
            dec("2"),
        );
        assert_eq!(view.lines.first().expect("line").unit_price, None);
        assert_eq!(view.total, dec("20.00"));
    }
}
