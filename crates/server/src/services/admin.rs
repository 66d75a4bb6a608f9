//! Admin operations: fulfillment status updates and market-price entry.
//!
//! Role enforcement happens in the auth extractor; these methods trust
//! that the caller is an admin.

use rust_decimal::Decimal;
use sqlx::PgPool;

use tradecart_core::{OrderId, OrderLineId, OrderStatus};

use super::EngineError;
use crate::db::OrderRepository;
use crate::models::OrderWithLines;

/// Admin-only order mutations.
pub struct AdminOrderService<'a> {
    orders: OrderRepository<'a>,
}

impl<'a> AdminOrderService<'a> {
    /// Create a new admin order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
        }
    }

    /// Write a new fulfillment status unconditionally.
    ///
    /// Enum membership is the only validation: the edge table in
    /// `OrderStatus::can_transition` is deliberately NOT enforced here,
    /// so an admin may move an order out of `DELIVERED`. Matches the
    /// current product behavior; see the transition table docs.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` if the order does not exist.
    /// Returns `EngineError::Repository` for database failures.
    pub async fn set_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<OrderWithLines, EngineError> {
        let touched = self.orders.update_status(order_id, status).await?;
        if touched == 0 {
            return Err(EngineError::NotFound(format!("order {order_id} not found")));
        }
        self.fetch(order_id).await
    }

    /// Overwrite a snapshotted line price and return the recomputed order.
    ///
    /// The one way a market-priced line (`price = NULL` after checkout)
    /// gets its real price. Remaining unresolved lines count as zero in
    /// the returned total.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` if the line does not belong to the
    /// given order.
    /// Returns `EngineError::Repository` for database failures.
    pub async fn set_line_price(
        &self,
        order_id: OrderId,
        line_id: OrderLineId,
        price: Decimal,
    ) -> Result<OrderWithLines, EngineError> {
        let touched = self.orders.set_line_price(order_id, line_id, price).await?;
        if touched == 0 {
            return Err(EngineError::NotFound(format!(
                "order line {line_id} not found on order {order_id}"
            )));
        }
        self.fetch(order_id).await
    }

    async fn fetch(&self, order_id: OrderId) -> Result<OrderWithLines, EngineError> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("order {order_id} not found")))?;
        let lines = self.orders.lines(order_id).await?;
        Ok(OrderWithLines::assemble(order, lines))
    }
}
