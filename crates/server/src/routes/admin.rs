//! Admin route handlers: fulfillment status and market-price entry.

use axum::{Json, extract::Path, extract::State};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use tradecart_core::{OrderId, OrderLineId, OrderStatus};

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::OrderWithLines;
use crate::services::AdminOrderService;
use crate::state::AppState;

/// Status update payload; serde rejects anything outside the six known
/// values before the handler runs.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: OrderStatus,
}

/// Line price payload.
#[derive(Debug, Deserialize)]
pub struct SetLinePriceRequest {
    pub price: Decimal,
}

/// `PUT /admin/orders/{order_id}/status` - unconditional status write.
#[instrument(skip_all, fields(admin_id = %admin.id, order_id = %order_id, status = %payload.status))]
pub async fn set_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(order_id): Path<OrderId>,
    Json(payload): Json<SetStatusRequest>,
) -> Result<Json<OrderWithLines>> {
    let order = AdminOrderService::new(state.pool())
        .set_status(order_id, payload.status)
        .await?;
    Ok(Json(order))
}

/// `PUT /admin/orders/{order_id}/lines/{line_id}/price` - resolve a
/// market-priced line; responds with the recomputed order total.
#[instrument(skip_all, fields(admin_id = %admin.id, order_id = %order_id, line_id = %line_id))]
pub async fn set_line_price(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path((order_id, line_id)): Path<(OrderId, OrderLineId)>,
    Json(payload): Json<SetLinePriceRequest>,
) -> Result<Json<OrderWithLines>> {
    let order = AdminOrderService::new(state.pool())
        .set_line_price(order_id, line_id, payload.price)
        .await?;
    Ok(Json(order))
}
