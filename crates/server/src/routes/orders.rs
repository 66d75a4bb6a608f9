//! Order history and cancellation route handlers.

use axum::{Json, extract::Path, extract::State};
use serde::Deserialize;
use tracing::instrument;

use tradecart_core::OrderId;

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAccount;
use crate::models::{Order, OrderWithLines};
use crate::services::CheckoutService;
use crate::state::AppState;

/// Cancel payload.
#[derive(Debug, Default, Deserialize)]
pub struct CancelRequest {
    /// When set, the cancelled order is resurrected as the account's cart
    /// instead of being kept as a `CANCELLED` record.
    #[serde(default)]
    pub convert_to_cart: bool,
}

/// `GET /orders` - the account's placed orders, newest first.
#[instrument(skip_all, fields(account_id = %account.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAccount(account): RequireAccount,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_placed_for_account(account.id)
        .await?;
    Ok(Json(orders))
}

/// `GET /orders/{order_id}` - one of the account's orders with lines and
/// total.
#[instrument(skip_all, fields(account_id = %account.id, order_id = %order_id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAccount(account): RequireAccount,
    Path(order_id): Path<OrderId>,
) -> Result<Json<OrderWithLines>> {
    let repo = OrderRepository::new(state.pool());
    let order = repo
        .find_owned(order_id, account.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))?;
    let lines = repo.lines(order.id).await?;
    Ok(Json(OrderWithLines::assemble(order, lines)))
}

/// `POST /orders/{order_id}/cancel` - customer cancellation of a
/// `PENDING` order, optionally converting it back into the cart.
#[instrument(skip_all, fields(account_id = %account.id, order_id = %order_id))]
pub async fn cancel(
    State(state): State<AppState>,
    RequireAccount(account): RequireAccount,
    Path(order_id): Path<OrderId>,
    payload: Option<Json<CancelRequest>>,
) -> Result<Json<OrderWithLines>> {
    let convert = payload.map(|Json(p)| p.convert_to_cart).unwrap_or_default();
    let order = CheckoutService::new(state.pool())
        .cancel(&account, order_id, convert)
        .await?;
    Ok(Json(order))
}
