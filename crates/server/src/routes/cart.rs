//! Cart route handlers.

use axum::{Json, extract::Path, extract::State};
use serde::Deserialize;
use tracing::instrument;

use tradecart_core::{CatalogItemId, OrderLineId};

use crate::error::Result;
use crate::middleware::RequireAccount;
use crate::models::CartView;
use crate::services::{CartService, cart::QuantitySpec};
use crate::state::AppState;

/// Add-to-cart payload.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub catalog_item_id: CatalogItemId,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

const fn default_quantity() -> i32 {
    1
}

/// Batch add payload; `quantities` may be omitted, a scalar, or an array.
#[derive(Debug, Deserialize)]
pub struct BatchAddRequest {
    pub item_ids: Vec<CatalogItemId>,
    #[serde(default)]
    pub quantities: Option<QuantitySpec>,
}

/// Quantity update payload.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i32,
}

/// `GET /cart` - the live cart, creating the draft order on first read.
#[instrument(skip_all, fields(account_id = %account.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAccount(account): RequireAccount,
) -> Result<Json<CartView>> {
    let cart = CartService::new(state.pool())
        .get_or_create_cart(&account)
        .await?;
    Ok(Json(cart))
}

/// `POST /cart/items` - add an item; an existing line's quantity is
/// overwritten, not incremented.
#[instrument(skip_all, fields(account_id = %account.id, catalog_item_id = %payload.catalog_item_id))]
pub async fn add_item(
    State(state): State<AppState>,
    RequireAccount(account): RequireAccount,
    Json(payload): Json<AddItemRequest>,
) -> Result<Json<CartView>> {
    let cart = CartService::new(state.pool())
        .add_item(&account, payload.catalog_item_id, payload.quantity)
        .await?;
    Ok(Json(cart))
}

/// `POST /cart/items/batch` - all-or-nothing batch add with increment
/// semantics.
#[instrument(skip_all, fields(account_id = %account.id, items = payload.item_ids.len()))]
pub async fn batch_add(
    State(state): State<AppState>,
    RequireAccount(account): RequireAccount,
    Json(payload): Json<BatchAddRequest>,
) -> Result<Json<CartView>> {
    let cart = CartService::new(state.pool())
        .batch_add_items(&account, &payload.item_ids, payload.quantities.as_ref())
        .await?;
    Ok(Json(cart))
}

/// `PATCH /cart/items/{line_id}` - set quantity; `<= 0` deletes the line.
#[instrument(skip_all, fields(account_id = %account.id, line_id = %line_id))]
pub async fn update_item(
    State(state): State<AppState>,
    RequireAccount(account): RequireAccount,
    Path(line_id): Path<OrderLineId>,
    Json(payload): Json<UpdateItemRequest>,
) -> Result<Json<CartView>> {
    let cart = CartService::new(state.pool())
        .update_item_quantity(&account, line_id, payload.quantity)
        .await?;
    Ok(Json(cart))
}

/// `DELETE /cart/items/{line_id}` - remove a line.
#[instrument(skip_all, fields(account_id = %account.id, line_id = %line_id))]
pub async fn remove_item(
    State(state): State<AppState>,
    RequireAccount(account): RequireAccount,
    Path(line_id): Path<OrderLineId>,
) -> Result<Json<CartView>> {
    let cart = CartService::new(state.pool())
        .remove_item(&account, line_id)
        .await?;
    Ok(Json(cart))
}

/// `DELETE /cart` - delete every line of the cart.
#[instrument(skip_all, fields(account_id = %account.id))]
pub async fn clear(
    State(state): State<AppState>,
    RequireAccount(account): RequireAccount,
) -> Result<Json<CartView>> {
    let cart = CartService::new(state.pool()).clear_cart(&account).await?;
    Ok(Json(cart))
}
