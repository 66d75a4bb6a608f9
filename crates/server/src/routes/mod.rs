//! HTTP route handlers for the order engine.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                                      - Health check
//!
//! # Cart (requires account)
//! GET    /cart                                        - Live cart view
//! DELETE /cart                                        - Clear cart
//! POST   /cart/items                                  - Add item (overwrites quantity)
//! POST   /cart/items/batch                            - Batch add (increments, one tx)
//! PATCH  /cart/items/{line_id}                        - Update quantity (<= 0 deletes)
//! DELETE /cart/items/{line_id}                        - Remove line
//!
//! # Checkout & orders (requires account)
//! POST   /checkout                                    - Draft -> PENDING with snapshots
//! GET    /orders                                      - Placed-order history
//! GET    /orders/{order_id}                           - One placed order
//! POST   /orders/{order_id}/cancel                    - Cancel (optionally back to cart)
//!
//! # Address book (requires account)
//! GET    /addresses                                   - List saved addresses
//! PATCH  /addresses/{address_id}                      - Partial update
//!
//! # Admin (requires ADMIN role)
//! PUT    /admin/orders/{order_id}/status              - Set fulfillment status
//! PUT    /admin/orders/{order_id}/lines/{line_id}/price - Resolve market price
//! ```

pub mod addresses;
pub mod admin;
pub mod cart;
pub mod checkout;
pub mod health;
pub mod orders;

use axum::{
    Router,
    routing::{get, patch, post, put},
};
use tower_http::trace::TraceLayer;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Assemble the full application router with middleware layers.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::check))
        .route("/cart", get(cart::show).delete(cart::clear))
        .route("/cart/items", post(cart::add_item))
        .route("/cart/items/batch", post(cart::batch_add))
        .route(
            "/cart/items/{line_id}",
            patch(cart::update_item).delete(cart::remove_item),
        )
        .route("/checkout", post(checkout::checkout))
        .route("/orders", get(orders::index))
        .route("/orders/{order_id}", get(orders::show))
        .route("/orders/{order_id}/cancel", post(orders::cancel))
        .route("/addresses", get(addresses::index))
        .route("/addresses/{address_id}", patch(addresses::update))
        .route("/admin/orders/{order_id}/status", put(admin::set_status))
        .route(
            "/admin/orders/{order_id}/lines/{line_id}/price",
            put(admin::set_line_price),
        )
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
        .with_state(state)
}
