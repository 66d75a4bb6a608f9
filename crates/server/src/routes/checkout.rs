//! Checkout route handler.

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use tradecart_core::AddressId;

use crate::error::{AppError, Result};
use crate::middleware::RequireAccount;
use crate::models::{NewAddress, OrderWithLines};
use crate::services::{CheckoutService, checkout::AddressChoice};
use crate::state::AppState;

/// Checkout payload.
///
/// Exactly one of `delivery_address_id` (an address from the account's
/// book) or `address` (fresh fields) must be supplied. `save_address`
/// persists fresh fields to the book.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub delivery_address_id: Option<AddressId>,
    pub address: Option<NewAddress>,
    #[serde(default)]
    pub save_address: bool,
    pub notes: Option<String>,
}

impl CheckoutRequest {
    fn address_choice(self) -> std::result::Result<(AddressChoice, Option<String>), AppError> {
        let choice = match (self.delivery_address_id, self.address) {
            (Some(id), None) => AddressChoice::Existing(id),
            (None, Some(fields)) => AddressChoice::New(fields),
            (Some(_), Some(_)) => {
                return Err(AppError::Validation(
                    "provide either delivery_address_id or address, not both".to_owned(),
                ));
            }
            (None, None) => {
                return Err(AppError::Validation(
                    "a delivery address is required".to_owned(),
                ));
            }
        };
        Ok((choice, self.notes))
    }
}

/// `POST /checkout` - convert the draft order into a `PENDING` order,
/// freezing line snapshots.
#[instrument(skip_all, fields(account_id = %account.id))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireAccount(account): RequireAccount,
    Json(payload): Json<CheckoutRequest>,
) -> Result<Json<OrderWithLines>> {
    let save_address = payload.save_address;
    let (choice, notes) = payload.address_choice()?;
    let order = CheckoutService::new(state.pool())
        .checkout(&account, choice, save_address, notes)
        .await?;
    Ok(Json(order))
}
