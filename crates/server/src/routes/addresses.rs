//! Address book route handlers.

use axum::{Json, extract::Path, extract::State};
use tracing::instrument;

use tradecart_core::AddressId;

use crate::db::AddressRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAccount;
use crate::models::{Address, AddressPatch};
use crate::state::AppState;

/// `GET /addresses` - the account's saved addresses.
#[instrument(skip_all, fields(account_id = %account.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAccount(account): RequireAccount,
) -> Result<Json<Vec<Address>>> {
    let addresses = AddressRepository::new(state.pool())
        .list_for_account(account.id)
        .await?;
    Ok(Json(addresses))
}

/// `PATCH /addresses/{address_id}` - apply only the fields present in
/// the payload; absent fields keep their stored values.
#[instrument(skip_all, fields(account_id = %account.id, address_id = %address_id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAccount(account): RequireAccount,
    Path(address_id): Path<AddressId>,
    Json(patch): Json<AddressPatch>,
) -> Result<Json<Address>> {
    if patch.is_empty() {
        return Err(AppError::Validation(
            "at least one address field is required".to_owned(),
        ));
    }

    let address = AddressRepository::new(state.pool())
        .update_owned(address_id, account.id, &patch)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("address {address_id} not found")))?;
    Ok(Json(address))
}
