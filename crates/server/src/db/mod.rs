//! Database operations for the order engine (`PostgreSQL`).
//!
//! # Schema: `trade`
//!
//! ## Tables
//!
//! - `account` - Customer/admin accounts with approval flag and price multiplier
//! - `api_token` - Bearer tokens resolved to accounts (issued externally)
//! - `catalog_item` - Purchasable items; `base_price IS NULL` means market-priced
//! - `address` - Delivery addresses; `account_id IS NULL` means not saved to a book
//! - `orders` - The order aggregate (draft carts and placed orders)
//! - `order_line` - Lines with post-checkout price/name/image snapshots
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p tradecart-cli -- migrate
//! ```
//!
//! All queries use the runtime-checked sqlx API (`query_as` with explicit
//! row types), so the workspace builds without a live database.

pub mod accounts;
pub mod addresses;
pub mod catalog;
pub mod orders;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use accounts::AccountRepository;
pub use addresses::AddressRepository;
pub use catalog::CatalogRepository;
pub use orders::OrderRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// State conflict: the row set changed under a multi-step operation.
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
