//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! tradecart migrate
//! ```
//!
//! # Environment Variables
//!
//! - `TRADECART_DATABASE_URL` - `PostgreSQL` connection string

use super::{CommandError, connect};

/// Run the order engine database migrations.
///
/// # Errors
///
/// Returns `CommandError` if the connection fails or a migration errors.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
