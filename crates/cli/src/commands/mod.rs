//! CLI command implementations.

pub mod account;
pub mod migrate;
pub mod seed;
pub mod token;

use sqlx::PgPool;
use thiserror::Error;

/// Errors shared by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// No account with the given email.
    #[error("No account found with email: {0}")]
    AccountNotFound(String),

    /// Account already exists.
    #[error("Account already exists with email: {0}")]
    AccountExists(String),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Multiplier failed to parse or is out of range.
    #[error("Invalid multiplier: {0}. Must be a decimal in [0.5, 20.0]")]
    InvalidMultiplier(String),
}

/// Connect to the engine database using `TRADECART_DATABASE_URL`.
pub async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("TRADECART_DATABASE_URL")
        .map_err(|_| CommandError::MissingEnvVar("TRADECART_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(PgPool::connect(&database_url).await?)
}
