//! Account management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create an approved customer account
//! tradecart account create -e buyer@example.com --approve
//!
//! # Create an admin account
//! tradecart account create -e ops@example.com --approve --admin
//!
//! # Set an account's price multiplier
//! tradecart account set-multiplier -e buyer@example.com -m 1.25
//! ```
//!
//! # Environment Variables
//!
//! - `TRADECART_DATABASE_URL` - `PostgreSQL` connection string

use rust_decimal::Decimal;

use tradecart_core::pricing;

use super::{CommandError, connect};

fn parse_multiplier(raw: &str) -> Result<Decimal, CommandError> {
    let multiplier: Decimal = raw
        .parse()
        .map_err(|_| CommandError::InvalidMultiplier(raw.to_owned()))?;

    if !pricing::is_valid_multiplier(multiplier) {
        return Err(CommandError::InvalidMultiplier(raw.to_owned()));
    }

    Ok(multiplier)
}

/// Create a new account.
///
/// # Errors
///
/// Returns `CommandError` if the email is invalid, the account already
/// exists, the multiplier is out of range, or the database errors.
pub async fn create(
    email: &str,
    approve: bool,
    admin: bool,
    multiplier: Option<&str>,
) -> Result<i32, CommandError> {
    // Basic email validation
    if !email.contains('@') || !email.contains('.') {
        return Err(CommandError::InvalidEmail(email.to_owned()));
    }

    let multiplier = match multiplier {
        Some(raw) => parse_multiplier(raw)?,
        None => Decimal::ONE,
    };

    let role = if admin { "ADMIN" } else { "CUSTOMER" };

    let pool = connect().await?;

    let existing = sqlx::query_scalar::<_, i32>("SELECT id FROM trade.account WHERE email = $1")
        .bind(email)
        .fetch_optional(&pool)
        .await?;

    if existing.is_some() {
        return Err(CommandError::AccountExists(email.to_owned()));
    }

    let account_id = sqlx::query_scalar::<_, i32>(
        r"
        INSERT INTO trade.account (email, approved, role, price_multiplier)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        ",
    )
    .bind(email)
    .bind(approve)
    .bind(role)
    .bind(multiplier)
    .fetch_one(&pool)
    .await?;

    tracing::info!(
        "Account created! ID: {account_id}, Email: {email}, Role: {role}, \
         Approved: {approve}, Multiplier: {multiplier}"
    );

    Ok(account_id)
}

/// Approve an existing account for checkout.
///
/// # Errors
///
/// Returns `CommandError::AccountNotFound` if no account has the email.
pub async fn approve(email: &str) -> Result<(), CommandError> {
    let pool = connect().await?;

    let result = sqlx::query("UPDATE trade.account SET approved = TRUE WHERE email = $1")
        .bind(email)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(CommandError::AccountNotFound(email.to_owned()));
    }

    tracing::info!("Account approved: {email}");
    Ok(())
}

/// Set an account's price multiplier.
///
/// # Errors
///
/// Returns `CommandError::InvalidMultiplier` if the value does not parse
/// or is outside `[0.5, 20.0]`.
/// Returns `CommandError::AccountNotFound` if no account has the email.
pub async fn set_multiplier(email: &str, raw: &str) -> Result<(), CommandError> {
    let multiplier = parse_multiplier(raw)?;

    let pool = connect().await?;

    let result = sqlx::query("UPDATE trade.account SET price_multiplier = $2 WHERE email = $1")
        .bind(email)
        .bind(multiplier)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(CommandError::AccountNotFound(email.to_owned()));
    }

    tracing::info!("Multiplier for {email} set to {multiplier}");
    Ok(())
}
