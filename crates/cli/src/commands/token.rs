//! API token commands.
//!
//! # Usage
//!
//! ```bash
//! tradecart token issue -e buyer@example.com
//! ```
//!
//! Tokens are opaque 40-character alphanumeric strings presented as
//! `Authorization: Bearer <token>` to the engine API. Issued tokens are
//! printed once and stored in plain text; rotate by issuing a new one and
//! deleting the old row.

use rand::Rng;
use rand::distr::Alphanumeric;

use super::{CommandError, connect};

const TOKEN_LENGTH: usize = 40;

fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Issue a new API token for the account with the given email.
///
/// # Errors
///
/// Returns `CommandError::AccountNotFound` if no account has the email.
pub async fn issue(email: &str) -> Result<String, CommandError> {
    let pool = connect().await?;

    let account_id = sqlx::query_scalar::<_, i32>("SELECT id FROM trade.account WHERE email = $1")
        .bind(email)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| CommandError::AccountNotFound(email.to_owned()))?;

    let token = generate_token();

    sqlx::query("INSERT INTO trade.api_token (token, account_id) VALUES ($1, $2)")
        .bind(&token)
        .bind(account_id)
        .execute(&pool)
        .await?;

    tracing::info!("Token issued for {email} (account {account_id})");

    #[allow(clippy::print_stdout)]
    {
        println!("{token}");
    }

    Ok(token)
}
