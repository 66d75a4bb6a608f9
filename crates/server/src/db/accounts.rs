//! Account repository for database operations.
//!
//! Accounts are administered outside this engine; this repository only
//! reads the immutable per-request snapshot (identity, approval, role,
//! price multiplier) used by every operation.

use rust_decimal::Decimal;
use sqlx::PgPool;

use tradecart_core::{AccountId, AccountRole, AccountSnapshot};

use super::RepositoryError;

/// Internal row type for account snapshot queries.
#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: i32,
    email: String,
    approved: bool,
    role: String,
    price_multiplier: Decimal,
}

impl TryFrom<AccountRow> for AccountSnapshot {
    type Error = RepositoryError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let role: AccountRole = row.role.parse().map_err(|e: String| {
            RepositoryError::DataCorruption(format!("invalid role in database: {e}"))
        })?;

        Ok(Self {
            id: AccountId::new(row.id),
            email: row.email,
            approved: row.approved,
            role,
            price_multiplier: row.price_multiplier,
        })
    }
}

/// Repository for account reads.
pub struct AccountRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AccountRepository<'a> {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Resolve a bearer token to the account snapshot it belongs to.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored role is invalid.
    pub async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<AccountSnapshot>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r"
            SELECT a.id, a.email, a.approved, a.role, a.price_multiplier
            FROM trade.account a
            JOIN trade.api_token t ON t.account_id = a.id
            WHERE t.token = $1
            ",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get an account snapshot by ID.
    ///
    /// Re-reads the row where an account could vanish between token
    /// resolution and a cart write.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored role is invalid.
    pub async fn find_by_id(
        &self,
        id: AccountId,
    ) -> Result<Option<AccountSnapshot>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r"
            SELECT id, email, approved, role, price_multiplier
            FROM trade.account
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }
}
