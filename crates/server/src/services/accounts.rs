//! Current-account resolution.
//!
//! The engine never looks accounts up through a global; every request
//! resolves its bearer token through an injected [`CurrentAccountProvider`]
//! into an immutable [`AccountSnapshot`] that the operations receive as a
//! plain argument. The production implementation reads `PostgreSQL`;
//! tests can inject anything that implements the trait.

use std::future::Future;
use std::pin::Pin;

use sqlx::PgPool;

use tradecart_core::AccountSnapshot;

use crate::db::{AccountRepository, RepositoryError};

/// Boxed future returned by [`CurrentAccountProvider::resolve`].
pub type ResolveFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Option<AccountSnapshot>, RepositoryError>> + Send + 'a>>;

/// Resolves a bearer token to the calling account's immutable snapshot.
///
/// Returns `Ok(None)` for an unknown token; the middleware turns that
/// into an `Unauthorized` response.
pub trait CurrentAccountProvider: Send + Sync {
    fn resolve<'a>(&'a self, token: &'a str) -> ResolveFuture<'a>;
}

/// Production provider backed by the `trade.api_token` table.
pub struct PgAccountProvider {
    pool: PgPool,
}

impl PgAccountProvider {
    /// Create a provider over the given pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CurrentAccountProvider for PgAccountProvider {
    fn resolve<'a>(&'a self, token: &'a str) -> ResolveFuture<'a> {
        Box::pin(async move { AccountRepository::new(&self.pool).find_by_token(token).await })
    }
}
