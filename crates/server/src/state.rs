//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::EngineConfig;
use crate::services::{CurrentAccountProvider, PgAccountProvider};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; provides access to the database pool,
/// configuration, and the injected account provider.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: EngineConfig,
    pool: PgPool,
    accounts: Arc<dyn CurrentAccountProvider>,
}

impl AppState {
    /// Create the production state with the Postgres-backed account
    /// provider.
    #[must_use]
    pub fn new(config: EngineConfig, pool: PgPool) -> Self {
        let accounts = Arc::new(PgAccountProvider::new(pool.clone()));
        Self::with_provider(config, pool, accounts)
    }

    /// Create state with an explicit account provider (tests).
    #[must_use]
    pub fn with_provider(
        config: EngineConfig,
        pool: PgPool,
        accounts: Arc<dyn CurrentAccountProvider>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                accounts,
            }),
        }
    }

    /// Get a reference to the engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the account provider.
    #[must_use]
    pub fn accounts(&self) -> &dyn CurrentAccountProvider {
        self.inner.accounts.as_ref()
    }
}
