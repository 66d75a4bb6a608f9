//! Catalog repository for database operations.
//!
//! The engine never writes catalog rows; it reads them to price draft
//! carts and to freeze snapshots at checkout.

use rust_decimal::Decimal;
use sqlx::PgPool;

use tradecart_core::CatalogItemId;

use super::RepositoryError;
use crate::models::CatalogItem;

/// Internal row type for catalog queries.
#[derive(Debug, sqlx::FromRow)]
struct CatalogItemRow {
    id: i32,
    name: String,
    image: Option<String>,
    base_price: Option<Decimal>,
}

impl From<CatalogItemRow> for CatalogItem {
    fn from(row: CatalogItemRow) -> Self {
        Self {
            id: CatalogItemId::new(row.id),
            name: row.name,
            image: row.image,
            base_price: row.base_price,
        }
    }
}

/// Repository for catalog reads.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Look up a single catalog item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_id(
        &self,
        id: CatalogItemId,
    ) -> Result<Option<CatalogItem>, RepositoryError> {
        let row = sqlx::query_as::<_, CatalogItemRow>(
            r"
            SELECT id, name, image, base_price
            FROM trade.catalog_item
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Look up several catalog items at once (batch add, checkout).
    ///
    /// Returns only the items that exist; callers compare against the
    /// requested set to detect dead references.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_ids(
        &self,
        ids: &[CatalogItemId],
    ) -> Result<Vec<CatalogItem>, RepositoryError> {
        let raw: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();
        let rows = sqlx::query_as::<_, CatalogItemRow>(
            r"
            SELECT id, name, image, base_price
            FROM trade.catalog_item
            WHERE id = ANY($1)
            ",
        )
        .bind(&raw)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
