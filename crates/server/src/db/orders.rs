//! Order repository: the persistent heart of the engine.
//!
//! Owns the `orders` and `order_line` tables. Multi-step mutations that
//! must not be partially observable (checkout snapshotting, batch add,
//! cancel-to-cart) run inside a single transaction here; everything else
//! is a short single-statement write.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use tradecart_core::{
    AccountId, AddressId, CatalogItemId, OrderId, OrderLineId, OrderNumber, OrderStatus,
};

use super::{AddressRepository, RepositoryError};
use crate::models::{CartLineData, NewAddress, Order, OrderLine};

/// Internal row type for order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    order_number: String,
    account_id: i32,
    status: String,
    delivery_address_id: i32,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status: OrderStatus = row.status.parse().map_err(|e: String| {
            RepositoryError::DataCorruption(format!("invalid status in database: {e}"))
        })?;
        let order_number = OrderNumber::parse(&row.order_number).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order number in database: {e}"))
        })?;

        Ok(Self {
            id: OrderId::new(row.id),
            order_number,
            account_id: AccountId::new(row.account_id),
            status,
            delivery_address_id: AddressId::new(row.delivery_address_id),
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Internal row type for order line queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    id: i32,
    order_id: i32,
    catalog_item_id: i32,
    quantity: i32,
    price: Option<Decimal>,
    name_snapshot: Option<String>,
    image_snapshot: Option<String>,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        Self {
            id: OrderLineId::new(row.id),
            order_id: OrderId::new(row.order_id),
            catalog_item_id: CatalogItemId::new(row.catalog_item_id),
            quantity: row.quantity,
            price: row.price,
            name_snapshot: row.name_snapshot,
            image_snapshot: row.image_snapshot,
        }
    }
}

/// Internal row type for the cart view join.
#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    line_id: i32,
    catalog_item_id: i32,
    name: String,
    image: Option<String>,
    quantity: i32,
    base_price: Option<Decimal>,
}

impl From<CartLineRow> for CartLineData {
    fn from(row: CartLineRow) -> Self {
        Self {
            line_id: OrderLineId::new(row.line_id),
            catalog_item_id: CatalogItemId::new(row.catalog_item_id),
            name: row.name,
            image: row.image,
            quantity: row.quantity,
            base_price: row.base_price,
        }
    }
}

/// A line's parent-order context, used for ownership and status checks.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LineContext {
    pub line_id: i32,
    pub order_id: i32,
    pub account_id: i32,
    pub status: String,
}

/// The frozen values checkout writes onto one line.
#[derive(Debug, Clone)]
pub struct LineSnapshot {
    pub line_id: OrderLineId,
    /// `None` for market-priced items (resolved later by admin).
    pub price: Option<Decimal>,
    pub name: String,
    pub image: Option<String>,
}

/// Delivery address resolution for checkout.
#[derive(Debug)]
pub enum CheckoutAddress<'a> {
    /// An already-validated address from the account's book.
    Existing(AddressId),
    /// New fields; inserted inside the checkout transaction, saved to the
    /// book only when `account_id` is present.
    New {
        fields: &'a NewAddress,
        account_id: Option<AccountId>,
    },
}

const ORDER_COLUMNS: &str = "id, order_number, account_id, status, delivery_address_id, \
     notes, created_at, updated_at";

const LINE_COLUMNS: &str =
    "id, order_id, catalog_item_id, quantity, price, name_snapshot, image_snapshot";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Cart (draft order)
    // =========================================================================

    /// Find the account's draft order, if one exists.
    ///
    /// Read-then-create with no partial unique index: two simultaneous
    /// first adds can both observe `None` here and create two carts. Kept
    /// as-is; see the migration notes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_cart(&self, account_id: AccountId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM trade.orders
            WHERE account_id = $1 AND status = 'CART'
            ORDER BY id
            LIMIT 1
            "
        ))
        .bind(account_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a draft order for the account.
    ///
    /// Allocates the next sequential order number and the placeholder
    /// address row in the same transaction as the order insert.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the account row no longer
    /// exists (foreign key violation on insert).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_cart(&self, account_id: AccountId) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (highest,): (i32,) = sqlx::query_as(
            r"
            SELECT COALESCE(MAX((substring(order_number from '[0-9]+$'))::int), 0)
            FROM trade.orders
            ",
        )
        .fetch_one(&mut *tx)
        .await?;

        let order_number =
            OrderNumber::next_after(u32::try_from(highest).unwrap_or_default());

        let address_id = AddressRepository::create_placeholder(&mut *tx).await?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            INSERT INTO trade.orders (order_number, account_id, status, delivery_address_id)
            VALUES ($1, $2, 'CART', $3)
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(order_number.as_str())
        .bind(account_id.as_i32())
        .bind(address_id.as_i32())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        tx.commit().await?;

        row.try_into()
    }

    /// Draft-order lines joined to current catalog data.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn cart_lines(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<CartLineData>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT l.id AS line_id, l.catalog_item_id, c.name, c.image,
                   l.quantity, c.base_price
            FROM trade.order_line l
            JOIN trade.catalog_item c ON c.id = l.catalog_item_id
            WHERE l.order_id = $1
            ORDER BY l.id
            ",
        )
        .bind(order_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Insert a line, or overwrite the quantity of an existing line for
    /// the same catalog item (idempotent "set quantity" semantics).
    ///
    /// New lines start with the `price = 0` placeholder the draft ignores.
    /// The CTE locks the parent order row and requires it to still be a
    /// draft, so an insert racing a checkout waits for the checkout's
    /// transaction and then touches nothing. Returns the number of rows
    /// written (0 when the order is no longer a draft).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn upsert_line_overwrite(
        &self,
        order_id: OrderId,
        catalog_item_id: CatalogItemId,
        quantity: i32,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            WITH draft AS (
                SELECT id FROM trade.orders
                WHERE id = $1 AND status = 'CART'
                FOR UPDATE
            )
            INSERT INTO trade.order_line (order_id, catalog_item_id, quantity, price)
            SELECT draft.id, $2, $3, 0 FROM draft
            ON CONFLICT (order_id, catalog_item_id)
            DO UPDATE SET quantity = EXCLUDED.quantity
            ",
        )
        .bind(order_id.as_i32())
        .bind(catalog_item_id.as_i32())
        .bind(quantity)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Batch insert/increment in a single transaction (all-or-nothing).
    ///
    /// Unlike the single add, an existing line's quantity is INCREMENTED
    /// by the requested amount. Naive client retries therefore
    /// double-increment; callers must dedupe.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order stops being a
    /// draft mid-batch (checked out concurrently).
    /// Returns `RepositoryError::Database` if any statement fails. Either
    /// way the whole batch rolls back.
    pub async fn batch_add_lines(
        &self,
        order_id: OrderId,
        entries: &[(CatalogItemId, i32)],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        for (catalog_item_id, quantity) in entries {
            let result = sqlx::query(
                r"
                WITH draft AS (
                    SELECT id FROM trade.orders
                    WHERE id = $1 AND status = 'CART'
                    FOR UPDATE
                )
                INSERT INTO trade.order_line AS l (order_id, catalog_item_id, quantity, price)
                SELECT draft.id, $2, $3, 0 FROM draft
                ON CONFLICT (order_id, catalog_item_id)
                DO UPDATE SET quantity = l.quantity + EXCLUDED.quantity
                ",
            )
            .bind(order_id.as_i32())
            .bind(catalog_item_id.as_i32())
            .bind(*quantity)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(RepositoryError::Conflict(
                    "cart is no longer a draft".to_owned(),
                ));
            }
        }

        tx.commit().await?;

        Ok(())
    }

    /// A line with its parent order's owner and status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn line_context(
        &self,
        line_id: OrderLineId,
    ) -> Result<Option<LineContext>, RepositoryError> {
        let row = sqlx::query_as::<_, LineContext>(
            r"
            SELECT l.id AS line_id, o.id AS order_id, o.account_id, o.status
            FROM trade.order_line l
            JOIN trade.orders o ON o.id = l.order_id
            WHERE l.id = $1
            ",
        )
        .bind(line_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Overwrite a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_line_quantity(
        &self,
        line_id: OrderLineId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE trade.order_line SET quantity = $2 WHERE id = $1")
            .bind(line_id.as_i32())
            .bind(quantity)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Delete a single line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_line(&self, line_id: OrderLineId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM trade.order_line WHERE id = $1")
            .bind(line_id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Delete every line of an order (clear cart).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear_lines(&self, order_id: OrderId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM trade.order_line WHERE order_id = $1")
            .bind(order_id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(())
    }

    // =========================================================================
    // Placed orders
    // =========================================================================

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_id(&self, order_id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM trade.orders
            WHERE id = $1
            "
        ))
        .bind(order_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get an order only if it belongs to the given account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_owned(
        &self,
        order_id: OrderId,
        account_id: AccountId,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM trade.orders
            WHERE id = $1 AND account_id = $2
            "
        ))
        .bind(order_id.as_i32())
        .bind(account_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List the account's placed orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_placed_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM trade.orders
            WHERE account_id = $1 AND status <> 'CART'
            ORDER BY id DESC
            "
        ))
        .bind(account_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// All lines of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines(&self, order_id: OrderId) -> Result<Vec<OrderLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderLineRow>(&format!(
            r"
            SELECT {LINE_COLUMNS}
            FROM trade.order_line
            WHERE order_id = $1
            ORDER BY id
            "
        ))
        .bind(order_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    // =========================================================================
    // Checkout and cancellation
    // =========================================================================

    /// Convert a draft order into a placed order.
    ///
    /// In one transaction: locks the draft's order row (the same lock the
    /// line inserts take, so concurrent adds serialize behind it),
    /// verifies the line set still matches `snapshots`, freezes
    /// name/image/price onto every line, resolves the delivery address
    /// (inserting a new row if needed), and moves the status to
    /// `PENDING`. Any failure rolls the whole operation back - partial
    /// snapshotting is never observable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order is no longer a
    /// draft, or if its lines changed after `snapshots` was computed.
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn checkout(
        &self,
        order_id: OrderId,
        snapshots: &[LineSnapshot],
        address: CheckoutAddress<'_>,
        notes: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let locked = sqlx::query(
            r"
            SELECT id FROM trade.orders
            WHERE id = $1 AND status = 'CART'
            FOR UPDATE
            ",
        )
        .bind(order_id.as_i32())
        .fetch_optional(&mut *tx)
        .await?;

        if locked.is_none() {
            return Err(RepositoryError::Conflict(
                "order is no longer a draft".to_owned(),
            ));
        }

        let current: Vec<(i32,)> =
            sqlx::query_as("SELECT id FROM trade.order_line WHERE order_id = $1")
                .bind(order_id.as_i32())
                .fetch_all(&mut *tx)
                .await?;
        let snapshotted: HashSet<i32> = snapshots.iter().map(|s| s.line_id.as_i32()).collect();

        if current.len() != snapshotted.len()
            || current.iter().any(|(id,)| !snapshotted.contains(id))
        {
            return Err(RepositoryError::Conflict(
                "cart lines changed during checkout".to_owned(),
            ));
        }

        for snapshot in snapshots {
            sqlx::query(
                r"
                UPDATE trade.order_line
                SET price = $2, name_snapshot = $3, image_snapshot = $4
                WHERE id = $1
                ",
            )
            .bind(snapshot.line_id.as_i32())
            .bind(snapshot.price)
            .bind(&snapshot.name)
            .bind(snapshot.image.as_deref())
            .execute(&mut *tx)
            .await?;
        }

        let address_id = match address {
            CheckoutAddress::Existing(id) => id,
            CheckoutAddress::New { fields, account_id } => {
                AddressRepository::create(&mut *tx, fields, account_id)
                    .await?
                    .id
            }
        };

        sqlx::query(
            r"
            UPDATE trade.orders
            SET status = 'PENDING', delivery_address_id = $2, notes = $3,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(order_id.as_i32())
        .bind(address_id.as_i32())
        .bind(notes)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Set a pending order back to a draft, discarding display snapshots.
    ///
    /// Clears `name_snapshot`/`image_snapshot` on every line but keeps
    /// price and quantity; the cart's live-adjustment path takes over on
    /// the next read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn revert_to_cart(&self, order_id: OrderId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            UPDATE trade.order_line
            SET name_snapshot = NULL, image_snapshot = NULL
            WHERE order_id = $1
            ",
        )
        .bind(order_id.as_i32())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
            UPDATE trade.orders
            SET status = 'CART', updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(order_id.as_i32())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Unconditionally write a new status.
    ///
    /// Returns the number of rows touched (0 when the order is absent).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE trade.orders
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(order_id.as_i32())
        .bind(status.as_str())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Overwrite a snapshotted line price (admin market-price resolution).
    ///
    /// Scoped to the given order; returns 0 rows when the line does not
    /// belong to it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_line_price(
        &self,
        order_id: OrderId,
        line_id: OrderLineId,
        price: Decimal,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE trade.order_line
            SET price = $3
            WHERE id = $2 AND order_id = $1
            ",
        )
        .bind(order_id.as_i32())
        .bind(line_id.as_i32())
        .bind(price)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
