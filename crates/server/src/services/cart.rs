//! Cart manager: the account's single draft order.
//!
//! Finds-or-creates the draft, mutates lines, and renders the live cart
//! view with multiplier-adjusted prices. Stored line prices are ignored
//! while the order is a draft; adjustment happens on every read.

use std::collections::HashSet;

use serde::Deserialize;
use sqlx::PgPool;

use tradecart_core::{AccountSnapshot, CatalogItemId, OrderLineId, OrderStatus};

use super::EngineError;
use crate::db::{AccountRepository, CatalogRepository, OrderRepository, RepositoryError};
use crate::models::{CartView, Order};

/// Quantity shape accepted by batch add: omitted (1 each), a shared
/// scalar, or a per-item array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum QuantitySpec {
    Scalar(i32),
    PerItem(Vec<i32>),
}

/// Resolve the batch quantity shape against the requested item ids.
///
/// An array shorter than the id list falls back to its first element as
/// the shared scalar. Every resolved quantity must be >= 1.
///
/// # Errors
///
/// Returns `EngineError::Validation` for an empty id list, an empty
/// quantity array, or any quantity below 1.
pub fn resolve_batch_entries(
    ids: &[CatalogItemId],
    quantities: Option<&QuantitySpec>,
) -> Result<Vec<(CatalogItemId, i32)>, EngineError> {
    if ids.is_empty() {
        return Err(EngineError::Validation(
            "at least one catalog item id is required".to_owned(),
        ));
    }

    let quantity_for = |index: usize| -> Result<i32, EngineError> {
        match quantities {
            None => Ok(1),
            Some(QuantitySpec::Scalar(q)) => Ok(*q),
            Some(QuantitySpec::PerItem(qs)) => qs
                .get(index)
                .or_else(|| qs.first())
                .copied()
                .ok_or_else(|| {
                    EngineError::Validation("quantities array must not be empty".to_owned())
                }),
        }
    };

    let mut entries = Vec::with_capacity(ids.len());
    for (index, id) in ids.iter().enumerate() {
        let quantity = quantity_for(index)?;
        if quantity < 1 {
            return Err(EngineError::Validation(format!(
                "quantity must be at least 1, got {quantity}"
            )));
        }
        entries.push((*id, quantity));
    }
    Ok(entries)
}

/// Cart manager service.
pub struct CartService<'a> {
    orders: OrderRepository<'a>,
    catalog: CatalogRepository<'a>,
    accounts: AccountRepository<'a>,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            catalog: CatalogRepository::new(pool),
            accounts: AccountRepository::new(pool),
        }
    }

    /// The account's draft order, creating it on first use.
    ///
    /// Creation allocates the next order number and placeholder address.
    /// If the account row has vanished since token resolution, no cart is
    /// created and the operation fails with `NotFound`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` if the account no longer exists.
    /// Returns `EngineError::Repository` for database failures.
    pub async fn cart_order(&self, account: &AccountSnapshot) -> Result<Order, EngineError> {
        if let Some(order) = self.orders.find_cart(account.id).await? {
            return Ok(order);
        }

        if self.accounts.find_by_id(account.id).await?.is_none() {
            return Err(EngineError::NotFound("account no longer exists".to_owned()));
        }

        self.orders.create_cart(account.id).await.map_err(|e| match e {
            RepositoryError::NotFound => {
                EngineError::NotFound("account no longer exists".to_owned())
            }
            other => EngineError::Repository(other),
        })
    }

    /// The live cart view: lines joined to current catalog data, prices
    /// adjusted by the account's multiplier on read.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` if the account no longer exists.
    /// Returns `EngineError::Repository` for database failures.
    pub async fn get_or_create_cart(
        &self,
        account: &AccountSnapshot,
    ) -> Result<CartView, EngineError> {
        let order = self.cart_order(account).await?;
        self.view(account, &order).await
    }

    /// Add an item, overwriting the quantity of an existing line for the
    /// same catalog item ("set quantity", not "increment" - retry-safe).
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Validation` if `quantity < 1`.
    /// Returns `EngineError::NotFound` if the catalog item does not exist.
    /// Returns `EngineError::Conflict` if the cart was checked out
    /// concurrently.
    /// Returns `EngineError::Repository` for database failures.
    pub async fn add_item(
        &self,
        account: &AccountSnapshot,
        catalog_item_id: CatalogItemId,
        quantity: i32,
    ) -> Result<CartView, EngineError> {
        if quantity < 1 {
            return Err(EngineError::Validation(format!(
                "quantity must be at least 1, got {quantity}"
            )));
        }
        if self.catalog.find_by_id(catalog_item_id).await?.is_none() {
            return Err(EngineError::NotFound(format!(
                "catalog item {catalog_item_id} does not exist"
            )));
        }

        let order = self.cart_order(account).await?;
        let written = self
            .orders
            .upsert_line_overwrite(order.id, catalog_item_id, quantity)
            .await?;
        if written == 0 {
            return Err(EngineError::Conflict(
                "cart was checked out concurrently".to_owned(),
            ));
        }

        self.view(account, &order).await
    }

    /// Add several items in one all-or-nothing transaction, INCREMENTING
    /// quantities on existing lines (unlike the single add).
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Validation` for an empty batch or bad quantity.
    /// Returns `EngineError::NotFound` if any catalog id does not exist.
    /// Returns `EngineError::Conflict` if the cart was checked out
    /// concurrently.
    /// Returns `EngineError::Repository` for database failures.
    pub async fn batch_add_items(
        &self,
        account: &AccountSnapshot,
        ids: &[CatalogItemId],
        quantities: Option<&QuantitySpec>,
    ) -> Result<CartView, EngineError> {
        let entries = resolve_batch_entries(ids, quantities)?;

        let known: HashSet<CatalogItemId> = self
            .catalog
            .find_by_ids(ids)
            .await?
            .into_iter()
            .map(|item| item.id)
            .collect();
        if let Some(missing) = ids.iter().find(|id| !known.contains(id)) {
            return Err(EngineError::NotFound(format!(
                "catalog item {missing} does not exist"
            )));
        }

        let order = self.cart_order(account).await?;
        self.orders
            .batch_add_lines(order.id, &entries)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(msg) => EngineError::Conflict(msg),
                other => EngineError::Repository(other),
            })?;

        self.view(account, &order).await
    }

    /// Overwrite a line's quantity; `quantity <= 0` deletes the line.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` if the line does not exist.
    /// Returns `EngineError::Forbidden` if the line belongs to another account.
    /// Returns `EngineError::Conflict` if the line's order is already placed.
    /// Returns `EngineError::Repository` for database failures.
    pub async fn update_item_quantity(
        &self,
        account: &AccountSnapshot,
        line_id: OrderLineId,
        quantity: i32,
    ) -> Result<CartView, EngineError> {
        self.owned_line(account, line_id).await?;

        if quantity <= 0 {
            self.orders.delete_line(line_id).await?;
        } else {
            self.orders.set_line_quantity(line_id, quantity).await?;
        }

        self.get_or_create_cart(account).await
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` if the line does not exist.
    /// Returns `EngineError::Forbidden` if the line belongs to another account.
    /// Returns `EngineError::Conflict` if the line's order is already placed.
    /// Returns `EngineError::Repository` for database failures.
    pub async fn remove_item(
        &self,
        account: &AccountSnapshot,
        line_id: OrderLineId,
    ) -> Result<CartView, EngineError> {
        self.owned_line(account, line_id).await?;
        self.orders.delete_line(line_id).await?;
        self.get_or_create_cart(account).await
    }

    /// Delete every line of the account's cart (creating the cart first
    /// if absent, mirroring the find-or-create path).
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` if the account no longer exists.
    /// Returns `EngineError::Repository` for database failures.
    pub async fn clear_cart(&self, account: &AccountSnapshot) -> Result<CartView, EngineError> {
        let order = self.cart_order(account).await?;
        self.orders.clear_lines(order.id).await?;
        self.view(account, &order).await
    }

    async fn owned_line(
        &self,
        account: &AccountSnapshot,
        line_id: OrderLineId,
    ) -> Result<(), EngineError> {
        let context = self
            .orders
            .line_context(line_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("order line {line_id} not found")))?;

        if context.account_id != account.id.as_i32() {
            return Err(EngineError::Forbidden(
                "order line belongs to another account".to_owned(),
            ));
        }
        if context.status != OrderStatus::Cart.as_str() {
            return Err(EngineError::Conflict(
                "order line belongs to a placed order".to_owned(),
            ));
        }
        Ok(())
    }

    async fn view(
        &self,
        account: &AccountSnapshot,
        order: &Order,
    ) -> Result<CartView, EngineError> {
        let lines = self.orders.cart_lines(order.id).await?;
        Ok(CartView::assemble(
            order.id,
            order.order_number.clone(),
            lines,
            account.price_multiplier,
        ))
    }
}
