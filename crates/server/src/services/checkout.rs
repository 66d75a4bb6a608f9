//! Checkout transition service: draft order -> placed order.
//!
//! Checkout is the one and only point where a price is frozen onto an
//! order line. Everything it writes happens in a single transaction so a
//! half-snapshotted order is never observable.

use std::collections::HashMap;

use sqlx::PgPool;

use tradecart_core::{
    AccountSnapshot, AddressId, CatalogItemId, OrderId, OrderStatus, pricing,
};

use super::EngineError;
use crate::db::orders::{CheckoutAddress, LineSnapshot};
use crate::db::{AddressRepository, CatalogRepository, OrderRepository, RepositoryError};
use crate::models::{CatalogItem, NewAddress, OrderWithLines};

/// How the caller names the delivery address.
#[derive(Debug)]
pub enum AddressChoice {
    /// An address id from the account's book.
    Existing(AddressId),
    /// Fresh fields, persisted to the book only when `save_address` is set.
    New(NewAddress),
}

/// Checkout and cancellation service.
pub struct CheckoutService<'a> {
    orders: OrderRepository<'a>,
    catalog: CatalogRepository<'a>,
    addresses: AddressRepository<'a>,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            catalog: CatalogRepository::new(pool),
            addresses: AddressRepository::new(pool),
        }
    }

    /// Convert the account's draft order into a placed (`PENDING`) order.
    ///
    /// Freezes name/image snapshots from current catalog data and sets
    /// each line's price to `adjust(base_price, multiplier)`; a
    /// market-priced item snapshots `price = NULL` for later admin entry.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Forbidden` if the account is not approved.
    /// Returns `EngineError::Conflict` if the cart is absent or empty, or
    /// if its lines changed between snapshotting and the transaction.
    /// Returns `EngineError::NotFound` if a supplied address id is not in
    /// the account's book, or a line's catalog item has vanished.
    /// Returns `EngineError::Validation` for missing address fields or an
    /// out-of-bounds multiplier.
    /// Returns `EngineError::Repository` for database failures.
    pub async fn checkout(
        &self,
        account: &AccountSnapshot,
        address: AddressChoice,
        save_address: bool,
        notes: Option<String>,
    ) -> Result<OrderWithLines, EngineError> {
        if !account.approved {
            return Err(EngineError::Forbidden(
                "account is not approved for ordering".to_owned(),
            ));
        }
        if !pricing::is_valid_multiplier(account.price_multiplier) {
            return Err(EngineError::Validation(format!(
                "account price multiplier {} is out of bounds",
                account.price_multiplier
            )));
        }

        let cart = self
            .orders
            .find_cart(account.id)
            .await?
            .ok_or_else(|| EngineError::Conflict("cart is empty".to_owned()))?;
        let lines = self.orders.lines(cart.id).await?;
        if lines.is_empty() {
            return Err(EngineError::Conflict("cart is empty".to_owned()));
        }

        let item_ids: Vec<CatalogItemId> = lines.iter().map(|l| l.catalog_item_id).collect();
        let items: HashMap<CatalogItemId, CatalogItem> = self
            .catalog
            .find_by_ids(&item_ids)
            .await?
            .into_iter()
            .map(|item| (item.id, item))
            .collect();

        let mut snapshots = Vec::with_capacity(lines.len());
        for line in &lines {
            let item = items.get(&line.catalog_item_id).ok_or_else(|| {
                EngineError::NotFound(format!(
                    "catalog item {} no longer exists",
                    line.catalog_item_id
                ))
            })?;
            snapshots.push(LineSnapshot {
                line_id: line.id,
                price: pricing::adjust(item.base_price, account.price_multiplier),
                name: item.name.clone(),
                image: item.image.clone(),
            });
        }

        let resolved = match &address {
            AddressChoice::Existing(id) => {
                self.addresses
                    .find_owned(*id, account.id)
                    .await?
                    .ok_or_else(|| {
                        EngineError::NotFound(format!("address {id} not found"))
                    })?;
                CheckoutAddress::Existing(*id)
            }
            AddressChoice::New(fields) => {
                let missing = fields.missing_fields();
                if !missing.is_empty() {
                    return Err(EngineError::Validation(format!(
                        "missing required address fields: {}",
                        missing.join(", ")
                    )));
                }
                CheckoutAddress::New {
                    fields,
                    account_id: save_address.then_some(account.id),
                }
            }
        };

        self.orders
            .checkout(cart.id, &snapshots, resolved, notes.as_deref())
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(msg) => EngineError::Conflict(msg),
                other => EngineError::Repository(other),
            })?;

        self.fetch(cart.id).await
    }

    /// Cancel a `PENDING` order, optionally resurrecting it as the cart.
    ///
    /// With `convert_to_cart` the name/image snapshots are cleared (price
    /// and quantity survive, but the cart path re-derives prices live);
    /// otherwise the order becomes `CANCELLED` with its lines untouched
    /// as a historical record.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` if the order does not exist or
    /// belongs to another account.
    /// Returns `EngineError::Conflict` unless the order is `PENDING`.
    /// Returns `EngineError::Repository` for database failures.
    pub async fn cancel(
        &self,
        account: &AccountSnapshot,
        order_id: OrderId,
        convert_to_cart: bool,
    ) -> Result<OrderWithLines, EngineError> {
        let order = self
            .orders
            .find_owned(order_id, account.id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("order {order_id} not found")))?;

        if !order.status.is_cancellable() {
            return Err(EngineError::Conflict(format!(
                "order {} cannot be cancelled from status {}",
                order.order_number, order.status
            )));
        }

        if convert_to_cart {
            self.orders.revert_to_cart(order.id).await?;
        } else {
            self.orders
                .update_status(order.id, OrderStatus::Cancelled)
                .await?;
        }

        self.fetch(order.id).await
    }

    async fn fetch(&self, order_id: OrderId) -> Result<OrderWithLines, EngineError> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("order {order_id} not found")))?;
        let lines = self.orders.lines(order_id).await?;
        Ok(OrderWithLines::assemble(order, lines))
    }
}
