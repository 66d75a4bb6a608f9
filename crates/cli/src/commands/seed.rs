//! Seed the catalog with demo data.
//!
//! # Usage
//!
//! ```bash
//! tradecart seed
//! ```
//!
//! Inserts a small demo catalog, including one market-priced item
//! (NULL `base_price`) so the admin price-resolution flow can be
//! exercised end to end. Re-running skips items whose names already
//! exist.

use rust_decimal::Decimal;

use super::{CommandError, connect};

/// Name, image, and base price (None marks a market-priced item).
const DEMO_ITEMS: &[(&str, Option<&str>, Option<Decimal>)] = &[
    (
        "Alpine Water 12-pack",
        Some("https://cdn.tradecart.dev/img/alpine-water.jpg"),
        Some(Decimal::from_parts(899, 0, 0, false, 2)), // 8.99
    ),
    (
        "House Blend Coffee 1kg",
        Some("https://cdn.tradecart.dev/img/house-blend.jpg"),
        Some(Decimal::from_parts(2450, 0, 0, false, 2)), // 24.50
    ),
    (
        "Organic Olive Oil 500ml",
        None,
        Some(Decimal::from_parts(1275, 0, 0, false, 2)), // 12.75
    ),
    // Market-priced: admins set the final price per order after checkout.
    (
        "Fresh Catch of the Day",
        Some("https://cdn.tradecart.dev/img/fresh-catch.jpg"),
        None,
    ),
];

/// Seed the catalog with demo items.
///
/// # Errors
///
/// Returns `CommandError::Database` if an insert fails.
pub async fn catalog() -> Result<(), CommandError> {
    let pool = connect().await?;

    let mut inserted = 0_u32;
    for (name, image, base_price) in DEMO_ITEMS {
        let existing =
            sqlx::query_scalar::<_, i32>("SELECT id FROM trade.catalog_item WHERE name = $1")
                .bind(name)
                .fetch_optional(&pool)
                .await?;

        if existing.is_some() {
            tracing::info!("Skipping existing item: {name}");
            continue;
        }

        sqlx::query(
            r"
            INSERT INTO trade.catalog_item (name, image, base_price)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(name)
        .bind(*image)
        .bind(*base_price)
        .execute(&pool)
        .await?;

        inserted += 1;
        tracing::info!("Seeded item: {name}");
    }

    tracing::info!("Seed complete ({inserted} items inserted)");
    Ok(())
}
