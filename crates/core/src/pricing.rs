//! Per-account price adjustment and order total arithmetic.
//!
//! Catalog prices are base prices; every account carries a multiplier that
//! scales them. A catalog item may have no base price at all ("market
//! priced"): its price stays unresolved through checkout and is entered by
//! an admin on the order line afterwards. All money math happens in
//! [`Decimal`] with half-up rounding to two places.

use rust_decimal::{Decimal, RoundingStrategy};

/// Lowest multiplier an account may carry.
pub const MULTIPLIER_MIN: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Highest multiplier an account may carry.
pub const MULTIPLIER_MAX: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

/// Money values are rounded to two decimal places.
const MONEY_SCALE: u32 = 2;

/// Apply an account multiplier to a base price.
///
/// A missing base price stays missing: market-priced items remain
/// unresolved until an admin sets the line price after checkout.
/// Otherwise the result is `base * multiplier` rounded half-up to two
/// decimal places. Pure and total; there is no failure mode.
#[must_use]
pub fn adjust(base: Option<Decimal>, multiplier: Decimal) -> Option<Decimal> {
    base.map(|b| round_money(b * multiplier))
}

/// Bounds check for account price multipliers: `0.5 <= m <= 20.0`.
///
/// Gates every multiplier write and is re-checked at checkout.
#[must_use]
pub fn is_valid_multiplier(multiplier: Decimal) -> bool {
    (MULTIPLIER_MIN..=MULTIPLIER_MAX).contains(&multiplier)
}

/// Total for one line: `price * quantity`, with an unresolved price
/// contributing zero.
#[must_use]
pub fn line_total(price: Option<Decimal>, quantity: i32) -> Decimal {
    price.unwrap_or_default() * Decimal::from(quantity)
}

/// Total over a set of lines, rounded to two decimal places.
///
/// Used both for the live cart view (adjusted prices) and for placed
/// orders (frozen snapshot prices, where `None` means a market-priced
/// line still awaiting its admin-entered price).
#[must_use]
pub fn order_total<I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = (Option<Decimal>, i32)>,
{
    round_money(
        lines
            .into_iter()
            .map(|(price, quantity)| line_total(price, quantity))
            .sum(),
    )
}

fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}
