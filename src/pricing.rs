//! Pricing
//!
//! All amounts are decimals in the shop's currency, rounded to two places
//! after every arithmetic step so accumulated totals stay stable.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::entries::CartEntry;

/// Decimal places kept for every stored amount.
pub const MONEY_SCALE: u32 = 2;

/// Errors that can occur while presenting amounts as money.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// The amount does not fit the currency's minor units.
    #[error("amount {0} cannot be represented in minor units")]
    OutOfRange(Decimal),
}

/// Rounds an amount to [`MONEY_SCALE`] places, midpoints away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Price of `quantity` units at `unit_price` each.
///
/// Saturates at the bounds of [`Decimal`] instead of overflowing.
pub fn line_total(unit_price: Decimal, quantity: u32) -> Decimal {
    round_money(unit_price.saturating_mul(Decimal::from(quantity)))
}

/// Sum of two totals, rounded. Saturates like [`line_total`].
pub fn add_totals(left: Decimal, right: Decimal) -> Decimal {
    round_money(left.saturating_add(right))
}

/// Rescales a line total to a new quantity using the unit price baked into it.
///
/// A zero `old_quantity` carries no unit price, so the total is returned as is.
pub fn scale_total(old_total: Decimal, old_quantity: u32, new_quantity: u32) -> Decimal {
    let Some(unit_price) = old_total.checked_div(Decimal::from(old_quantity)) else {
        return old_total;
    };

    round_money(unit_price.saturating_mul(Decimal::from(new_quantity)))
}

/// Calculates the total price of a list of cart entries.
pub fn total_price(entries: &[CartEntry]) -> Decimal {
    round_money(
        entries
            .iter()
            .fold(Decimal::ZERO, |sum, entry| sum.saturating_add(entry.total_price)),
    )
}

/// Total price of a list of cart entries, or `None` if the sum overflows.
pub fn checked_total_price(entries: &[CartEntry]) -> Option<Decimal> {
    entries
        .iter()
        .try_fold(Decimal::ZERO, |sum, entry| sum.checked_add(entry.total_price))
        .map(round_money)
}

/// Converts an amount into [`Money`] in the given currency.
///
/// # Errors
///
/// - [`PricingError::OutOfRange`]: the amount overflows the currency's minor units.
pub fn to_money(
    amount: Decimal,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PricingError> {
    let factor = Decimal::from(10_u64.pow(currency.exponent));

    let minor_units = amount
        .checked_mul(factor)
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or(PricingError::OutOfRange(amount))?;

    Ok(Money::from_minor(minor_units, currency))
}
