//! Discounts
//!
//! One pure calculator per discount mechanism. Every calculator maps a
//! promotion definition and a basket to an amount that is never negative and
//! never more than the basket can absorb, computed against the original
//! basket.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    basket::{Basket, BasketError},
    menu::ItemKey,
    promotions::{Mechanic, Promotion},
};

/// Errors specific to discount calculations.
#[derive(Debug, Error)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Errors bubbled up from basket totals.
    #[error(transparent)]
    Basket(#[from] BasketError),
}

/// Discount rule attached to a discount-code promotion.
#[derive(Debug, Clone, Copy)]
pub enum DiscountRule<'a> {
    /// Percentage off the basket subtotal, optionally capped.
    Percentage {
        /// Fraction of the subtotal discounted (e.g. 0.20 for 20%).
        percent: Percentage,

        /// Cap on the monetary discount.
        cap: Option<Money<'a, Currency>>,
    },

    /// Fixed amount off the basket subtotal.
    AmountOff(Money<'a, Currency>),

    /// One menu item free, valued at its unit price in the basket.
    FreeItem(ItemKey),
}

impl<'a> DiscountRule<'a> {
    /// Calculate the discount this rule contributes to the given basket.
    ///
    /// # Errors
    ///
    /// Returns a `DiscountError` if percentage conversion or money arithmetic
    /// fails.
    pub fn discount(&self, basket: &Basket<'a>) -> Result<Money<'a, Currency>, DiscountError> {
        let currency = basket.currency();
        let subtotal_minor = basket.subtotal()?.to_minor_units();

        let minor = match self {
            DiscountRule::Percentage { percent, cap } => {
                let mut amount = percent_of_minor(percent, subtotal_minor)?;

                if let Some(cap) = cap {
                    amount = amount.min(cap.to_minor_units());
                }

                amount.min(subtotal_minor)
            }
            DiscountRule::AmountOff(amount) => amount.to_minor_units().min(subtotal_minor),
            DiscountRule::FreeItem(item) => basket
                .lines()
                .find(|line| line.item() == *item)
                .map_or(0, |line| line.price().to_minor_units()),
        };

        Ok(Money::from_minor(minor.max(0), currency))
    }
}

/// Calculate the discount amount in minor units for a percentage of an amount.
///
/// # Errors
///
/// Returns an error if the calculation overflows or cannot be safely
/// represented (`DiscountError::PercentConversion`).
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage doesn't expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

/// Calculate the discount an applied promotion contributes to a basket.
///
/// Dispatches on the promotion's mechanism. The amount is always computed
/// against the original basket; stacked promotions each see the full subtotal.
///
/// # Errors
///
/// Returns a `DiscountError` if percentage conversion or money arithmetic
/// fails.
pub fn discount_for<'a>(
    promotion: &Promotion<'a>,
    basket: &Basket<'a>,
) -> Result<Money<'a, Currency>, DiscountError> {
    match promotion.mechanic() {
        Mechanic::DiscountCode(rule) => rule.discount(basket),
        Mechanic::FreeDelivery { .. } => Ok(basket
            .delivery_fee()
            .copied()
            .unwrap_or_else(|| Money::from_minor(0, basket.currency()))),
        Mechanic::Bogof(bogof) => bogof.discount(basket),
        Mechanic::Bundle(bundle) => bundle.discount(promotion.qualification(), basket),
    }
}
