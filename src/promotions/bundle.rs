//! Fixed-Price Bundle Promotions

use rusty_money::{Money, iso::Currency};

use crate::{
    basket::Basket, discounts::DiscountError, promotions::qualification::BasketQualification,
};

/// A fixed-price bundle: the qualifying lines together cost a set amount, and
/// the discount is whatever they would otherwise have cost above it.
#[derive(Debug, Clone, Copy)]
pub struct BundleDefinition<'a> {
    fixed_price: Money<'a, Currency>,
}

impl<'a> BundleDefinition<'a> {
    /// Create a definition with the all-inclusive bundle price.
    pub fn new(fixed_price: Money<'a, Currency>) -> Self {
        Self { fixed_price }
    }

    /// The all-inclusive bundle price.
    pub fn fixed_price(&self) -> &Money<'a, Currency> {
        &self.fixed_price
    }

    /// Discount for the given basket: the positive difference between the
    /// qualifying lines' summed price and the fixed price, never negative.
    ///
    /// # Errors
    ///
    /// Returns a `DiscountError` if money arithmetic fails.
    pub fn discount(
        &self,
        qualification: &BasketQualification<'a>,
        basket: &Basket<'a>,
    ) -> Result<Money<'a, Currency>, DiscountError> {
        let summed: i64 = qualification
            .matching_lines(basket)
            .map(|line| line.line_total().to_minor_units())
            .sum();

        let minor = (summed - self.fixed_price.to_minor_units()).max(0);

        Ok(Money::from_minor(minor, basket.currency()))
    }
}
