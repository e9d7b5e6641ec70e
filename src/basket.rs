//! Basket

use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::menu::{CategoryKey, ItemKey};

/// Errors related to basket construction or totals.
#[derive(Debug, Error)]
pub enum BasketError {
    /// A line's currency differs from the basket currency (index, line currency, basket currency).
    #[error("Line {0} has currency {1}, but basket has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// The delivery fee's currency differs from the basket currency.
    #[error("Delivery fee has currency {0}, but basket has currency {1}")]
    FeeCurrencyMismatch(&'static str, &'static str),

    /// Wrapped money arithmetic error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// How the basket will reach the customer.
///
/// A delivery fee only exists on delivery orders, so it lives inside the
/// `Delivery` variant rather than as a free-standing optional field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fulfilment<'a> {
    /// Customer collects; no fee.
    Collection,

    /// Courier delivery with the quoted fee.
    Delivery {
        /// Quoted delivery fee
        fee: Money<'a, Currency>,
    },
}

/// A single basket line: one menu item at a unit price and quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasketLine<'a> {
    item: ItemKey,
    category: CategoryKey,
    price: Money<'a, Currency>,
    quantity: u32,
}

impl<'a> BasketLine<'a> {
    /// Create a new basket line.
    pub fn new(
        item: ItemKey,
        category: CategoryKey,
        price: Money<'a, Currency>,
        quantity: u32,
    ) -> Self {
        Self {
            item,
            category,
            price,
            quantity,
        }
    }

    /// Key of the menu item on this line.
    pub fn item(&self) -> ItemKey {
        self.item
    }

    /// Category of the menu item on this line.
    pub fn category(&self) -> CategoryKey {
        self.category
    }

    /// Unit price.
    pub fn price(&self) -> &Money<'a, Currency> {
        &self.price
    }

    /// Units on this line.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Extended price (unit price times quantity).
    pub fn line_total(&self) -> Money<'a, Currency> {
        Money::from_minor(
            self.price.to_minor_units() * i64::from(self.quantity),
            self.price.currency(),
        )
    }
}

/// Basket
///
/// A snapshot of a checkout attempt. The engine only ever reads it; discounts
/// come back as amounts for the caller to apply.
#[derive(Debug)]
pub struct Basket<'a> {
    lines: SmallVec<[BasketLine<'a>; 8]>,
    currency: &'static Currency,
    fulfilment: Fulfilment<'a>,
}

impl<'a> Basket<'a> {
    /// Create an empty collection basket.
    pub fn new(currency: &'static Currency) -> Self {
        Basket {
            lines: SmallVec::new(),
            currency,
            fulfilment: Fulfilment::Collection,
        }
    }

    /// Create a basket from lines, validating currency consistency.
    ///
    /// # Errors
    ///
    /// Returns a `BasketError` if any line or the delivery fee carries a
    /// different currency from the basket.
    pub fn with_lines(
        lines: impl Into<Vec<BasketLine<'a>>>,
        currency: &'static Currency,
        fulfilment: Fulfilment<'a>,
    ) -> Result<Self, BasketError> {
        let lines = SmallVec::from_vec(lines.into());

        lines.iter().enumerate().try_for_each(|(i, line): (usize, &BasketLine<'a>)| {
            let line_currency = line.price().currency();
            if line_currency == currency {
                Ok(())
            } else {
                Err(BasketError::CurrencyMismatch(
                    i,
                    line_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ))
            }
        })?;

        if let Fulfilment::Delivery { fee } = &fulfilment {
            if fee.currency() != currency {
                return Err(BasketError::FeeCurrencyMismatch(
                    fee.currency().iso_alpha_code,
                    currency.iso_alpha_code,
                ));
            }
        }

        Ok(Basket {
            lines,
            currency,
            fulfilment,
        })
    }

    /// Calculate the subtotal of the basket (delivery fee excluded).
    ///
    /// # Errors
    ///
    /// Returns a `BasketError` if money arithmetic fails.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, BasketError> {
        let total = self.lines.iter().try_fold(
            Money::from_minor(0, self.currency),
            |acc, line| acc.add(line.line_total()),
        )?;

        Ok(total)
    }

    /// Iterate over the basket lines.
    pub fn lines(&self) -> impl Iterator<Item = &BasketLine<'a>> {
        self.lines.iter()
    }

    /// Get the currency of the basket.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// How the basket will be fulfilled.
    pub fn fulfilment(&self) -> &Fulfilment<'a> {
        &self.fulfilment
    }

    /// Whether this is a delivery order.
    pub fn is_delivery(&self) -> bool {
        matches!(self.fulfilment, Fulfilment::Delivery { .. })
    }

    /// The delivery fee, if this is a delivery order.
    pub fn delivery_fee(&self) -> Option<&Money<'a, Currency>> {
        match &self.fulfilment {
            Fulfilment::Delivery { fee } => Some(fee),
            Fulfilment::Collection => None,
        }
    }

    /// Get the number of lines in the basket.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the basket is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
