//! Buy-X-Get-Y Promotions
//!
//! Quantity-threshold discounts: every completed group of `buy + get` eligible
//! units frees `get` of them. The scope decides which basket lines count.

use rustc_hash::{FxHashMap, FxHashSet};
use rusty_money::{Money, iso::Currency};

use crate::{
    basket::{Basket, BasketLine},
    discounts::DiscountError,
    menu::{CategoryKey, ItemKey},
};

/// Which basket lines count towards a buy-X-get-Y group.
#[derive(Debug, Clone)]
pub enum BogofScope {
    /// Lines filed under any of these categories.
    Categories(FxHashSet<CategoryKey>),

    /// Lines for any of these specific items.
    Items(FxHashSet<ItemKey>),

    /// Lines counted per item: only items ordered in at least a full group's
    /// quantity participate ("buy 2 get 1 of the same dish free", not
    /// cross-dish).
    SameItem,
}

/// A buy-X-get-Y promotion definition.
#[derive(Debug, Clone)]
pub struct BogofDefinition {
    buy_quantity: u32,
    get_quantity: u32,
    scope: BogofScope,
    lowest_priced_free: bool,
}

impl BogofDefinition {
    /// Create a definition.
    pub fn new(
        buy_quantity: u32,
        get_quantity: u32,
        scope: BogofScope,
        lowest_priced_free: bool,
    ) -> Self {
        Self {
            buy_quantity,
            get_quantity,
            scope,
            lowest_priced_free,
        }
    }

    /// Units the customer pays for per group.
    pub fn buy_quantity(&self) -> u32 {
        self.buy_quantity
    }

    /// Units freed per completed group.
    pub fn get_quantity(&self) -> u32 {
        self.get_quantity
    }

    /// Scope of eligible lines.
    pub fn scope(&self) -> &BogofScope {
        &self.scope
    }

    /// Whether the cheapest eligible units are freed.
    ///
    /// When false, the first eligible line's unit price is used for every
    /// freed unit, even when eligible lines carry mixed prices.
    pub fn lowest_priced_free(&self) -> bool {
        self.lowest_priced_free
    }

    fn eligible_lines<'a, 'b>(&'b self, basket: &'b Basket<'a>) -> Vec<&'b BasketLine<'a>> {
        match &self.scope {
            BogofScope::Categories(categories) => basket
                .lines()
                .filter(|line| categories.contains(&line.category()))
                .collect(),
            BogofScope::Items(items) => basket
                .lines()
                .filter(|line| items.contains(&line.item()))
                .collect(),
            BogofScope::SameItem => {
                let group = self.buy_quantity + self.get_quantity;

                let mut totals = FxHashMap::<ItemKey, u32>::default();
                for line in basket.lines() {
                    *totals.entry(line.item()).or_insert(0) += line.quantity();
                }

                basket
                    .lines()
                    .filter(|line| totals.get(&line.item()).is_some_and(|total| *total >= group))
                    .collect()
            }
        }
    }

    /// Monetary value of the freed units for the given basket.
    ///
    /// # Errors
    ///
    /// Returns a `DiscountError` if money arithmetic fails.
    pub fn discount<'a>(&self, basket: &Basket<'a>) -> Result<Money<'a, Currency>, DiscountError> {
        let zero = Money::from_minor(0, basket.currency());
        let group = self.buy_quantity + self.get_quantity;

        if group == 0 {
            return Ok(zero);
        }

        let mut lines = self.eligible_lines(basket);
        let total_quantity: u32 = lines.iter().map(|line| line.quantity()).sum();

        if total_quantity < group {
            return Ok(zero);
        }

        let free_count = (total_quantity / group) * self.get_quantity;

        if !self.lowest_priced_free {
            // Freed units are all valued at the first eligible line's price,
            // whatever the price spread across the other eligible lines.
            let reference = lines
                .first()
                .map_or(0, |line| line.price().to_minor_units());

            return Ok(Money::from_minor(
                reference * i64::from(free_count),
                basket.currency(),
            ));
        }

        lines.sort_by_key(|line| line.price().to_minor_units());

        let mut remaining = free_count;
        let mut freed_minor = 0_i64;

        for line in lines {
            if remaining == 0 {
                break;
            }

            let taken = remaining.min(line.quantity());

            freed_minor += line.price().to_minor_units() * i64::from(taken);
            remaining -= taken;
        }

        Ok(Money::from_minor(freed_minor, basket.currency()))
    }
}
