//! Basket Qualification Rules
//!
//! Cart-level qualification independent of timing: minimum spend and
//! category/item allow-lists. A rejected basket always carries a reason a
//! UI can show verbatim.

use rustc_hash::FxHashSet;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    basket::{Basket, BasketLine},
    menu::{CategoryKey, ItemKey},
};

/// Why a basket failed a promotion's qualification rules.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum RejectionReason<'a> {
    /// The basket subtotal is under the promotion's minimum.
    #[error("minimum basket of {0} required")]
    BelowMinimumSpend(Money<'a, Currency>),

    /// None of the basket lines match the promotion's allow-lists.
    #[error("no qualifying items in basket")]
    NoQualifyingItems,

    /// A delivery-only promotion was checked against a collection order.
    #[error("only available on delivery orders")]
    NotADeliveryOrder,

    /// The basket subtotal is under the free-delivery spend floor.
    #[error("spend of {0} required for free delivery")]
    BelowDeliveryThreshold(Money<'a, Currency>),
}

/// Outcome of a basket qualification check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Eligibility<'a> {
    /// The basket qualifies.
    Eligible,

    /// The basket does not qualify, with a display-ready reason.
    Ineligible(RejectionReason<'a>),
}

impl<'a> Eligibility<'a> {
    /// Whether the basket qualified.
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }

    /// The rejection reason, when the basket did not qualify.
    pub fn reason(&self) -> Option<&RejectionReason<'a>> {
        match self {
            Eligibility::Eligible => None,
            Eligibility::Ineligible(reason) => Some(reason),
        }
    }
}

/// A promotion's basket-level qualification rules.
///
/// The two allow-lists are independently sufficient: a basket qualifies when
/// any line matches either list. Empty lists impose no line restriction.
#[derive(Debug, Clone, Default)]
pub struct BasketQualification<'a> {
    min_subtotal: Option<Money<'a, Currency>>,
    categories: FxHashSet<CategoryKey>,
    items: FxHashSet<ItemKey>,
}

impl<'a> BasketQualification<'a> {
    /// A qualification with no restrictions.
    pub fn open() -> Self {
        Self::default()
    }

    /// Require a minimum basket subtotal.
    #[must_use]
    pub fn with_min_subtotal(mut self, min: Money<'a, Currency>) -> Self {
        self.min_subtotal = Some(min);
        self
    }

    /// Restrict to baskets containing at least one line from these categories.
    #[must_use]
    pub fn with_categories(mut self, categories: impl IntoIterator<Item = CategoryKey>) -> Self {
        self.categories = categories.into_iter().collect();
        self
    }

    /// Restrict to baskets containing at least one of these items.
    #[must_use]
    pub fn with_items(mut self, items: impl IntoIterator<Item = ItemKey>) -> Self {
        self.items = items.into_iter().collect();
        self
    }

    /// The minimum subtotal, if any.
    pub fn min_subtotal(&self) -> Option<&Money<'a, Currency>> {
        self.min_subtotal.as_ref()
    }

    /// Whether any allow-list is in force.
    pub fn restricts_lines(&self) -> bool {
        !self.categories.is_empty() || !self.items.is_empty()
    }

    /// Iterate over the basket lines matching the allow-lists.
    ///
    /// With no allow-lists in force, every line matches.
    pub fn matching_lines<'b>(
        &'b self,
        basket: &'b Basket<'a>,
    ) -> impl Iterator<Item = &'b BasketLine<'a>> {
        basket.lines().filter(move |line| {
            if !self.restricts_lines() {
                return true;
            }

            self.categories.contains(&line.category()) || self.items.contains(&line.item())
        })
    }
}
