//! Conflict Resolution
//!
//! Decides which applicable promotions actually apply to a basket: stackable
//! promotions all do, and exactly one exclusive promotion wins by priority.
//! Each applied promotion's discount is computed independently against the
//! original basket, not against a running subtotal.

use chrono::NaiveDateTime;
use decimal_percentage::Percentage;
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

use crate::{
    basket::Basket,
    discounts::{DiscountError, discount_for},
    promotions::{Catalog, Promotion, PromotionKey},
};

/// One promotion that made it into the applied set, with its contribution.
#[derive(Debug, Clone, Copy)]
pub struct AppliedPromotion<'a> {
    /// Key of the applied promotion
    pub key: PromotionKey,

    /// Discount this promotion contributes, computed against the original
    /// basket. May legitimately be zero.
    pub discount: Money<'a, Currency>,
}

/// Result of resolving a catalog against a basket at a moment in time.
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    /// Applied promotions in catalog order, winning exclusive last.
    pub applied: Vec<AppliedPromotion<'a>>,

    /// Sum of all applied discounts.
    pub total_discount: Money<'a, Currency>,
}

impl Resolution<'_> {
    /// The saved share of the given subtotal.
    ///
    /// Zero when the subtotal is zero. The ratio is taken in decimal space to
    /// avoid integer truncation.
    pub fn savings_percent(&self, subtotal: &Money<'_, Currency>) -> Percentage {
        let subtotal_minor = subtotal.to_minor_units();

        if subtotal_minor == 0 {
            return Percentage::from(0.0);
        }

        let savings = Decimal::from_i64(self.total_discount.to_minor_units()).unwrap_or(Decimal::ZERO);
        let subtotal = Decimal::from_i64(subtotal_minor).unwrap_or(Decimal::ZERO);

        Percentage::from(savings / subtotal)
    }
}

/// What a customer would see at a given moment, independent of any basket.
#[derive(Debug, Clone)]
pub struct Preview {
    /// Every promotion whose status and schedule permit activation.
    pub active: Vec<PromotionKey>,

    /// The exclusive promotion that would win on priority, if any is active.
    pub winning_exclusive: Option<PromotionKey>,
}

/// Resolve which promotions apply to the basket at the given moment and what
/// each is worth.
///
/// Applicable promotions are those that are both time-active and basket
/// eligible. All stackable ones apply; of the exclusive ones only the highest
/// priority applies, ties keeping the earliest catalog entry. Discounts are
/// computed independently against the original basket.
///
/// # Errors
///
/// Returns a `DiscountError` if percentage conversion or money arithmetic
/// fails.
pub fn resolve<'a>(
    catalog: &Catalog<'a>,
    basket: &Basket<'a>,
    at: NaiveDateTime,
) -> Result<Resolution<'a>, DiscountError> {
    let mut stackable: Vec<&Promotion<'a>> = Vec::new();
    let mut winning: Option<&Promotion<'a>> = None;

    for promotion in catalog.iter() {
        if !promotion.is_active_at(at) {
            continue;
        }

        if !promotion.check_basket(basket)?.is_eligible() {
            continue;
        }

        if promotion.is_stackable() {
            stackable.push(promotion);
        } else if winning.is_none_or(|current| promotion.priority() > current.priority()) {
            // Strictly greater, so the earliest entry keeps a shared priority.
            winning = Some(promotion);
        }
    }

    let mut applied = Vec::with_capacity(stackable.len() + usize::from(winning.is_some()));
    let mut total_discount = Money::from_minor(0, basket.currency());

    for promotion in stackable.into_iter().chain(winning) {
        let discount = discount_for(promotion, basket)?;

        total_discount = total_discount.add(discount)?;
        applied.push(AppliedPromotion {
            key: promotion.key(),
            discount,
        });
    }

    Ok(Resolution {
        applied,
        total_discount,
    })
}

/// Preview which promotions are active at a moment, with the exclusive winner.
///
/// Serves schedule-simulator screens: no basket is involved, so basket
/// qualification is not consulted.
pub fn preview(catalog: &Catalog<'_>, at: NaiveDateTime) -> Preview {
    let mut active = Vec::new();
    let mut winning: Option<&Promotion<'_>> = None;

    for promotion in catalog.iter() {
        if !promotion.is_active_at(at) {
            continue;
        }

        active.push(promotion.key());

        if !promotion.is_stackable()
            && winning.is_none_or(|current| promotion.priority() > current.priority())
        {
            winning = Some(promotion);
        }
    }

    Preview {
        active,
        winning_exclusive: winning.map(Promotion::key),
    }
}
