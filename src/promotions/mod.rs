//! Promotions
//!
//! The promotion catalog and the rules hanging off each entry: lifecycle
//! status, activation schedule, basket qualification and exactly one discount
//! mechanism per promotion.

use chrono::NaiveDateTime;
use rusty_money::{Money, iso::Currency};
use slotmap::{SlotMap, new_key_type};

use crate::{
    basket::{Basket, BasketError},
    discounts::DiscountRule,
    promotions::{
        bogof::BogofDefinition,
        bundle::BundleDefinition,
        qualification::{BasketQualification, Eligibility, RejectionReason},
    },
    schedule::Schedule,
};

pub mod bogof;
pub mod bundle;
pub mod qualification;

new_key_type! {
    /// Promotion Key
    pub struct PromotionKey;
}

/// Promotion metadata
#[derive(Debug, Default)]
pub struct PromotionMeta {
    /// Promotion name
    pub name: String,
}

/// Lifecycle status of a promotion.
///
/// Only `Active` promotions participate in runtime matching; `Scheduled` ones
/// additionally participate in forward-looking checks such as schedule
/// conflict detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionStatus {
    /// Being drafted; invisible to the engine.
    Draft,

    /// Approved and waiting for its schedule to open.
    Scheduled,

    /// Live.
    Active,

    /// Temporarily switched off by an operator.
    Paused,

    /// Past its end; kept for records only.
    Expired,
}

/// The discount mechanism a promotion applies, exactly one per promotion.
#[derive(Debug, Clone)]
pub enum Mechanic<'a> {
    /// A subtotal discount (percentage, fixed amount or free item).
    DiscountCode(DiscountRule<'a>),

    /// The delivery fee is waived, optionally above a spend floor.
    FreeDelivery {
        /// Spend floor specific to the delivery waiver.
        min_spend: Option<Money<'a, Currency>>,
    },

    /// Buy-X-get-Y quantity discount.
    Bogof(BogofDefinition),

    /// Fixed-price bundle.
    Bundle(BundleDefinition<'a>),
}

/// A catalog promotion.
#[derive(Debug, Clone)]
pub struct Promotion<'a> {
    key: PromotionKey,
    status: PromotionStatus,
    priority: i32,
    stackable: bool,
    schedule: Option<Schedule>,
    qualification: BasketQualification<'a>,
    mechanic: Mechanic<'a>,
}

impl<'a> Promotion<'a> {
    /// Create a promotion with default priority, not stackable, no schedule
    /// and an open qualification.
    pub fn new(key: PromotionKey, status: PromotionStatus, mechanic: Mechanic<'a>) -> Self {
        Self {
            key,
            status,
            priority: 0,
            stackable: false,
            schedule: None,
            qualification: BasketQualification::open(),
            mechanic,
        }
    }

    /// Set the priority; higher wins among competing exclusive promotions.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set whether the promotion stacks with others.
    #[must_use]
    pub fn with_stackable(mut self, stackable: bool) -> Self {
        self.stackable = stackable;
        self
    }

    /// Attach an activation schedule.
    #[must_use]
    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = Some(schedule);
        self
    }

    /// Attach basket qualification rules.
    #[must_use]
    pub fn with_qualification(mut self, qualification: BasketQualification<'a>) -> Self {
        self.qualification = qualification;
        self
    }

    /// Return the promotion key.
    pub fn key(&self) -> PromotionKey {
        self.key
    }

    /// Lifecycle status.
    pub fn status(&self) -> PromotionStatus {
        self.status
    }

    /// Priority among exclusive promotions.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Whether the promotion stacks with others.
    pub fn is_stackable(&self) -> bool {
        self.stackable
    }

    /// The activation schedule, if any.
    pub fn schedule(&self) -> Option<&Schedule> {
        self.schedule.as_ref()
    }

    /// Basket qualification rules.
    pub fn qualification(&self) -> &BasketQualification<'a> {
        &self.qualification
    }

    /// The discount mechanism.
    pub fn mechanic(&self) -> &Mechanic<'a> {
        &self.mechanic
    }

    /// Whether the promotion is live at the given moment.
    ///
    /// Requires `Active` status; a missing schedule means always active.
    pub fn is_active_at(&self, at: NaiveDateTime) -> bool {
        if self.status != PromotionStatus::Active {
            return false;
        }

        self.schedule.is_none_or(|schedule| schedule.permits(at))
    }

    /// Like [`Promotion::is_active_at`], but also accepts `Scheduled`
    /// promotions. Used for forward-looking checks over the catalog.
    pub fn is_scheduled_at(&self, at: NaiveDateTime) -> bool {
        if !matches!(
            self.status,
            PromotionStatus::Active | PromotionStatus::Scheduled
        ) {
            return false;
        }

        self.schedule.is_none_or(|schedule| schedule.permits(at))
    }

    /// Check the basket against this promotion's qualification rules.
    ///
    /// An ineligible basket is an ordinary outcome carrying a display-ready
    /// reason, not an error.
    ///
    /// # Errors
    ///
    /// Returns a `BasketError` if the basket subtotal cannot be computed.
    pub fn check_basket(&self, basket: &Basket<'a>) -> Result<Eligibility<'a>, BasketError> {
        let subtotal = basket.subtotal()?;

        if let Some(min) = self.qualification.min_subtotal() {
            if subtotal.to_minor_units() < min.to_minor_units() {
                return Ok(Eligibility::Ineligible(RejectionReason::BelowMinimumSpend(
                    *min,
                )));
            }
        }

        if self.qualification.restricts_lines()
            && self.qualification.matching_lines(basket).next().is_none()
        {
            return Ok(Eligibility::Ineligible(RejectionReason::NoQualifyingItems));
        }

        if let Mechanic::FreeDelivery { min_spend } = &self.mechanic {
            if !basket.is_delivery() {
                return Ok(Eligibility::Ineligible(RejectionReason::NotADeliveryOrder));
            }

            if let Some(threshold) = min_spend {
                if subtotal.to_minor_units() < threshold.to_minor_units() {
                    return Ok(Eligibility::Ineligible(
                        RejectionReason::BelowDeliveryThreshold(*threshold),
                    ));
                }
            }
        }

        Ok(Eligibility::Eligible)
    }
}

/// An insertion-ordered promotion catalog.
///
/// Iteration order is the order promotions were inserted, which is also the
/// tie-break among exclusive promotions sharing a priority: the earliest
/// catalog entry wins.
#[derive(Debug, Default)]
pub struct Catalog<'a> {
    meta: SlotMap<PromotionKey, PromotionMeta>,
    promotions: Vec<Promotion<'a>>,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a promotion, minting its key.
    ///
    /// The builder receives the freshly minted key so the promotion can carry
    /// it.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        build: impl FnOnce(PromotionKey) -> Promotion<'a>,
    ) -> PromotionKey {
        let key = self.meta.insert(PromotionMeta { name: name.into() });

        self.promotions.push(build(key));

        key
    }

    /// Iterate over promotions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Promotion<'a>> {
        self.promotions.iter()
    }

    /// Get a promotion by key.
    pub fn get(&self, key: PromotionKey) -> Option<&Promotion<'a>> {
        self.promotions.iter().find(|p| p.key() == key)
    }

    /// Get promotion metadata by key.
    pub fn meta(&self, key: PromotionKey) -> Option<&PromotionMeta> {
        self.meta.get(key)
    }

    /// Display name for a promotion, empty when unknown.
    pub fn name(&self, key: PromotionKey) -> &str {
        self.meta.get(key).map_or("", |meta| meta.name.as_str())
    }

    /// Number of promotions in the catalog.
    pub fn len(&self) -> usize {
        self.promotions.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.promotions.is_empty()
    }
}
