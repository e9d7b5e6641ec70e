//! Brigade prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    basket::{Basket, BasketError, BasketLine, Fulfilment},
    conflicts::{ScheduleConflict, find_conflicts},
    discounts::{DiscountError, DiscountRule, discount_for},
    fixtures::{Fixture, FixtureError},
    menu::{CategoryKey, ItemKey, MenuItem},
    promotions::{
        Catalog, Mechanic, Promotion, PromotionKey, PromotionMeta, PromotionStatus,
        bogof::{BogofDefinition, BogofScope},
        bundle::BundleDefinition,
        qualification::{BasketQualification, Eligibility, RejectionReason},
    },
    resolver::{AppliedPromotion, Preview, Resolution, preview, resolve},
    schedule::{DateBounds, DaySet, Schedule, ScheduleError, TimeWindow},
};
