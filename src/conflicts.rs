//! Schedule Conflict Detection
//!
//! An administrative sweep over the catalog reporting pairs of non-stackable
//! promotions whose recurring windows collide, so an operator can fix
//! priorities before they meet in production. Purely informational: runtime
//! behavior is already settled by the resolver's priority rule.

use std::fmt;

use crate::{
    promotions::{Catalog, Promotion, PromotionKey, PromotionStatus},
    schedule::{DaySet, TimeWindow},
};

/// A pair of promotions with overlapping recurring windows.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleConflict {
    /// The earlier catalog entry of the pair.
    pub first: PromotionKey,

    /// The later catalog entry of the pair.
    pub second: PromotionKey,

    /// Weekdays on which both are scheduled.
    pub days: DaySet,

    /// Time range during which both are scheduled.
    pub window: TimeWindow,
}

impl fmt::Display for ScheduleConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "overlap on {} from {}", self.days, self.window)
    }
}

/// Report every pair of promotions that could collide.
///
/// A pair is skipped when both promotions are stackable (they are designed to
/// coexist), when either lacks a schedule, or when either is not `Active` or
/// `Scheduled`. A missing day restriction counts as the full week and a
/// missing time window as the whole day. Calendar bounds are not consulted;
/// the check is about recurring weekly windows.
pub fn find_conflicts(catalog: &Catalog<'_>) -> Vec<ScheduleConflict> {
    let promotions: Vec<&Promotion<'_>> = catalog
        .iter()
        .filter(|promotion| {
            matches!(
                promotion.status(),
                PromotionStatus::Active | PromotionStatus::Scheduled
            )
        })
        .collect();

    let mut conflicts = Vec::new();

    for (i, first) in promotions.iter().enumerate() {
        for second in promotions.iter().skip(i + 1) {
            if first.is_stackable() && second.is_stackable() {
                continue;
            }

            let (Some(first_schedule), Some(second_schedule)) =
                (first.schedule(), second.schedule())
            else {
                continue;
            };

            let days = first_schedule.days().unwrap_or(DaySet::FULL_WEEK)
                & second_schedule.days().unwrap_or(DaySet::FULL_WEEK);

            if days.is_empty() {
                continue;
            }

            let first_window = first_schedule
                .window()
                .copied()
                .unwrap_or_else(TimeWindow::all_day);
            let second_window = second_schedule
                .window()
                .copied()
                .unwrap_or_else(TimeWindow::all_day);

            let Some(window) = first_window.overlap(second_window) else {
                continue;
            };

            conflicts.push(ScheduleConflict {
                first: first.key(),
                second: second.key(),
                days,
                window,
            });
        }
    }

    conflicts
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveTime, Weekday};
    use decimal_percentage::Percentage;
    use testresult::TestResult;

    use crate::{
        discounts::DiscountRule,
        promotions::Mechanic,
        schedule::{DateBounds, Schedule, ScheduleError},
    };

    use super::*;

    fn mechanic() -> Mechanic<'static> {
        Mechanic::DiscountCode(DiscountRule::Percentage {
            percent: Percentage::from(0.1),
            cap: None,
        })
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN)
    }

    fn schedule(days: &[Weekday], start: (u32, u32), end: (u32, u32)) -> Result<Schedule, ScheduleError> {
        Schedule::new(
            Some(DaySet::from_weekdays(days)),
            Some(TimeWindow::new(time(start.0, start.1), time(end.0, end.1))?),
            DateBounds::default(),
        )
    }

    fn weekday_lunch() -> Result<Schedule, ScheduleError> {
        schedule(
            &[
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
            (12, 0),
            (14, 0),
        )
    }

    fn late_week_tea() -> Result<Schedule, ScheduleError> {
        schedule(
            &[Weekday::Wed, Weekday::Thu, Weekday::Fri, Weekday::Sat],
            (13, 0),
            (15, 0),
        )
    }

    fn two_promotion_catalog(
        first_stackable: bool,
        second_stackable: bool,
    ) -> Result<Catalog<'static>, ScheduleError> {
        let mut catalog = Catalog::new();

        let lunch = weekday_lunch()?;
        let tea = late_week_tea()?;

        catalog.insert("Lunch", move |key| {
            Promotion::new(key, PromotionStatus::Active, mechanic())
                .with_schedule(lunch)
                .with_stackable(first_stackable)
        });
        catalog.insert("Tea", move |key| {
            Promotion::new(key, PromotionStatus::Active, mechanic())
                .with_schedule(tea)
                .with_stackable(second_stackable)
        });

        Ok(catalog)
    }

    #[test]
    fn overlapping_exclusive_pair_is_reported() -> TestResult {
        let catalog = two_promotion_catalog(false, false)?;

        let conflicts = find_conflicts(&catalog);

        assert_eq!(conflicts.len(), 1);

        let conflict = conflicts.first().copied();
        let days = conflict.map(|c| c.days.to_string());
        let window = conflict.map(|c| c.window.to_string());

        assert_eq!(days.as_deref(), Some("Wed, Thu, Fri"));
        assert_eq!(window.as_deref(), Some("13:00 to 14:00"));

        Ok(())
    }

    #[test]
    fn pair_with_one_stackable_is_still_reported() -> TestResult {
        let catalog = two_promotion_catalog(true, false)?;

        assert_eq!(find_conflicts(&catalog).len(), 1);

        Ok(())
    }

    #[test]
    fn pair_with_both_stackable_is_not_reported() -> TestResult {
        let catalog = two_promotion_catalog(true, true)?;

        assert!(find_conflicts(&catalog).is_empty());

        Ok(())
    }

    #[test]
    fn disjoint_days_do_not_conflict() -> TestResult {
        let mut catalog = Catalog::new();

        let weekend = schedule(&[Weekday::Sat, Weekday::Sun], (12, 0), (14, 0))?;
        let midweek = schedule(&[Weekday::Tue, Weekday::Wed], (12, 0), (14, 0))?;

        catalog.insert("Weekend", move |key| {
            Promotion::new(key, PromotionStatus::Active, mechanic()).with_schedule(weekend)
        });
        catalog.insert("Midweek", move |key| {
            Promotion::new(key, PromotionStatus::Active, mechanic()).with_schedule(midweek)
        });

        assert!(find_conflicts(&catalog).is_empty());

        Ok(())
    }

    #[test]
    fn touching_windows_do_not_conflict() -> TestResult {
        let mut catalog = Catalog::new();

        let lunch = schedule(&[Weekday::Fri], (12, 0), (14, 0))?;
        let tea = schedule(&[Weekday::Fri], (14, 0), (16, 0))?;

        catalog.insert("Lunch", move |key| {
            Promotion::new(key, PromotionStatus::Active, mechanic()).with_schedule(lunch)
        });
        catalog.insert("Tea", move |key| {
            Promotion::new(key, PromotionStatus::Active, mechanic()).with_schedule(tea)
        });

        assert!(find_conflicts(&catalog).is_empty());

        Ok(())
    }

    #[test]
    fn unscheduled_promotions_are_skipped() -> TestResult {
        let mut catalog = Catalog::new();

        let lunch = weekday_lunch()?;

        catalog.insert("Lunch", move |key| {
            Promotion::new(key, PromotionStatus::Active, mechanic()).with_schedule(lunch)
        });
        catalog.insert("Always on", |key| {
            Promotion::new(key, PromotionStatus::Active, mechanic())
        });

        assert!(find_conflicts(&catalog).is_empty());

        Ok(())
    }

    #[test]
    fn draft_and_expired_promotions_are_ignored() -> TestResult {
        let mut catalog = Catalog::new();

        let lunch = weekday_lunch()?;
        let tea = late_week_tea()?;

        catalog.insert("Draft", move |key| {
            Promotion::new(key, PromotionStatus::Draft, mechanic()).with_schedule(lunch)
        });
        catalog.insert("Expired", move |key| {
            Promotion::new(key, PromotionStatus::Expired, mechanic()).with_schedule(tea)
        });

        assert!(find_conflicts(&catalog).is_empty());

        Ok(())
    }

    #[test]
    fn scheduled_status_participates_in_forward_check() -> TestResult {
        let mut catalog = Catalog::new();

        let lunch = weekday_lunch()?;
        let tea = late_week_tea()?;

        catalog.insert("Live", move |key| {
            Promotion::new(key, PromotionStatus::Active, mechanic()).with_schedule(lunch)
        });
        catalog.insert("Upcoming", move |key| {
            Promotion::new(key, PromotionStatus::Scheduled, mechanic()).with_schedule(tea)
        });

        assert_eq!(find_conflicts(&catalog).len(), 1);

        Ok(())
    }

    #[test]
    fn missing_day_restriction_counts_as_full_week() -> TestResult {
        let mut catalog = Catalog::new();

        // All-day every-day window vs a narrow lunch slot.
        let all_week = Schedule::new(
            None,
            Some(TimeWindow::new(time(11, 0), time(15, 0))?),
            DateBounds::default(),
        )?;
        let lunch = weekday_lunch()?;

        catalog.insert("All week", move |key| {
            Promotion::new(key, PromotionStatus::Active, mechanic()).with_schedule(all_week)
        });
        catalog.insert("Lunch", move |key| {
            Promotion::new(key, PromotionStatus::Active, mechanic()).with_schedule(lunch)
        });

        let conflicts = find_conflicts(&catalog);

        assert_eq!(conflicts.len(), 1);
        assert_eq!(
            conflicts.first().map(|c| c.days.to_string()).as_deref(),
            Some("Mon, Tue, Wed, Thu, Fri")
        );
        assert_eq!(
            conflicts.first().map(|c| c.window.to_string()).as_deref(),
            Some("12:00 to 14:00")
        );

        Ok(())
    }

    #[test]
    fn conflict_display_names_days_and_range() -> TestResult {
        let catalog = two_promotion_catalog(false, false)?;

        let rendered = find_conflicts(&catalog)
            .first()
            .map(ToString::to_string);

        assert_eq!(
            rendered.as_deref(),
            Some("overlap on Wed, Thu, Fri from 13:00 to 14:00")
        );

        Ok(())
    }
}
