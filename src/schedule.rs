//! Schedules
//!
//! Recurrence rules deciding when a promotion may activate: an optional weekday
//! set, an optional time-of-day window and optional calendar bounds. Absent
//! constraints impose no restriction; present constraints are ANDed together.

use std::fmt;
use std::ops::BitAnd;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use thiserror::Error;

/// Errors raised while constructing schedule components.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// A time window's end precedes its start. Windows crossing midnight are
    /// not supported; the operator splits them into two schedules.
    #[error("time window ends at {end} before it starts at {start}")]
    CrossesMidnight {
        /// Window start
        start: NaiveTime,
        /// Window end
        end: NaiveTime,
    },

    /// A day-of-week restriction was given without any days in it.
    #[error("day-of-week restriction contains no days")]
    EmptyDays,

    /// Calendar bounds where the end date precedes the start date.
    #[error("date bounds end on {until} before they start on {from}")]
    InvertedDates {
        /// First valid date
        from: NaiveDate,
        /// Last valid date
        until: NaiveDate,
    },
}

/// Weekday order used for bit positions and display, Monday first.
const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// A set of weekdays stored as a Monday-first bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySet(u8);

impl DaySet {
    /// Every day of the week.
    pub const FULL_WEEK: DaySet = DaySet(0b0111_1111);

    /// Build a set from the given weekdays.
    pub fn from_weekdays(days: &[Weekday]) -> Self {
        days.iter()
            .fold(DaySet(0), |set, day| DaySet(set.0 | Self::bit(*day)))
    }

    fn bit(day: Weekday) -> u8 {
        1 << day.num_days_from_monday()
    }

    /// Whether the set contains the given weekday.
    pub fn contains(self, day: Weekday) -> bool {
        self.0 & Self::bit(day) != 0
    }

    /// Whether the set contains no days.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate over the contained weekdays, Monday first.
    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        WEEK.into_iter().filter(move |day| self.contains(*day))
    }
}

impl BitAnd for DaySet {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        DaySet(self.0 & rhs.0)
    }
}

impl fmt::Display for DaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;

        for day in self.iter() {
            if !first {
                write!(f, ", ")?;
            }

            let label = match day {
                Weekday::Mon => "Mon",
                Weekday::Tue => "Tue",
                Weekday::Wed => "Wed",
                Weekday::Thu => "Thu",
                Weekday::Fri => "Fri",
                Weekday::Sat => "Sat",
                Weekday::Sun => "Sun",
            };

            write!(f, "{label}")?;
            first = false;
        }

        Ok(())
    }
}

/// A same-day time window with inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeWindow {
    /// Create a window from start and end times.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::CrossesMidnight`] when `end` precedes `start`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, ScheduleError> {
        if end < start {
            return Err(ScheduleError::CrossesMidnight { start, end });
        }

        Ok(Self { start, end })
    }

    /// The whole day, 00:00 to 23:59.
    pub fn all_day() -> Self {
        Self {
            start: NaiveTime::MIN,
            end: NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN),
        }
    }

    /// Window start.
    pub fn start(self) -> NaiveTime {
        self.start
    }

    /// Window end.
    pub fn end(self) -> NaiveTime {
        self.end
    }

    fn minutes(time: NaiveTime) -> u32 {
        time.hour() * 60 + time.minute()
    }

    /// Minutes since midnight of the window start.
    pub fn start_minutes(self) -> u32 {
        Self::minutes(self.start)
    }

    /// Minutes since midnight of the window end.
    pub fn end_minutes(self) -> u32 {
        Self::minutes(self.end)
    }

    /// Whether the window contains the given time, inclusive on both ends.
    pub fn contains(self, time: NaiveTime) -> bool {
        let now = Self::minutes(time);

        Self::minutes(self.start) <= now && now <= Self::minutes(self.end)
    }

    /// Intersection of two windows.
    ///
    /// Uses the strict interval test (`end_a > start_b && end_b > start_a`):
    /// windows that merely touch at a boundary do not overlap, even though the
    /// inclusive point check in [`TimeWindow::contains`] accepts the shared
    /// minute for both.
    pub fn overlap(self, other: Self) -> Option<Self> {
        let (self_start, self_end) = (self.start_minutes(), self.end_minutes());
        let (other_start, other_end) = (other.start_minutes(), other.end_minutes());

        if self_end > other_start && other_end > self_start {
            Some(Self {
                start: self.start.max(other.start),
                end: self.end.min(other.end),
            })
        } else {
            None
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

/// Inclusive calendar bounds at date-only granularity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateBounds {
    from: Option<NaiveDate>,
    until: Option<NaiveDate>,
}

impl DateBounds {
    /// Create bounds from optional start and end dates.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvertedDates`] when both bounds are present
    /// and the end precedes the start.
    pub fn new(from: Option<NaiveDate>, until: Option<NaiveDate>) -> Result<Self, ScheduleError> {
        if let (Some(from), Some(until)) = (from, until) {
            if until < from {
                return Err(ScheduleError::InvertedDates { from, until });
            }
        }

        Ok(Self { from, until })
    }

    /// First valid date, if bounded.
    pub fn from(&self) -> Option<NaiveDate> {
        self.from
    }

    /// Last valid date, if bounded.
    pub fn until(&self) -> Option<NaiveDate> {
        self.until
    }

    /// Whether the given date falls inside the bounds.
    pub fn contains(&self, date: NaiveDate) -> bool {
        if self.from.is_some_and(|from| date < from) {
            return false;
        }

        !self.until.is_some_and(|until| date > until)
    }
}

/// A promotion's recurrence schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    days: Option<DaySet>,
    window: Option<TimeWindow>,
    dates: DateBounds,
}

impl Schedule {
    /// Create a schedule.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::EmptyDays`] when a day restriction is given
    /// with no days in it.
    pub fn new(
        days: Option<DaySet>,
        window: Option<TimeWindow>,
        dates: DateBounds,
    ) -> Result<Self, ScheduleError> {
        if days.is_some_and(|days| days.is_empty()) {
            return Err(ScheduleError::EmptyDays);
        }

        Ok(Self {
            days,
            window,
            dates,
        })
    }

    /// Day restriction, if any.
    pub fn days(&self) -> Option<DaySet> {
        self.days
    }

    /// Time-of-day window, if any.
    pub fn window(&self) -> Option<&TimeWindow> {
        self.window.as_ref()
    }

    /// Calendar bounds.
    pub fn dates(&self) -> &DateBounds {
        &self.dates
    }

    /// Whether the schedule permits activation at the given moment.
    pub fn permits(&self, at: NaiveDateTime) -> bool {
        if self.days.is_some_and(|days| !days.contains(at.weekday())) {
            return false;
        }

        if self.window.is_some_and(|window| !window.contains(at.time())) {
            return false;
        }

        self.dates.contains(at.date())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN)
    }

    fn at(date: &str, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map(|d| d.and_time(time(h, m)))
            .unwrap_or_default()
    }

    #[test]
    fn day_set_contains_and_intersection() {
        let weekdays = DaySet::from_weekdays(&[Weekday::Mon, Weekday::Wed, Weekday::Fri]);
        let late_week = DaySet::from_weekdays(&[Weekday::Wed, Weekday::Thu, Weekday::Fri]);

        assert!(weekdays.contains(Weekday::Mon));
        assert!(!weekdays.contains(Weekday::Tue));

        let both = weekdays & late_week;

        assert!(both.contains(Weekday::Wed));
        assert!(both.contains(Weekday::Fri));
        assert!(!both.contains(Weekday::Mon));
        assert!(!both.contains(Weekday::Thu));
    }

    #[test]
    fn day_set_displays_monday_first() {
        let days = DaySet::from_weekdays(&[Weekday::Sun, Weekday::Tue, Weekday::Mon]);

        assert_eq!(days.to_string(), "Mon, Tue, Sun");
    }

    #[test]
    fn full_week_contains_every_day() {
        for day in [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ] {
            assert!(DaySet::FULL_WEEK.contains(day), "missing {day}");
        }
    }

    #[test]
    fn window_rejects_midnight_crossing() {
        let result = TimeWindow::new(time(22, 0), time(2, 0));

        assert!(matches!(result, Err(ScheduleError::CrossesMidnight { .. })));
    }

    #[test]
    fn window_contains_is_inclusive_on_both_ends() -> TestResult {
        let window = TimeWindow::new(time(12, 0), time(14, 0))?;

        assert!(window.contains(time(12, 0)));
        assert!(window.contains(time(14, 0)));
        assert!(window.contains(time(13, 30)));
        assert!(!window.contains(time(11, 59)));
        assert!(!window.contains(time(14, 1)));

        Ok(())
    }

    #[test]
    fn window_overlap_is_strict_at_boundaries() -> TestResult {
        let lunch = TimeWindow::new(time(12, 0), time(14, 0))?;
        let afternoon = TimeWindow::new(time(14, 0), time(17, 0))?;
        let tea = TimeWindow::new(time(13, 0), time(15, 0))?;

        // Touching end-to-start is not an overlap for intervals, even though
        // both windows accept the 14:00 point itself.
        assert_eq!(lunch.overlap(afternoon), None);

        let overlap = lunch.overlap(tea);

        assert_eq!(overlap, Some(TimeWindow::new(time(13, 0), time(14, 0))?));

        Ok(())
    }

    #[test]
    fn date_bounds_reject_inverted_range() {
        let from = NaiveDate::from_ymd_opt(2026, 6, 1);
        let until = NaiveDate::from_ymd_opt(2026, 5, 1);

        assert!(matches!(
            DateBounds::new(from, until),
            Err(ScheduleError::InvertedDates { .. })
        ));
    }

    #[test]
    fn date_bounds_are_inclusive() -> TestResult {
        let bounds = DateBounds::new(
            NaiveDate::from_ymd_opt(2026, 6, 1),
            NaiveDate::from_ymd_opt(2026, 6, 30),
        )?;

        assert!(bounds.contains(at("2026-06-01", 0, 0).date()));
        assert!(bounds.contains(at("2026-06-30", 0, 0).date()));
        assert!(!bounds.contains(at("2026-05-31", 0, 0).date()));
        assert!(!bounds.contains(at("2026-07-01", 0, 0).date()));

        Ok(())
    }

    #[test]
    fn schedule_rejects_empty_day_restriction() {
        let result = Schedule::new(
            Some(DaySet::from_weekdays(&[])),
            None,
            DateBounds::default(),
        );

        assert!(matches!(result, Err(ScheduleError::EmptyDays)));
    }

    #[test]
    fn schedule_ands_all_present_constraints() -> TestResult {
        let schedule = Schedule::new(
            Some(DaySet::from_weekdays(&[Weekday::Fri])),
            Some(TimeWindow::new(time(12, 0), time(14, 0))?),
            DateBounds::new(NaiveDate::from_ymd_opt(2026, 8, 1), None)?,
        )?;

        // 2026-08-07 is a Friday.
        assert!(schedule.permits(at("2026-08-07", 12, 30)));
        // Right day, wrong time.
        assert!(!schedule.permits(at("2026-08-07", 15, 0)));
        // Right time, wrong day (a Thursday).
        assert!(!schedule.permits(at("2026-08-06", 12, 30)));
        // Before the calendar bounds open (a Friday in July).
        assert!(!schedule.permits(at("2026-07-31", 12, 30)));

        Ok(())
    }

    #[test]
    fn unconstrained_schedule_permits_any_moment() -> TestResult {
        let schedule = Schedule::new(None, None, DateBounds::default())?;

        assert!(schedule.permits(at("2026-08-07", 3, 17)));
        assert!(schedule.permits(at("2031-01-01", 23, 59)));

        Ok(())
    }
}
