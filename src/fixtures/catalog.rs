//! Catalog Fixtures
//!
//! Promotion catalogs are YAML lists, not maps: insertion order is the
//! exclusive-priority tie-break, so operator ordering must survive loading.

use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    promotions::PromotionStatus,
    schedule::{DateBounds, DaySet, Schedule, TimeWindow},
};

/// Wrapper for promotions in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Promotions in operator order
    pub promotions: Vec<PromotionFixture>,
}

/// Promotion fixture from YAML
#[derive(Debug, Deserialize)]
pub struct PromotionFixture {
    /// Lookup key for tests and the CLI
    pub key: String,

    /// Display name
    pub name: String,

    /// Lifecycle status
    pub status: StatusFixture,

    /// Priority among exclusive promotions
    #[serde(default)]
    pub priority: i32,

    /// Whether the promotion stacks
    #[serde(default)]
    pub stackable: bool,

    /// Activation schedule
    #[serde(default)]
    pub schedule: Option<ScheduleFixture>,

    /// Minimum basket subtotal (e.g., "10.00 GBP")
    #[serde(default)]
    pub min_basket: Option<String>,

    /// Category allow-list (category keys)
    #[serde(default)]
    pub categories: Vec<String>,

    /// Item allow-list (item keys)
    #[serde(default)]
    pub items: Vec<String>,

    /// Discount mechanism
    #[serde(flatten)]
    pub mechanic: MechanicFixture,
}

/// Promotion status from YAML
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFixture {
    /// Being drafted
    Draft,

    /// Waiting for its schedule
    Scheduled,

    /// Live
    Active,

    /// Switched off
    Paused,

    /// Past its end
    Expired,
}

impl From<StatusFixture> for PromotionStatus {
    fn from(status: StatusFixture) -> Self {
        match status {
            StatusFixture::Draft => PromotionStatus::Draft,
            StatusFixture::Scheduled => PromotionStatus::Scheduled,
            StatusFixture::Active => PromotionStatus::Active,
            StatusFixture::Paused => PromotionStatus::Paused,
            StatusFixture::Expired => PromotionStatus::Expired,
        }
    }
}

/// Discount mechanism from YAML, tagged by `type`
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MechanicFixture {
    /// Subtotal discount
    DiscountCode {
        /// Discount configuration
        discount: DiscountFixture,
    },

    /// Delivery fee waiver
    FreeDelivery {
        /// Spend floor (e.g., "25.00 GBP")
        #[serde(default)]
        min_spend: Option<String>,
    },

    /// Buy-X-get-Y
    Bogof {
        /// Units paid for per group
        buy_quantity: u32,

        /// Units freed per group
        get_quantity: u32,

        /// Which lines count towards a group
        applies_to: BogofScopeFixture,

        /// Whether the cheapest eligible units are freed
        #[serde(default)]
        lowest_priced_free: bool,
    },

    /// Fixed-price bundle
    Bundle {
        /// All-inclusive price (e.g., "12.00 GBP")
        fixed_price: String,
    },
}

/// Discount configuration from YAML, tagged by `type`
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscountFixture {
    /// Percentage discount (value between 0.0 and 1.0)
    Percentage {
        /// Discount fraction (e.g., 0.20 for 20%)
        value: f64,

        /// Cap on the monetary discount (e.g., "5.00 GBP")
        #[serde(default)]
        max_discount: Option<String>,
    },

    /// Fixed amount off (e.g., "2.50 GBP")
    Fixed {
        /// Discount amount string
        value: String,
    },

    /// One item free
    FreeItem {
        /// Item key of the freed item
        item: String,
    },
}

/// Buy-X-get-Y scope from YAML.
///
/// `category` and `selected` draw on the promotion's own `categories` and
/// `items` allow-lists respectively.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BogofScopeFixture {
    /// Lines matching the promotion's category allow-list
    Category,

    /// Lines matching the promotion's item allow-list
    Selected,

    /// Lines counted per item
    Same,
}

/// Schedule fixture from YAML
#[derive(Debug, Default, Deserialize)]
pub struct ScheduleFixture {
    /// Weekday names ("mon" .. "sun"); absent means every day
    #[serde(default)]
    pub days: Option<Vec<String>>,

    /// "HH:MM" window start; requires `end_time`
    #[serde(default)]
    pub start_time: Option<String>,

    /// "HH:MM" window end; requires `start_time`
    #[serde(default)]
    pub end_time: Option<String>,

    /// "YYYY-MM-DD" first valid date
    #[serde(default)]
    pub start_date: Option<String>,

    /// "YYYY-MM-DD" last valid date
    #[serde(default)]
    pub end_date: Option<String>,
}

impl TryFrom<ScheduleFixture> for Schedule {
    type Error = FixtureError;

    fn try_from(fixture: ScheduleFixture) -> Result<Self, Self::Error> {
        let days = fixture
            .days
            .map(|days| {
                let weekdays = days
                    .iter()
                    .map(|day| {
                        day.parse::<Weekday>()
                            .map_err(|_err| FixtureError::InvalidDay(day.clone()))
                    })
                    .collect::<Result<Vec<Weekday>, FixtureError>>()?;

                Ok::<DaySet, FixtureError>(DaySet::from_weekdays(&weekdays))
            })
            .transpose()?;

        let window = match (fixture.start_time, fixture.end_time) {
            (Some(start), Some(end)) => Some(TimeWindow::new(
                parse_time(&start)?,
                parse_time(&end)?,
            )?),
            (None, None) => None,
            (Some(_), None) | (None, Some(_)) => {
                return Err(FixtureError::IncompleteTimeWindow);
            }
        };

        let dates = DateBounds::new(
            fixture.start_date.as_deref().map(parse_date).transpose()?,
            fixture.end_date.as_deref().map(parse_date).transpose()?,
        )?;

        Ok(Schedule::new(days, window, dates)?)
    }
}

fn parse_time(s: &str) -> Result<NaiveTime, FixtureError> {
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|_err| FixtureError::InvalidTime(s.to_string()))
}

fn parse_date(s: &str) -> Result<NaiveDate, FixtureError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_err| FixtureError::InvalidDate(s.to_string()))
}
