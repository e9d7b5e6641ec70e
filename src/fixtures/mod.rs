//! Fixtures
//!
//! Named YAML fixture sets for the CLI, integration tests and demos: a menu
//! (`fixtures/menus/<set>.yml`), a promotion catalog
//! (`fixtures/catalogs/<set>.yml`) and a basket
//! (`fixtures/baskets/<set>.yml`). String keys in the files are resolved to
//! slotmap keys while loading.

use std::{fs, path::PathBuf};

use decimal_percentage::Percentage;
use rustc_hash::{FxHashMap, FxHashSet};
use rusty_money::{Money, iso::Currency};
use slotmap::SlotMap;
use thiserror::Error;

use crate::{
    basket::{Basket, BasketError, BasketLine, Fulfilment},
    discounts::DiscountRule,
    fixtures::{
        basket::BasketFixture,
        catalog::{
            BogofScopeFixture, CatalogFixture, DiscountFixture, MechanicFixture, PromotionFixture,
        },
        menu::{MenuFixture, parse_price},
    },
    menu::{CategoryKey, ItemKey, MenuItem},
    promotions::{
        Catalog, Mechanic, Promotion, PromotionKey, PromotionStatus,
        bogof::{BogofDefinition, BogofScope},
        bundle::BundleDefinition,
        qualification::BasketQualification,
    },
    schedule::{Schedule, ScheduleError},
};

pub mod basket;
pub mod catalog;
pub mod menu;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Unknown weekday name
    #[error("Unknown weekday: {0}")]
    InvalidDay(String),

    /// Invalid "HH:MM" time
    #[error("Invalid time: {0}")]
    InvalidTime(String),

    /// Invalid "YYYY-MM-DD" date
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// A time window needs both of its bounds
    #[error("start_time and end_time must be given together")]
    IncompleteTimeWindow,

    /// Menu item not found
    #[error("Menu item not found: {0}")]
    ItemNotFound(String),

    /// Category not found
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Promotion not found
    #[error("Promotion not found: {0}")]
    PromotionNotFound(String),

    /// Currency mismatch between fixture values
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No menu loaded yet
    #[error("No menu loaded yet; currency unknown")]
    NoCurrency,

    /// No basket loaded
    #[error("No basket loaded; cannot create basket")]
    NoLines,

    /// Schedule construction error
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// Basket construction error
    #[error("Failed to create basket: {0}")]
    Basket(#[from] BasketError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Menu items with generated keys
    menu: SlotMap<ItemKey, MenuItem<'a>>,

    /// Category names with generated keys
    categories: SlotMap<CategoryKey, String>,

    /// String key -> generated key mappings for lookups
    item_keys: FxHashMap<String, ItemKey>,
    category_keys: FxHashMap<String, CategoryKey>,
    promotion_keys: FxHashMap<String, PromotionKey>,

    /// Loaded promotion catalog
    catalog: Catalog<'a>,

    /// Pre-built basket lines (reference menu items by key)
    lines: Vec<BasketLine<'a>>,

    /// How the loaded basket is fulfilled
    fulfilment: Fulfilment<'a>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl<'a> Fixture<'a> {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            menu: SlotMap::with_key(),
            categories: SlotMap::with_key(),
            item_keys: FxHashMap::default(),
            category_keys: FxHashMap::default(),
            promotion_keys: FxHashMap::default(),
            catalog: Catalog::new(),
            lines: Vec::new(),
            fulfilment: Fulfilment::Collection,
            currency: None,
        }
    }

    /// Load a complete fixture set (menu, catalog and basket with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture
            .load_menu(name)?
            .load_catalog(name)?
            .load_basket(name)?;

        Ok(fixture)
    }

    /// Load menu items from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if there are
    /// currency mismatches.
    pub fn load_menu(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("menus").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: MenuFixture = serde_norway::from_str(&contents)?;

        for (key, item_fixture) in fixture.items {
            let price = self.money(&item_fixture.price)?;
            let category = self.category(&item_fixture.category);

            let item_key = self.menu.insert(MenuItem {
                name: item_fixture.name,
                category,
                price,
            });

            self.item_keys.insert(key, item_key);
        }

        Ok(self)
    }

    /// Load a promotion catalog from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if promotion
    /// definitions reference unknown menu entries.
    pub fn load_catalog(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("catalogs").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CatalogFixture = serde_norway::from_str(&contents)?;

        for promotion_fixture in fixture.promotions {
            self.insert_promotion(promotion_fixture)?;
        }

        Ok(self)
    }

    /// Load a basket from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if lines
    /// reference unknown menu items.
    pub fn load_basket(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("baskets").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: BasketFixture = serde_norway::from_str(&contents)?;

        self.lines.clear();

        for line in &fixture.lines {
            let key = self.item_key(&line.item)?;
            let (category, price) = self
                .menu
                .get(key)
                .map(|item| (item.category, item.price))
                .ok_or_else(|| FixtureError::ItemNotFound(line.item.clone()))?;

            self.lines
                .push(BasketLine::new(key, category, price, line.quantity));
        }

        self.fulfilment = if fixture.delivery {
            let fee = match fixture.delivery_fee.as_deref() {
                Some(price) => self.money(price)?,
                None => Money::from_minor(0, self.currency.ok_or(FixtureError::NoCurrency)?),
            };

            Fulfilment::Delivery { fee }
        } else {
            Fulfilment::Collection
        };

        Ok(self)
    }

    fn insert_promotion(&mut self, fixture: PromotionFixture) -> Result<(), FixtureError> {
        let status = PromotionStatus::from(fixture.status);
        let schedule: Option<Schedule> = fixture.schedule.map(TryInto::try_into).transpose()?;

        let categories = fixture
            .categories
            .iter()
            .map(|category| self.category_key(category))
            .collect::<Result<FxHashSet<CategoryKey>, FixtureError>>()?;

        let items = fixture
            .items
            .iter()
            .map(|item| self.item_key(item))
            .collect::<Result<FxHashSet<ItemKey>, FixtureError>>()?;

        let min_basket = fixture
            .min_basket
            .as_deref()
            .map(|price| self.money(price))
            .transpose()?;

        let mechanic = self.mechanic(fixture.mechanic, &categories, &items)?;

        let mut qualification = BasketQualification::open()
            .with_categories(categories)
            .with_items(items);

        if let Some(min) = min_basket {
            qualification = qualification.with_min_subtotal(min);
        }

        let (priority, stackable) = (fixture.priority, fixture.stackable);

        let key = self.catalog.insert(fixture.name, move |key| {
            let mut promotion = Promotion::new(key, status, mechanic)
                .with_priority(priority)
                .with_stackable(stackable)
                .with_qualification(qualification);

            if let Some(schedule) = schedule {
                promotion = promotion.with_schedule(schedule);
            }

            promotion
        });

        self.promotion_keys.insert(fixture.key, key);

        Ok(())
    }

    fn mechanic(
        &mut self,
        fixture: MechanicFixture,
        categories: &FxHashSet<CategoryKey>,
        items: &FxHashSet<ItemKey>,
    ) -> Result<Mechanic<'a>, FixtureError> {
        match fixture {
            MechanicFixture::DiscountCode { discount } => {
                let rule = match discount {
                    DiscountFixture::Percentage {
                        value,
                        max_discount,
                    } => DiscountRule::Percentage {
                        percent: Percentage::from(value),
                        cap: max_discount
                            .as_deref()
                            .map(|price| self.money(price))
                            .transpose()?,
                    },
                    DiscountFixture::Fixed { value } => DiscountRule::AmountOff(self.money(&value)?),
                    DiscountFixture::FreeItem { item } => {
                        DiscountRule::FreeItem(self.item_key(&item)?)
                    }
                };

                Ok(Mechanic::DiscountCode(rule))
            }
            MechanicFixture::FreeDelivery { min_spend } => Ok(Mechanic::FreeDelivery {
                min_spend: min_spend
                    .as_deref()
                    .map(|price| self.money(price))
                    .transpose()?,
            }),
            MechanicFixture::Bogof {
                buy_quantity,
                get_quantity,
                applies_to,
                lowest_priced_free,
            } => {
                let scope = match applies_to {
                    BogofScopeFixture::Category => BogofScope::Categories(categories.clone()),
                    BogofScopeFixture::Selected => BogofScope::Items(items.clone()),
                    BogofScopeFixture::Same => BogofScope::SameItem,
                };

                Ok(Mechanic::Bogof(BogofDefinition::new(
                    buy_quantity,
                    get_quantity,
                    scope,
                    lowest_priced_free,
                )))
            }
            MechanicFixture::Bundle { fixed_price } => Ok(Mechanic::Bundle(BundleDefinition::new(
                self.money(&fixed_price)?,
            ))),
        }
    }

    /// Parse a money string, adopting or validating the set's currency.
    fn money(&mut self, s: &str) -> Result<Money<'a, Currency>, FixtureError> {
        let (minor_units, currency) = parse_price(s)?;

        if let Some(existing) = self.currency {
            if existing != currency {
                return Err(FixtureError::CurrencyMismatch(
                    existing.iso_alpha_code.to_string(),
                    currency.iso_alpha_code.to_string(),
                ));
            }
        } else {
            self.currency = Some(currency);
        }

        Ok(Money::from_minor(minor_units, currency))
    }

    /// Mint or reuse the key for a category name.
    fn category(&mut self, name: &str) -> CategoryKey {
        if let Some(key) = self.category_keys.get(name) {
            return *key;
        }

        let key = self.categories.insert(name.to_string());

        self.category_keys.insert(name.to_string(), key);

        key
    }

    /// Get a menu item key by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the item is not found.
    pub fn item_key(&self, key: &str) -> Result<ItemKey, FixtureError> {
        self.item_keys
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::ItemNotFound(key.to_string()))
    }

    /// Get a category key by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the category is not found.
    pub fn category_key(&self, key: &str) -> Result<CategoryKey, FixtureError> {
        self.category_keys
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::CategoryNotFound(key.to_string()))
    }

    /// Get a promotion key by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the promotion is not found.
    pub fn promotion_key(&self, key: &str) -> Result<PromotionKey, FixtureError> {
        self.promotion_keys
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::PromotionNotFound(key.to_string()))
    }

    /// Get a menu item by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the item is not found.
    pub fn menu_item(&self, key: &str) -> Result<&MenuItem<'a>, FixtureError> {
        self.menu
            .get(self.item_key(key)?)
            .ok_or_else(|| FixtureError::ItemNotFound(key.to_string()))
    }

    /// The loaded promotion catalog
    pub fn catalog(&self) -> &Catalog<'a> {
        &self.catalog
    }

    /// Create a basket from the loaded basket fixture
    ///
    /// # Errors
    ///
    /// Returns an error if no basket lines are loaded or basket creation
    /// fails.
    pub fn basket(&self) -> Result<Basket<'a>, FixtureError> {
        let currency = self.currency.ok_or(FixtureError::NoCurrency)?;

        if self.lines.is_empty() {
            return Err(FixtureError::NoLines);
        }

        Ok(Basket::with_lines(
            self.lines.clone(),
            currency,
            self.fulfilment,
        )?)
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if nothing has been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }
}

impl Default for Fixture<'_> {
    fn default() -> Self {
        Self::new()
    }
}
