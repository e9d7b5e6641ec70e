//! Basket Fixtures

use serde::Deserialize;

/// Basket fixture from YAML
#[derive(Debug, Deserialize)]
pub struct BasketFixture {
    /// Whether this is a delivery order
    #[serde(default)]
    pub delivery: bool,

    /// Quoted delivery fee (e.g., "2.50 GBP"); only read on delivery orders
    #[serde(default)]
    pub delivery_fee: Option<String>,

    /// Basket lines referencing menu item keys
    pub lines: Vec<BasketLineFixture>,
}

/// Single basket line from YAML
#[derive(Debug, Deserialize)]
pub struct BasketLineFixture {
    /// Menu item key
    pub item: String,

    /// Units ordered
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}
