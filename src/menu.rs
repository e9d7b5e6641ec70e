//! Menu

use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;

new_key_type! {
    /// Menu Item Key
    pub struct ItemKey;
}

new_key_type! {
    /// Menu Category Key
    pub struct CategoryKey;
}

/// A sellable menu item.
#[derive(Debug, Clone)]
pub struct MenuItem<'a> {
    /// Item name
    pub name: String,

    /// Category the item is filed under
    pub category: CategoryKey,

    /// Unit price
    pub price: Money<'a, Currency>,
}
