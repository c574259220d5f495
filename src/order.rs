//! Order composition.
//!
//! A line is built up in a [`LineDraft`] through [`draft::reduce`], committed
//! to the [`OrderComposer`] cart, priced against the restaurant and finally
//! rendered as a text summary for the hand-off.
use crate::api::{Menu, MenuItem, Restaurant};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod cart;
pub mod draft;

pub use cart::*;
pub use draft::*;

/// Sizes a mix meal can be ordered in
pub const MIX_SIZES: [&str; 2] = ["Med", "Lrg"];

/// Size a line is moved to when mix mode is switched on with another size
pub const DEFAULT_MIX_SIZE: &str = "Med";

/// Specials mode that only allows a single selection
pub const CHOOSE_ONE: &str = "choose one";

/// Why an order operation was refused. The message is meant for the customer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Please select an item and size")]
    MissingSelection,
    #[error("Please select a second main dish for mix meal")]
    MissingSecondMain,
    #[error("Mix meals are only available in Medium or Large size")]
    InvalidMixSize,
    #[error("You can only select {0} special(s)")]
    SpecialLimit(u32),
    #[error("Please add items to your order first")]
    EmptyOrder,
    #[error("Please enter your name")]
    MissingName,
    #[error("Please enter your delivery address")]
    MissingAddress,
    #[error("Please enter your pickup time")]
    MissingPickupTime,
    #[error("Please choose a category first")]
    NoCategory,
    #[error("Please choose an item first")]
    NoItem,
    #[error("Please choose a second main dish first")]
    NoSecondMain,
    #[error("Mix meals are only available for main dishes")]
    MixNotAvailable,
    #[error("Please turn on mix meal first")]
    MixNotEnabled,
    #[error("The second main dish must be a different main dish than {0}")]
    SameSecondMain(String),
    #[error("There is no category named {0}")]
    UnknownCategory(String),
    #[error("There is no item named {0}")]
    UnknownItem(String),
    #[error("Size {0} is not available for this item")]
    UnknownSize(String),
    #[error("{0} is not an option for this item")]
    UnknownOption(String),
}

impl Rejection {
    /// Short heading to show above the message
    pub fn title(&self) -> &'static str {
        match self {
            Rejection::MissingSelection => "Missing Selection",
            Rejection::MissingSecondMain => "Missing Second Main",
            Rejection::InvalidMixSize => "Invalid Size",
            Rejection::SpecialLimit(_) => "Special Limit Reached",
            Rejection::EmptyOrder => "Empty Order",
            Rejection::MissingName => "Missing Information",
            Rejection::MissingAddress => "Missing Address",
            Rejection::MissingPickupTime => "Missing Time",
            _ => "Invalid Selection",
        }
    }
}

/// A committed order line
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub item: MenuItem,
    pub size: String,
    pub specials: Vec<String>,
    pub side: Option<String>,
    pub veg: Option<String>,
    pub gravey: Option<String>,
    pub kind: LineKind,
}

/// Whether a line is a plain item or a mix meal of two mains
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LineKind {
    Simple,
    #[serde(rename_all = "camelCase")]
    Mix {
        second_main: MenuItem,
        second_main_specials: Vec<String>,
    },
}

impl OrderLine {
    pub fn is_mix(&self) -> bool {
        matches!(self.kind, LineKind::Mix { .. })
    }

    /// Price of the line.
    ///
    /// Mix meals use the restaurant's mix price for the size when there is
    /// one. Otherwise the item's price for the size, else its first price,
    /// else 0.
    pub fn price(&self, restaurant: &Restaurant) -> f64 {
        if self.is_mix() {
            if let Some(price) = restaurant.mix_prices.get(&self.size) {
                return price;
            }
        }
        self.item
            .prices
            .get(&self.size)
            .or_else(|| self.item.prices.first())
            .unwrap_or(0.0)
    }
}

/// Categories whose name contains "main" allow mix meals
pub fn is_main_category(category: &str) -> bool {
    category.to_lowercase().contains("main")
}

/// The menu as the order form sees it: items grouped by lowercased category,
/// in order of first appearance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderMenu {
    categories: Vec<(String, Vec<MenuItem>)>,
}

impl OrderMenu {
    pub fn new<'a, I>(items: I) -> OrderMenu
    where
        I: IntoIterator<Item = &'a MenuItem>,
    {
        let mut categories: Vec<(String, Vec<MenuItem>)> = Vec::new();
        for item in items {
            let key = item.category.to_lowercase();
            match categories.iter_mut().find(|(name, _)| *name == key) {
                Some((_, items)) => items.push(item.clone()),
                None => categories.push((key, vec![item.clone()])),
            }
        }
        OrderMenu { categories }
    }

    pub fn from_menu(menu: &Menu) -> OrderMenu {
        OrderMenu::new(menu.items())
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|(name, _)| name.as_str())
    }

    /// Canonical (lowercased) name of a category, if it exists
    pub fn category(&self, name: &str) -> Option<&str> {
        let key = name.to_lowercase();
        self.categories().find(|c| *c == key)
    }

    /// Items of a category, empty for an unknown one
    pub fn items_in(&self, category: &str) -> &[MenuItem] {
        let key = category.to_lowercase();
        self.categories
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, items)| items.as_slice())
            .unwrap_or(&[])
    }

    /// First item with this name, in any category
    pub fn find(&self, name: &str) -> Option<&MenuItem> {
        self.items().find(|item| item.name == name)
    }

    pub fn items(&self) -> impl Iterator<Item = &MenuItem> {
        self.categories.iter().flat_map(|(_, items)| items.iter())
    }

    /// Items that can take part in a mix meal
    pub fn main_items(&self) -> impl Iterator<Item = &MenuItem> {
        self.categories
            .iter()
            .filter(|(name, _)| is_main_category(name))
            .flat_map(|(_, items)| items.iter())
    }
}
