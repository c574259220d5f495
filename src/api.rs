// Records produced by the catalog loader and consumed by the order composer
use serde::{Deserialize, Serialize};

/// A wall-clock time, always within 00:00..=23:59
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
}

impl TimeOfDay {
    /// Build a time, clamping out-of-range components instead of failing
    pub fn clamped(hour: i64, minute: i64) -> TimeOfDay {
        TimeOfDay {
            hour: hour.clamp(0, 23) as u32,
            minute: minute.clamp(0, 59) as u32,
        }
    }

    /// Minutes elapsed since midnight
    pub fn minutes(&self) -> u32 {
        self.hour * 60 + self.minute
    }

    /// True for the `{0,0}` value, which the sheet uses to mean "not set"
    pub fn is_unset(&self) -> bool {
        self.hour == 0 && self.minute == 0
    }
}

/// Size label to price, in source order.
///
/// The empty label means the item has a single price and no size tiers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct PriceMap(Vec<(String, f64)>);

impl PriceMap {
    pub fn new() -> PriceMap {
        PriceMap(Vec::new())
    }

    /// Set the price for a size. A repeated size keeps its original position.
    pub fn insert(&mut self, size: &str, price: f64) {
        match self.0.iter_mut().find(|(s, _)| s == size) {
            Some(entry) => entry.1 = price,
            None => self.0.push((size.to_string(), price)),
        }
    }

    pub fn get(&self, size: &str) -> Option<f64> {
        self.0.iter().find(|(s, _)| s == size).map(|(_, p)| *p)
    }

    pub fn contains(&self, size: &str) -> bool {
        self.get(size).is_some()
    }

    /// The first price listed, used when the requested size is missing
    pub fn first(&self) -> Option<f64> {
        self.0.first().map(|(_, p)| *p)
    }

    pub fn sizes(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(s, _)| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(s, p)| (s.as_str(), *p))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, f64)> for PriceMap {
    fn from_iter<I: IntoIterator<Item = (&'a str, f64)>>(iter: I) -> Self {
        let mut map = PriceMap::new();
        for (size, price) in iter {
            map.insert(size, price);
        }
        map
    }
}

/// Display label for a size key
pub fn size_label(size: &str) -> &str {
    if size.is_empty() {
        "Regular"
    } else {
        size
    }
}

/// A partner restaurant, as listed in the catalog sheet
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    /// Synthesized from the row position: `restaurant_<n>`
    pub id: String,
    pub name: String,
    pub address: String,
    pub phone_number: String,
    pub whats_app_number: String,
    pub has_delivery: bool,
    pub delivery_price: f64,
    /// Free text shown as-is
    pub opening_hours: String,
    pub breakfast_start: TimeOfDay,
    pub breakfast_end: TimeOfDay,
    pub lunch_start: TimeOfDay,
    pub lunch_end: TimeOfDay,
    pub profile_picture_url: String,
    pub business_bio: String,
    /// Where this restaurant's menu sheet is published
    pub menu_sheet_url: String,
    pub status: String,
    /// Prices for mix meals, by size
    pub mix_prices: PriceMap,
}

/// One row of a restaurant's menu sheet
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub section: String,
    /// Same value as `section`, the order form groups on this one
    pub category: String,
    pub name: String,
    pub prices: PriceMap,
    /// `breakfast`, `lunch` or `both`, any case
    pub period: String,
    pub display_date: String,
    pub specials: Vec<String>,
    /// `choose one` makes the specials single-choice
    pub special_option: String,
    /// Maximum number of specials, `None` for no limit
    pub special_cap: Option<u32>,
    pub description: String,
    pub sides: Vec<String>,
    pub veg: Vec<String>,
    pub gravey: Vec<String>,
}

/// A named group of menu items
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Section {
    pub name: String,
    pub items: Vec<MenuItem>,
}

/// A menu, sections in order of first appearance and items in row order
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct Menu {
    sections: Vec<Section>,
}

impl Menu {
    pub fn new() -> Menu {
        Menu::default()
    }

    /// Append an item to its section, creating the section if needed
    pub fn push(&mut self, item: MenuItem) {
        match self.sections.iter_mut().find(|s| s.name == item.section) {
            Some(section) => section.items.push(item),
            None => self.sections.push(Section {
                name: item.section.clone(),
                items: vec![item],
            }),
        }
    }

    /// Add a whole section. Empty sections are not kept.
    pub fn push_section(&mut self, section: Section) {
        if !section.items.is_empty() {
            self.sections.push(section);
        }
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// All items, section by section
    pub fn items(&self) -> impl Iterator<Item = &MenuItem> {
        self.sections.iter().flat_map(|s| s.items.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
