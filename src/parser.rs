//! Parsing of the published sheet exports.
//!
//! The sheets are exported as comma-separated text with a header row. The
//! dialect is deliberately loose: a double quote toggles "inside quotes" and
//! is never escaped by doubling, and every field is trimmed. Nothing in here
//! fails; malformed input degrades to defaults and short rows are dropped.
use crate::api::{Menu, MenuItem, PriceMap, Restaurant, TimeOfDay};
use regex::Regex;
use reqwest::Url;
use std::num::IntErrorKind;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Rows of the restaurant sheet with fewer fields are ignored
pub const RESTAURANT_MIN_FIELDS: usize = 15;

/// Rows of a menu sheet with fewer fields are ignored
pub const MENU_MIN_FIELDS: usize = 5;

/// Host of the file-sharing service whose links need rewriting
const DRIVE_HOST: &str = "drive.google.com";

static DRIVE_PATH_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/d/([a-zA-Z0-9_-]+)|/file/d/([a-zA-Z0-9_-]+)").expect("valid regex")
});
static DRIVE_QUERY_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]id=([a-zA-Z0-9_-]+)").expect("valid regex"));
static DRIVE_OPEN_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"open\?id=([a-zA-Z0-9_-]+)").expect("valid regex"));
static LEADING_FLOAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").expect("valid regex")
});
static LEADING_INT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+").expect("valid regex"));

/// Split one line into trimmed fields
pub fn split_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            c => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// Leading decimal number of a string, ignoring whatever follows it
fn leading_float(s: &str) -> Option<f64> {
    LEADING_FLOAT
        .find(s.trim_start())
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|f| f.is_finite())
}

/// Leading integer of a string, ignoring whatever follows it.
///
/// Numbers too large for an `i64` saturate so callers can clamp them.
fn leading_int(s: &str) -> Option<i64> {
    let digits = LEADING_INT.find(s.trim_start())?.as_str();
    match digits.parse::<i64>() {
        Ok(n) => Some(n),
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}

/// Parse a price, dropping a currency sign. Garbage is worth 0.
fn parse_price(s: &str) -> f64 {
    leading_float(&s.trim().replacen('$', "", 1)).unwrap_or(0.0)
}

/// Parse a `H:MM AM` style time.
///
/// Missing or unreadable parts count as 0 and the result is clamped, so this
/// never fails.
pub fn parse_time(s: &str) -> TimeOfDay {
    if s.is_empty() {
        return TimeOfDay::default();
    }

    let mut parts = s.split(' ');
    let time = parts.next().unwrap_or("");
    let meridiem = parts.next().unwrap_or("").to_lowercase();

    let mut clock = time.split(':');
    let mut hour = clock.next().and_then(leading_int).unwrap_or(0);
    let minute = clock.next().and_then(leading_int).unwrap_or(0);

    if meridiem == "pm" && hour < 12 {
        hour += 12;
    }
    if meridiem == "am" && hour == 12 {
        hour = 0;
    }

    TimeOfDay::clamped(hour, minute)
}

/// Parse a menu item price list such as `S:5,M:$7,L:9`.
///
/// A part without a colon is the single price of an item without sizes and
/// is stored under the empty size.
pub fn parse_item_prices(s: &str) -> PriceMap {
    let mut prices = PriceMap::new();

    for part in s.split(',').filter(|p| !p.trim().is_empty()) {
        match part.split_once(':') {
            Some((size, price)) => prices.insert(size.trim(), parse_price(price)),
            None => prices.insert("", parse_price(part)),
        }
    }
    prices
}

/// Parse the mix meal price list of a restaurant.
///
/// Stricter than item prices: pairs without both a size and a price are skipped.
pub fn parse_mix_prices(s: &str) -> PriceMap {
    let mut prices = PriceMap::new();

    for part in s.split(',') {
        let mut pair = part.split(':');
        let size = pair.next().unwrap_or("").trim();
        let price = pair.next().unwrap_or("").trim();
        if !size.is_empty() && !price.is_empty() {
            prices.insert(size, parse_price(price));
        }
    }
    prices
}

/// Comma separated list, blank entries dropped
pub fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect()
}

/// `max` or anything that isn't a positive number means no cap
pub fn parse_special_cap(s: &str) -> Option<u32> {
    if s.eq_ignore_ascii_case("max") {
        return None;
    }
    leading_int(s)
        .filter(|cap| *cap > 0)
        .and_then(|cap| u32::try_from(cap).ok())
}

/// Turn a picture link into something an image tag can load.
///
/// File-sharing links are rewritten to their direct view form, other links
/// must be valid absolute URLs and are kept as they are.
pub fn resolve_image_url(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }

    if !url.contains(DRIVE_HOST) {
        return match Url::parse(url) {
            Ok(_) => url.to_string(),
            Err(err) => {
                warn!(url, %err, "Invalid image URL");
                String::new()
            }
        };
    }

    let file_id = DRIVE_PATH_ID
        .captures(url)
        .and_then(|c| c.get(1).or_else(|| c.get(2)))
        .or_else(|| DRIVE_QUERY_ID.captures(url).and_then(|c| c.get(1)))
        .or_else(|| DRIVE_OPEN_ID.captures(url).and_then(|c| c.get(1)));

    match file_id {
        Some(id) => format!("https://{}/uc?export=view&id={}", DRIVE_HOST, id.as_str()),
        None => url.to_string(),
    }
}

/// Field `n` of a row, empty if the row is shorter
fn field(row: &[String], n: usize) -> &str {
    row.get(n).map(String::as_str).unwrap_or("")
}

/// Parse the restaurant sheet, keeping only active restaurants.
///
/// The id of a restaurant is derived from its line number, so it is stable
/// as long as the sheet rows are not reordered.
pub fn parse_restaurants(text: &str) -> Vec<Restaurant> {
    let mut restaurants = Vec::new();

    for (i, line) in text.split('\n').enumerate().skip(1) {
        let row = split_row(line);
        if row.len() < RESTAURANT_MIN_FIELDS {
            debug!(line = i, fields = row.len(), "Skipping short restaurant row");
            continue;
        }
        if !field(&row, 14).eq_ignore_ascii_case("active") {
            continue;
        }

        restaurants.push(Restaurant {
            id: format!("restaurant_{}", i),
            name: field(&row, 0).to_string(),
            address: field(&row, 1).to_string(),
            phone_number: field(&row, 2).to_string(),
            whats_app_number: field(&row, 3).to_string(),
            has_delivery: field(&row, 4).eq_ignore_ascii_case("yes"),
            delivery_price: leading_float(field(&row, 5)).unwrap_or(0.0),
            opening_hours: field(&row, 6).to_string(),
            breakfast_start: parse_time(field(&row, 7)),
            breakfast_end: parse_time(field(&row, 8)),
            lunch_start: parse_time(field(&row, 9)),
            lunch_end: parse_time(field(&row, 10)),
            profile_picture_url: resolve_image_url(field(&row, 11)),
            business_bio: field(&row, 12).to_string(),
            menu_sheet_url: field(&row, 13).to_string(),
            status: field(&row, 14).to_string(),
            mix_prices: parse_mix_prices(field(&row, 15)),
        });
    }
    restaurants
}

/// Parse a menu sheet into sections, in row order
pub fn parse_menu(text: &str) -> Menu {
    let mut menu = Menu::new();

    for (i, line) in text.split('\n').enumerate().skip(1) {
        let row = split_row(line);
        if row.len() < MENU_MIN_FIELDS {
            debug!(line = i, fields = row.len(), "Skipping short menu row");
            continue;
        }

        let section = match field(&row, 0) {
            "" => "Other",
            s => s,
        };
        let period = match field(&row, 3) {
            "" => "both",
            p => p,
        };

        menu.push(MenuItem {
            section: section.to_string(),
            category: section.to_string(),
            name: field(&row, 1).to_string(),
            prices: parse_item_prices(field(&row, 2)),
            period: period.to_string(),
            display_date: field(&row, 4).to_string(),
            specials: parse_list(field(&row, 5)),
            special_option: field(&row, 6).to_string(),
            special_cap: parse_special_cap(field(&row, 7)),
            description: field(&row, 8).to_string(),
            sides: parse_list(field(&row, 9)),
            veg: parse_list(field(&row, 10)),
            gravey: parse_list(field(&row, 11)),
        });
    }
    menu
}
