//! Restaurant and menu loading.
//!
//! Both sheets go through the same cache contract: a copy younger than the
//! freshness window is returned without touching the network, a successful
//! fetch replaces the copy, and a failed fetch falls back to whatever copy
//! exists, however old. Last write wins; concurrent loaders are not
//! coordinated.
use crate::api::{Menu, Restaurant};
use crate::errors::{Error, Result};
use crate::http::Fetcher;
use crate::parser::{parse_menu, parse_restaurants};
use crate::storage::Storage;
use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{info, warn};

/// How long a cached sheet is trusted
pub const DEFAULT_FRESHNESS_MINUTES: i64 = 30;

/// Storage keys for cached sheets
pub mod keys {
    pub const RESTAURANTS: &str = "restaurants";
    pub const RESTAURANTS_TIME: &str = "restaurants_cache_time";

    /// Key of the cached menu for a menu sheet
    pub fn menu(source: &str) -> String {
        format!("menu_{}", source)
    }

    /// Key of the timestamp of the cached menu for a menu sheet
    pub fn menu_time(source: &str) -> String {
        format!("menu_{}_time", source)
    }
}

type Clock = Box<dyn Fn() -> DateTime<Utc>>;

/// Loads the restaurant list and the menus, caching them in `S`
pub struct Catalog<F, S> {
    fetcher: F,
    storage: S,
    restaurants_url: String,
    freshness: Duration,
    clock: Clock,
}

impl<F: Fetcher, S: Storage> Catalog<F, S> {
    /// Create a catalog reading the restaurant list from `restaurants_url`
    pub fn new(fetcher: F, storage: S, restaurants_url: &str, freshness: Duration) -> Self {
        Catalog {
            fetcher,
            storage,
            restaurants_url: restaurants_url.to_string(),
            freshness,
            clock: Box::new(Utc::now),
        }
    }

    /// Replace the wall clock, mostly for tests
    pub fn with_clock<C>(mut self, clock: C) -> Self
    where
        C: Fn() -> DateTime<Utc> + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Active restaurants, from cache when fresh
    pub fn fetch_restaurants(&mut self) -> Result<Vec<Restaurant>> {
        let url = self.restaurants_url.clone();
        self.load(&url, keys::RESTAURANTS, keys::RESTAURANTS_TIME, parse_restaurants)
    }

    /// The menu published at `source`, from cache when fresh
    pub fn fetch_menu_items(&mut self, source: &str) -> Result<Menu> {
        self.load(source, &keys::menu(source), &keys::menu_time(source), parse_menu)
    }

    /// Drop the cached restaurant list and fetch it again
    pub fn refresh_restaurants(&mut self) -> Result<Vec<Restaurant>> {
        self.storage.remove(keys::RESTAURANTS)?;
        self.storage.remove(keys::RESTAURANTS_TIME)?;
        self.fetch_restaurants()
    }

    /// Drop the cached menu of `source` and fetch it again
    pub fn refresh_menu(&mut self, source: &str) -> Result<Menu> {
        self.storage.remove(&keys::menu(source))?;
        self.storage.remove(&keys::menu_time(source))?;
        self.fetch_menu_items(source)
    }

    /// Look a restaurant up by id
    pub fn restaurant(&mut self, id: &str) -> Result<Restaurant> {
        self.fetch_restaurants()?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::NotFound(format!("No restaurant with id {}", id)))
    }

    fn load<T, P>(&mut self, url: &str, key: &str, time_key: &str, parse: P) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        P: FnOnce(&str) -> T,
    {
        let now = (self.clock)();
        let cached: Option<T> = self.read_cached(key)?;
        let cached_at = self
            .storage
            .get(time_key)?
            .and_then(|stamp| stamp.parse::<i64>().ok())
            .and_then(DateTime::<Utc>::from_timestamp_millis);

        let cached = match (cached, cached_at) {
            (Some(value), Some(at)) if now - at < self.freshness => {
                info!(key, "Using cached copy");
                return Ok(value);
            }
            (cached, _) => cached,
        };

        match self.fetcher.fetch_text(url) {
            Ok(text) => {
                let value = parse(&text);
                info!(key, url, "Fetched fresh copy");
                if let Err(err) = self.write_cached(key, time_key, &value, now) {
                    warn!(key, %err, "Failed to cache fetched copy");
                }
                Ok(value)
            }
            Err(err) => match cached {
                Some(value) => {
                    warn!(key, url, %err, "Fetch failed, falling back to cached copy");
                    Ok(value)
                }
                None => Err(err),
            },
        }
    }

    fn read_cached<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.storage.get(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!(key, %err, "Ignoring unreadable cached copy");
                Ok(None)
            }
        }
    }

    fn write_cached<T: Serialize>(
        &mut self,
        key: &str,
        time_key: &str,
        value: &T,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.storage.set(key, &serde_json::to_string(value)?)?;
        self.storage
            .set(time_key, &now.timestamp_millis().to_string())?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::http::mock::MockFetcher;
    use crate::storage::mock::MemoryStorage;
    use chrono::TimeZone;
    use std::cell::Cell;
    use std::rc::Rc;

    const SHEET_URL: &str = "https://sheets.example/restaurants.csv";
    const MENU_URL: &str = "https://sheets.example/menu.csv";

    const SHEET: &str = "\
header
Auntie's Kitchen,1 Road,555,555,yes,5,,7:00 AM,10:00 AM,11:00 AM,3:00 PM,,,https://sheets.example/menu.csv,active,Med:12
Gone,1 Road,555,555,yes,5,,,,,,,,x,closed
";
    const SHEET_V2: &str = "\
header
Corner Cafe,2 Road,555,555,no,0,,,,,,,,y,active
";
    const MENU: &str = "\
header
Main,Stew,\"Med:10\",lunch,
Drinks,Juice,2,both,
";

    struct Harness {
        fetcher: MockFetcher,
        storage: MemoryStorage,
        now: Rc<Cell<DateTime<Utc>>>,
    }

    impl Harness {
        fn new() -> Self {
            Harness {
                fetcher: MockFetcher::new(),
                storage: MemoryStorage::new(),
                now: Rc::new(Cell::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())),
            }
        }

        fn catalog(&mut self) -> Catalog<&MockFetcher, &mut MemoryStorage> {
            let now = Rc::clone(&self.now);
            Catalog::new(
                &self.fetcher,
                &mut self.storage,
                SHEET_URL,
                Duration::minutes(DEFAULT_FRESHNESS_MINUTES),
            )
            .with_clock(move || now.get())
        }

        fn advance(&self, minutes: i64) {
            self.now.set(self.now.get() + Duration::minutes(minutes));
        }
    }

    #[test]
    fn test_fetch_restaurants_keeps_active_only() {
        let mut h = Harness::new();
        h.fetcher.serve(SHEET_URL, SHEET);

        let restaurants = h.catalog().fetch_restaurants().unwrap();
        assert_eq!(restaurants.len(), 1);
        assert_eq!(restaurants[0].name, "Auntie's Kitchen");
        assert_eq!(restaurants[0].id, "restaurant_1");
        assert!(h.storage.get(keys::RESTAURANTS_TIME).unwrap().is_some());
    }

    #[test]
    fn test_cache_reused_within_window() {
        let mut h = Harness::new();
        h.fetcher.serve(SHEET_URL, SHEET);
        h.catalog().fetch_restaurants().unwrap();

        h.fetcher.serve(SHEET_URL, SHEET_V2);
        h.advance(29);
        let restaurants = h.catalog().fetch_restaurants().unwrap();

        assert_eq!(h.fetcher.calls(SHEET_URL), 1);
        assert_eq!(restaurants[0].name, "Auntie's Kitchen");
    }

    #[test]
    fn test_cache_refetched_after_window() {
        let mut h = Harness::new();
        h.fetcher.serve(SHEET_URL, SHEET);
        h.catalog().fetch_restaurants().unwrap();

        h.fetcher.serve(SHEET_URL, SHEET_V2);
        h.advance(31);
        let restaurants = h.catalog().fetch_restaurants().unwrap();

        assert_eq!(h.fetcher.calls(SHEET_URL), 2);
        assert_eq!(restaurants[0].name, "Corner Cafe");
    }

    #[test]
    fn test_stale_cache_used_when_fetch_fails() {
        let mut h = Harness::new();
        h.fetcher.serve(SHEET_URL, SHEET);
        h.catalog().fetch_restaurants().unwrap();

        h.fetcher.fail(SHEET_URL);
        h.advance(24 * 60);
        let restaurants = h.catalog().fetch_restaurants().unwrap();

        assert_eq!(h.fetcher.calls(SHEET_URL), 2);
        assert_eq!(restaurants[0].name, "Auntie's Kitchen");
    }

    #[test]
    fn test_failure_without_cache_surfaces() {
        let mut h = Harness::new();
        h.fetcher.fail(SHEET_URL);

        let result = h.catalog().fetch_restaurants();
        assert!(matches!(result, Err(Error::Status { status: 503, .. })));
    }

    #[test]
    fn test_corrupt_cache_is_ignored() {
        let mut h = Harness::new();
        h.storage.set(keys::RESTAURANTS, "{not json").unwrap();
        h.storage.set(keys::RESTAURANTS_TIME, "0").unwrap();
        h.fetcher.fail(SHEET_URL);
        assert!(h.catalog().fetch_restaurants().is_err());

        h.fetcher.serve(SHEET_URL, SHEET);
        assert_eq!(h.catalog().fetch_restaurants().unwrap().len(), 1);
    }

    #[test]
    fn test_menu_cached_per_source() {
        let mut h = Harness::new();
        h.fetcher.serve(MENU_URL, MENU);
        h.fetcher.serve("https://sheets.example/other.csv", "header\nMain,Rice,4,both,\n");

        let menu = h.catalog().fetch_menu_items(MENU_URL).unwrap();
        let other = h.catalog().fetch_menu_items("https://sheets.example/other.csv").unwrap();
        let again = h.catalog().fetch_menu_items(MENU_URL).unwrap();

        assert_eq!(menu, again);
        assert_eq!(menu.sections().len(), 2);
        assert_eq!(other.items().next().unwrap().name, "Rice");
        assert_eq!(h.fetcher.calls(MENU_URL), 1);
        assert!(h.storage.get(&keys::menu_time(MENU_URL)).unwrap().is_some());
    }

    #[test]
    fn test_refresh_bypasses_cache() {
        let mut h = Harness::new();
        h.fetcher.serve(SHEET_URL, SHEET);
        h.catalog().fetch_restaurants().unwrap();

        h.fetcher.serve(SHEET_URL, SHEET_V2);
        let restaurants = h.catalog().refresh_restaurants().unwrap();
        assert_eq!(restaurants[0].name, "Corner Cafe");

        h.fetcher.fail(MENU_URL);
        assert!(h.catalog().refresh_menu(MENU_URL).is_err());
    }

    #[test]
    fn test_restaurant_lookup() {
        let mut h = Harness::new();
        h.fetcher.serve(SHEET_URL, SHEET);

        let mut catalog = h.catalog();
        assert_eq!(catalog.restaurant("restaurant_1").unwrap().name, "Auntie's Kitchen");
        assert!(matches!(
            catalog.restaurant("restaurant_2"),
            Err(Error::NotFound(_))
        ));
    }
}
