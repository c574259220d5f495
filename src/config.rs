use crate::catalog::DEFAULT_FRESHNESS_MINUTES;
use crate::errors::{Error, Result};
use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};
use tracing::{info, warn};

/// Published CSV export of the restaurant directory
pub const DEFAULT_SHEET_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vR9TxJ461YJY5UIpP9Tfv8O1R8Lac6lyCGRRBPIHzBiscc9wSlk68Ja6_ffQUMMCWkeEr6ts_jDrrDI/pub?output=csv";

pub const DEFAULT_DB_PATH: &str = "restaurant-link.db";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub sheet_url: String,
    pub db_path: PathBuf,
    pub cache_freshness: chrono::Duration,
    /// Extra attempts after a failed fetch
    pub fetch_retries: u32,
    pub timeout: Duration,
}

impl Config {
    /// Read the configuration from the environment
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the configuration from `lookup`, falling back to defaults for
    /// missing keys
    pub fn from_lookup<L>(lookup: L) -> Result<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        let minutes: i64 = try_load(
            &lookup,
            "RESTAURANT_LINK_CACHE_MINUTES",
            &DEFAULT_FRESHNESS_MINUTES.to_string(),
        )?;
        let out_of_range = |reason: &str| Error::Config {
            key: "RESTAURANT_LINK_CACHE_MINUTES".to_string(),
            reason: reason.to_string(),
        };
        if minutes < 0 {
            return Err(out_of_range("must not be negative"));
        }
        let cache_freshness =
            chrono::Duration::try_minutes(minutes).ok_or_else(|| out_of_range("out of range"))?;

        Ok(Self {
            sheet_url: try_load(&lookup, "RESTAURANT_LINK_SHEET_URL", DEFAULT_SHEET_URL)?,
            db_path: try_load(&lookup, "RESTAURANT_LINK_DB", DEFAULT_DB_PATH)?,
            cache_freshness,
            fetch_retries: try_load(&lookup, "RESTAURANT_LINK_RETRIES", "2")?,
            timeout: Duration::from_secs(try_load(
                &lookup,
                "RESTAURANT_LINK_TIMEOUT_SECS",
                "10",
            )?),
        })
    }
}

fn try_load<T, L>(lookup: &L, key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
    L: Fn(&str) -> Option<String>,
{
    lookup(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            Error::Config {
                key: key.to_string(),
                reason: e.to_string(),
            }
        })
}
