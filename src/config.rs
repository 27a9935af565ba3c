//! Runtime settings
//!
//! Resolved from `STOREPULSE_*` environment variables, then overridden by
//! CLI flags. Source construction lives here too, so a missing data
//! location surfaces as a misconfiguration before any fetch is issued.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::services::DashboardService;
use crate::sources::{
    generate_orders, generate_traffic, load_orders, load_traffic, CommerceSource, FactTable,
    OrderStore, TrafficSource, Unconfigured, COMMERCE, TRAFFIC,
};
use crate::types::{Result, StorePulseError};

pub const ENV_SEED: &str = "STOREPULSE_SEED";
pub const ENV_ORDERS_FILE: &str = "STOREPULSE_ORDERS_FILE";
pub const ENV_TRAFFIC_FILE: &str = "STOREPULSE_TRAFFIC_FILE";
pub const ENV_GEO_COUNTRY: &str = "STOREPULSE_GEO_COUNTRY";
pub const ENV_SALES_PAGE_SIZE: &str = "STOREPULSE_SALES_PAGE_SIZE";
pub const ENV_MAX_SALES_PAGES: &str = "STOREPULSE_MAX_SALES_PAGES";
pub const ENV_REALTIME_INTERVAL: &str = "STOREPULSE_REALTIME_INTERVAL_SECS";

pub const DEFAULT_GEO_COUNTRY: &str = "Brazil";
pub const DEFAULT_SALES_PAGE_SIZE: u32 = 100;
pub const DEFAULT_MAX_SALES_PAGES: u32 = 50;
pub const DEFAULT_REALTIME_INTERVAL_SECS: u64 = 30;

/// Orders generated for a seeded store
pub const SEEDED_ORDER_COUNT: usize = 600;

const ORDERS_FILE_NAME: &str = "orders.json";
const TRAFFIC_FILE_NAME: &str = "traffic.json";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Seed for the deterministic demo sources; wins over data files
    pub seed: Option<u64>,
    pub orders_file: Option<PathBuf>,
    pub traffic_file: Option<PathBuf>,
    /// Country the region/city breakdown is restricted to
    pub geo_country: String,
    pub sales_page_size: u32,
    pub max_sales_pages: u32,
    pub realtime_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            orders_file: None,
            traffic_file: None,
            geo_country: DEFAULT_GEO_COUNTRY.to_string(),
            sales_page_size: DEFAULT_SALES_PAGE_SIZE,
            max_sales_pages: DEFAULT_MAX_SALES_PAGES,
            realtime_interval: Duration::from_secs(DEFAULT_REALTIME_INTERVAL_SECS),
        }
    }
}

impl Settings {
    /// Settings for a seeded demo store
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Read settings from the process environment, falling back to
    /// exports under `~/.storepulse/`
    pub fn from_env() -> Result<Self> {
        let data_dir = default_data_dir();
        Self::from_lookup(|key| std::env::var(key).ok(), data_dir.as_deref())
    }

    /// Read settings through `lookup`. Files in `data_dir` are used only
    /// when the matching variable is unset and the file exists.
    pub fn from_lookup<F>(lookup: F, data_dir: Option<&Path>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let fallback = |name: &str| {
            data_dir
                .map(|dir| dir.join(name))
                .filter(|path| path.is_file())
        };

        let defaults = Self::default();
        let settings = Self {
            seed: get(ENV_SEED).map(|v| parse_number(ENV_SEED, &v)).transpose()?,
            orders_file: get(ENV_ORDERS_FILE)
                .map(PathBuf::from)
                .or_else(|| fallback(ORDERS_FILE_NAME)),
            traffic_file: get(ENV_TRAFFIC_FILE)
                .map(PathBuf::from)
                .or_else(|| fallback(TRAFFIC_FILE_NAME)),
            geo_country: get(ENV_GEO_COUNTRY).unwrap_or(defaults.geo_country),
            sales_page_size: get(ENV_SALES_PAGE_SIZE)
                .map(|v| parse_positive(ENV_SALES_PAGE_SIZE, &v))
                .transpose()?
                .unwrap_or(defaults.sales_page_size),
            max_sales_pages: get(ENV_MAX_SALES_PAGES)
                .map(|v| parse_positive(ENV_MAX_SALES_PAGES, &v))
                .transpose()?
                .unwrap_or(defaults.max_sales_pages),
            realtime_interval: get(ENV_REALTIME_INTERVAL)
                .map(|v| parse_positive(ENV_REALTIME_INTERVAL, &v))
                .transpose()?
                .map(|secs| Duration::from_secs(u64::from(secs)))
                .unwrap_or(defaults.realtime_interval),
        };
        log::debug!("resolved settings: {:?}", settings);
        Ok(settings)
    }

    /// Apply CLI flags on top of the environment
    pub fn with_overrides(
        mut self,
        seed: Option<u64>,
        orders_file: Option<PathBuf>,
        traffic_file: Option<PathBuf>,
    ) -> Self {
        if seed.is_some() {
            self.seed = seed;
        }
        if orders_file.is_some() {
            self.orders_file = orders_file;
        }
        if traffic_file.is_some() {
            self.traffic_file = traffic_file;
        }
        self
    }

    /// Build the commerce source. `now` anchors seeded order history.
    pub fn commerce_source(&self, now: DateTime<Utc>) -> Result<Arc<dyn CommerceSource>> {
        let orders = match (self.seed, &self.orders_file) {
            (Some(seed), _) => generate_orders(seed, now, SEEDED_ORDER_COUNT),
            (None, Some(path)) => load_orders(path)?,
            (None, None) => {
                return Err(StorePulseError::misconfigured(
                    COMMERCE,
                    format!("set {} or {}", ENV_SEED, ENV_ORDERS_FILE),
                ))
            }
        };
        log::info!("commerce source ready with {} orders", orders.len());
        Ok(Arc::new(OrderStore::new(orders)))
    }

    /// Build the traffic source. Relative report dates resolve against
    /// the UTC date of `now`.
    pub fn traffic_source(&self, now: DateTime<Utc>) -> Result<Arc<dyn TrafficSource>> {
        let today = now.date_naive();
        let dump = match (self.seed, &self.traffic_file) {
            (Some(seed), _) => generate_traffic(seed, today),
            (None, Some(path)) => load_traffic(path)?,
            (None, None) => {
                return Err(StorePulseError::misconfigured(
                    TRAFFIC,
                    format!("set {} or {}", ENV_SEED, ENV_TRAFFIC_FILE),
                ))
            }
        };
        log::info!(
            "traffic source ready with {} facts, {} active",
            dump.facts.len(),
            dump.active.len()
        );
        Ok(Arc::new(FactTable::new(dump, today)))
    }

    /// Build the dashboard. A misconfigured source is replaced by a stand-in
    /// that fails every call, so views over the other source still work.
    pub fn dashboard(&self, now: DateTime<Utc>) -> Result<DashboardService> {
        let commerce: Arc<dyn CommerceSource> = match self.commerce_source(now) {
            Ok(source) => source,
            Err(StorePulseError::Misconfigured {
                source_name,
                reason,
            }) => {
                log::debug!("{} source not configured: {}", source_name, reason);
                Arc::new(Unconfigured::new(source_name, reason))
            }
            Err(e) => return Err(e),
        };
        let traffic: Arc<dyn TrafficSource> = match self.traffic_source(now) {
            Ok(source) => source,
            Err(StorePulseError::Misconfigured {
                source_name,
                reason,
            }) => {
                log::debug!("{} source not configured: {}", source_name, reason);
                Arc::new(Unconfigured::new(source_name, reason))
            }
            Err(e) => return Err(e),
        };
        Ok(DashboardService::new(commerce, traffic, self.clone()))
    }
}

/// `~/.storepulse`, if a home directory can be determined
pub fn default_data_dir() -> Option<PathBuf> {
    match directories::BaseDirs::new() {
        Some(dirs) => Some(dirs.home_dir().join(".storepulse")),
        None => {
            log::warn!("could not determine home directory");
            None
        }
    }
}

fn parse_number(key: &str, raw: &str) -> Result<u64> {
    raw.parse()
        .map_err(|_| StorePulseError::Config(format!("{} must be an integer, got '{}'", key, raw)))
}

fn parse_positive(key: &str, raw: &str) -> Result<u32> {
    match raw.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(StorePulseError::Config(format!(
            "{} must be a positive integer, got '{}'",
            key, raw
        ))),
    }
}
