//! Configuration module for the match service
//!
//! Handles runtime configuration including the metrics endpoint and the
//! optional order seeder.

use log::warn;
use once_cell::sync::OnceCell;
use serde_derive::Deserialize;
use std::sync::Mutex;

/// Global configuration instance
static INSTANCE: OnceCell<Mutex<RuntimeConfig>> = OnceCell::new();

/// Returns a reference to the global configuration instance
pub fn instance() -> &'static Mutex<RuntimeConfig> {
    INSTANCE.get_or_init(|| Mutex::new(RuntimeConfig::new()))
}

/// Runtime configuration for the match service
#[derive(Debug, Deserialize, Clone)]
pub struct RuntimeConfig {
    /// Network address for metrics collection
    pub metrics_addr: String,
    /// Whether to feed the engine a random order stream
    pub seed_orders: bool,
    /// Interval between seeded orders in milliseconds
    pub seed_interval_ms: u64,
    /// Lowest seeded price in ticks
    pub seed_price_min: i64,
    /// Highest seeded price in ticks
    pub seed_price_max: i64,
    /// Largest seeded order quantity
    pub seed_max_qty: i64,
}

impl RuntimeConfig {
    /// Creates a new RuntimeConfig with default values
    pub fn new() -> Self {
        RuntimeConfig {
            metrics_addr: "0.0.0.0:4010".to_string(),
            seed_orders: false,
            seed_interval_ms: 1000,
            seed_price_min: 90,
            seed_price_max: 110,
            seed_max_qty: 50,
        }
    }

    /// Loads configuration from a TOML file
    ///
    /// Falls back to defaults when the file is missing or malformed.
    pub fn from_toml(path: &str) -> Option<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!(
                    "Something went wrong reading the runtime config file, {:?}",
                    e
                );
                return Some(RuntimeConfig::new());
            }
        };
        let config: RuntimeConfig = match toml::from_str(&contents) {
            Ok(c) => c,
            Err(e) => {
                warn!(
                    "Something went wrong reading the runtime config file, {:?}",
                    e
                );
                return Some(RuntimeConfig::new());
            }
        };
        instance().lock().unwrap().clone_from(&config);
        Some(config)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new()
    }
}
