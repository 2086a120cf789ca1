use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// Default values for configuration
const DEFAULT_HOME_COUNTRY: &str = "India";
const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 250;
const DEFAULT_LOG_LEVEL: &str = "info";
const CONFIG_FILE: &str = "config/storefront";

/// Application configuration.
///
/// Values are layered from an optional `config/storefront.*` file and
/// `STOREFRONT_`-prefixed environment variables, with serde defaults
/// filling the rest.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Merchant home country; cash on delivery is only legal for
    /// destinations in this country.
    #[serde(default = "default_home_country")]
    pub home_country: String,

    /// Discounted subtotal at or above which shipping is free.
    #[serde(default = "default_free_shipping_threshold")]
    pub free_shipping_threshold: Decimal,

    /// Flat shipping fee below the free-shipping threshold.
    #[serde(default = "default_flat_shipping_rate")]
    pub flat_shipping_rate: Decimal,

    /// Flat tax rate applied to the discounted subtotal, e.g. 0.08 for 8%.
    /// `None` disables the tax line entirely.
    #[serde(default)]
    pub tax_rate: Option<Decimal>,

    /// Debounce window for search suggestions, in milliseconds.
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            home_country: default_home_country(),
            free_shipping_threshold: default_free_shipping_threshold(),
            flat_shipping_rate: default_flat_shipping_rate(),
            tax_rate: None,
            search_debounce_ms: default_search_debounce_ms(),
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from file and environment.
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix("STOREFRONT"))
            .build()?
            .try_deserialize()
    }
}

fn default_home_country() -> String {
    DEFAULT_HOME_COUNTRY.to_string()
}

fn default_free_shipping_threshold() -> Decimal {
    dec!(25.00)
}

fn default_flat_shipping_rate() -> Decimal {
    dec!(5.99)
}

fn default_search_debounce_ms() -> u64 {
    DEFAULT_SEARCH_DEBOUNCE_MS
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
