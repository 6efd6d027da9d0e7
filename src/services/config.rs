use std::{fmt::Display, str::FromStr, time::Duration};

use tracing::warn;

use super::{
    history::{MAX_HISTORY_CAP, MIN_HISTORY_CAP},
    instruments::{default_instruments, find_instrument, Instrument},
    market_data::freeforex::DEFAULT_BASE_URL,
    shared::env::get_env_variable,
};

pub const DEFAULT_REFRESH_SECS: u64 = 30;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const MIN_TIMEOUT_SECS: u64 = 5;
pub const MAX_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_HISTORY_CAP: usize = 100;
pub const DEFAULT_API_PORT: u16 = 8084;

/// Everything that used to differ between the dashboard variants.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub instruments: Vec<Instrument>,
    pub history_cap: usize,
    /// Polling cadence. The quote cache expires on the same interval.
    pub refresh_interval: Duration,
    pub request_timeout: Duration,
    pub fallback_enabled: bool,
    pub cache_quotes: bool,
    pub require_success_code: bool,
    pub base_url: String,
    pub api_port: u16,
}

impl Default for PollerConfig {
    fn default() -> Self {
        PollerConfig {
            instruments: default_instruments(),
            history_cap: DEFAULT_HISTORY_CAP,
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_SECS),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            fallback_enabled: false,
            cache_quotes: true,
            require_success_code: false,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_port: DEFAULT_API_PORT,
        }
    }
}

impl PollerConfig {
    pub fn from_env() -> PollerConfig {
        PollerConfig::from_lookup(get_env_variable)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> PollerConfig {
        let defaults = PollerConfig::default();

        let refresh_secs: u64 = read_setting(
            lookup("REFRESH_INTERVAL_SECS"),
            "REFRESH_INTERVAL_SECS",
            DEFAULT_REFRESH_SECS,
        )
        .max(1);
        let timeout_secs: u64 = read_setting(
            lookup("REQUEST_TIMEOUT_SECS"),
            "REQUEST_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        )
        .clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS);
        let history_cap: usize =
            read_setting(lookup("HISTORY_CAP"), "HISTORY_CAP", DEFAULT_HISTORY_CAP)
                .clamp(MIN_HISTORY_CAP, MAX_HISTORY_CAP);

        PollerConfig {
            history_cap,
            refresh_interval: Duration::from_secs(refresh_secs),
            request_timeout: Duration::from_secs(timeout_secs),
            fallback_enabled: read_flag(
                lookup("FALLBACK_ENABLED"),
                "FALLBACK_ENABLED",
                defaults.fallback_enabled,
            ),
            cache_quotes: read_flag(lookup("CACHE_QUOTES"), "CACHE_QUOTES", defaults.cache_quotes),
            require_success_code: read_flag(
                lookup("REQUIRE_SUCCESS_CODE"),
                "REQUIRE_SUCCESS_CODE",
                defaults.require_success_code,
            ),
            base_url: lookup("FOREX_API_URL").unwrap_or(defaults.base_url),
            api_port: read_setting(lookup("API_PORT"), "API_PORT", DEFAULT_API_PORT),
            instruments: defaults.instruments,
        }
    }

    pub fn find_instrument(&self, query: &str) -> Option<&Instrument> {
        find_instrument(&self.instruments, query)
    }
}

fn read_setting<T>(raw: Option<String>, name: &str, default: T) -> T
where
    T: FromStr + Display,
{
    match raw {
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid value '{}' for {}, using {}", value, name, default);
            default
        }),
        None => default,
    }
}

fn read_flag(raw: Option<String>, name: &str, default: bool) -> bool {
    match raw.as_deref().map(|value| value.trim().to_lowercase()) {
        Some(value) => match value.as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                warn!("Invalid flag '{}' for {}, using {}", value, name, default);
                default
            }
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> PollerConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PollerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_without_variables() {
        let config = config_from(&[]);
        assert_eq!(config.refresh_interval, Duration::from_secs(30));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.history_cap, 100);
        assert!(!config.fallback_enabled);
        assert!(config.cache_quotes);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.instruments.len(), 6);
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("REFRESH_INTERVAL_SECS", "60"),
            ("HISTORY_CAP", "50"),
            ("FALLBACK_ENABLED", "yes"),
            ("CACHE_QUOTES", "off"),
            ("FOREX_API_URL", "http://localhost:8000"),
        ]);
        assert_eq!(config.refresh_interval, Duration::from_secs(60));
        assert_eq!(config.history_cap, 50);
        assert!(config.fallback_enabled);
        assert!(!config.cache_quotes);
        assert_eq!(config.base_url, "http://localhost:8000");
    }

    #[test]
    fn clamps_timeout_and_cap() {
        let config = config_from(&[("REQUEST_TIMEOUT_SECS", "60"), ("HISTORY_CAP", "0")]);
        assert_eq!(config.request_timeout, Duration::from_secs(MAX_TIMEOUT_SECS));
        assert_eq!(config.history_cap, MIN_HISTORY_CAP);

        let config = config_from(&[("REQUEST_TIMEOUT_SECS", "1")]);
        assert_eq!(config.request_timeout, Duration::from_secs(MIN_TIMEOUT_SECS));
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let config = config_from(&[("REFRESH_INTERVAL_SECS", "soon"), ("FALLBACK_ENABLED", "maybe")]);
        assert_eq!(config.refresh_interval, Duration::from_secs(DEFAULT_REFRESH_SECS));
        assert!(!config.fallback_enabled);
    }
}
