use dotenvy::{dotenv, from_filename, var};

use crate::services::config::PollerConfig;

pub fn check_for_env_variables(config: &PollerConfig) {
    match get_env_variable("FOREX_API_URL") {
        Some(url) => println!("Provider URL set to {} ✅", url),
        None => println!("FOREX_API_URL not set, using {} ⚠️", config.base_url),
    };
    println!(
        "Refreshing every {}s, request timeout {}s, keeping {} quotes ✅",
        config.refresh_interval.as_secs(),
        config.request_timeout.as_secs(),
        config.history_cap
    );
    if config.fallback_enabled {
        println!("Fallback rates enabled, failed fetches show placeholder values ⚠️");
    }
    if !config.cache_quotes {
        println!("Quote cache disabled, every request hits the provider ⚠️");
    }
}

pub fn get_env_variable(variable_to_get: &str) -> Option<String> {
    let environment = var("RUST_ENV").unwrap_or_else(|_| "development".into());

    match environment.as_str() {
        "development" => from_filename(".env.dev").ok(),
        "production" => from_filename(".env.prod").ok(),
        _ => dotenv().ok(),
    };
    var(variable_to_get).ok()
}
