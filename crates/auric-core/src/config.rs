use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let shop_url = require("AURIC_SHOP_URL")?;
    let access_token = require("AURIC_ACCESS_TOKEN")?;

    let theme_id = lookup("AURIC_THEME_ID").ok();
    let rate_feed_api_key = lookup("AURIC_RATE_FEED_API_KEY").ok();

    let currency = or_default("AURIC_CURRENCY", "INR");
    let log_level = or_default("AURIC_LOG_LEVEL", "info");
    let user_agent = or_default("AURIC_USER_AGENT", "auric/0.1 (price-sync)");

    let request_timeout_secs = parse_u64("AURIC_REQUEST_TIMEOUT_SECS", "30")?;
    let page_limit = parse_u32("AURIC_PAGE_LIMIT", "250")?;
    let inter_request_delay_ms = parse_u64("AURIC_INTER_REQUEST_DELAY_MS", "500")?;
    let max_retries = parse_u32("AURIC_MAX_RETRIES", "2")?;
    let retry_backoff_base_secs = parse_u64("AURIC_RETRY_BACKOFF_BASE_SECS", "5")?;

    Ok(AppConfig {
        shop_url,
        access_token,
        theme_id,
        rate_feed_api_key,
        currency,
        log_level,
        request_timeout_secs,
        user_agent,
        page_limit,
        inter_request_delay_ms,
        max_retries,
        retry_backoff_base_secs,
    })
}
