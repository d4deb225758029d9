use crate::app_config::AppConfig;
use crate::ConfigError;

const DEFAULT_BASE_URL: &str = "https://pos.moneypex.com";

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
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let moneypex_session_cookie = require("MONEYPEX_SESSION_COOKIE")?;

    let log_level = or_default("MPXSYNC_LOG_LEVEL", "info");

    let moneypex_base_url = or_default("MONEYPEX_BASE_URL", DEFAULT_BASE_URL)
        .trim_end_matches('/')
        .to_string();
    if !(moneypex_base_url.starts_with("http://") || moneypex_base_url.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: "MONEYPEX_BASE_URL".to_string(),
            reason: format!("\"{moneypex_base_url}\" is not an http(s) URL"),
        });
    }

    let request_timeout_secs = parse_u64("MPXSYNC_REQUEST_TIMEOUT_SECS", "30")?;
    let connect_timeout_secs = parse_u64("MPXSYNC_CONNECT_TIMEOUT_SECS", "10")?;
    for (var, secs) in [
        ("MPXSYNC_REQUEST_TIMEOUT_SECS", request_timeout_secs),
        ("MPXSYNC_CONNECT_TIMEOUT_SECS", connect_timeout_secs),
    ] {
        if secs == 0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "timeout must be at least one second".to_string(),
            });
        }
    }

    let user_agent = or_default("MPXSYNC_USER_AGENT", "mpxsync/0.1 (inventory-sync)");
    let poll_schedule = or_default("MPXSYNC_POLL_SCHEDULE", "*/30 * * * * *");
    if poll_schedule.split_whitespace().count() != 6 {
        return Err(ConfigError::InvalidEnvVar {
            var: "MPXSYNC_POLL_SCHEDULE".to_string(),
            reason: "expected a six-field cron expression (sec min hour dom mon dow)".to_string(),
        });
    }

    let updates_path = lookup("MPXSYNC_UPDATES_PATH")
        .ok()
        .filter(|p| !p.is_empty())
        .map(PathBuf::from);

    Ok(AppConfig {
        log_level,
        moneypex_base_url,
        moneypex_session_cookie,
        request_timeout_secs,
        connect_timeout_secs,
        user_agent,
        poll_schedule,
        updates_path,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
