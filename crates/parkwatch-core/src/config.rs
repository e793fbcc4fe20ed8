use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub(crate) const DEFAULT_LAT: &str = "25.142349463010277";
pub(crate) const DEFAULT_LON: &str = "121.4937824851125";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a usable
/// configuration pointed at the Taipei parking API.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_coord = |var: &str, default: &str, limit: f64| -> Result<f64, ConfigError> {
        let value = or_default(var, default)
            .trim()
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if !value.is_finite() || value.abs() > limit {
            return Err(invalid(var, format!("must be within ±{limit}")));
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("PARKWATCH_ENV", "development"));
    let bind_addr = parse_addr("PARKWATCH_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("PARKWATCH_LOG_LEVEL", "info");
    let data_dir = PathBuf::from(or_default("PARKWATCH_DATA_DIR", "./data"));
    let sources_path = lookup("PARKWATCH_SOURCES_PATH")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from);

    let default_lat = parse_coord("PARKWATCH_DEFAULT_LAT", DEFAULT_LAT, 90.0)?;
    let default_lon = parse_coord("PARKWATCH_DEFAULT_LON", DEFAULT_LON, 180.0)?;

    let refresh_interval_secs = parse_u64("PARKWATCH_REFRESH_INTERVAL_SECS", "10")?;
    if refresh_interval_secs == 0 {
        return Err(invalid(
            "PARKWATCH_REFRESH_INTERVAL_SECS",
            "must be at least 1".to_string(),
        ));
    }
    let cache_ttl_secs = parse_u64("PARKWATCH_CACHE_TTL_SECS", "300")?;
    let request_timeout_secs = parse_u64("PARKWATCH_REQUEST_TIMEOUT_SECS", "15")?;
    if request_timeout_secs == 0 {
        return Err(invalid(
            "PARKWATCH_REQUEST_TIMEOUT_SECS",
            "must be at least 1".to_string(),
        ));
    }
    let user_agent = or_default(
        "PARKWATCH_USER_AGENT",
        "parkwatch/0.1 (parking-availability)",
    );

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        data_dir,
        sources_path,
        default_lat,
        default_lon,
        refresh_interval_secs,
        cache_ttl_secs,
        request_timeout_secs,
        user_agent,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
