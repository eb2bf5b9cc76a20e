use crate::app_config::{AppConfig, Environment};
use crate::model::GeoBounds;
use crate::ConfigError;

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
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

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

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_i32 = |var: &str, default: &str| -> Result<i32, ConfigError> {
        or_default(var, default)
            .parse::<i32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let value = or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(invalid(var, "must be a finite number".to_string()))
        }
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        match or_default(var, default).trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got '{other}'"))),
        }
    };

    let env = parse_environment(&or_default("QUAKEFEED_ENV", "development"))?;
    let bind_addr = parse_addr("QUAKEFEED_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("QUAKEFEED_LOG_LEVEL", "info");

    let source_url = or_default(
        "QUAKEFEED_SOURCE_URL",
        "https://earthquake.phivolcs.dost.gov.ph/",
    );
    if !(source_url.starts_with("http://") || source_url.starts_with("https://")) {
        return Err(invalid(
            "QUAKEFEED_SOURCE_URL",
            "must start with http:// or https://".to_string(),
        ));
    }

    let request_timeout_secs = parse_u64("QUAKEFEED_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("QUAKEFEED_USER_AGENT", "quakefeed/0.1 (bulletin-reader)");
    let max_retries = parse_u32("QUAKEFEED_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("QUAKEFEED_RETRY_BACKOFF_BASE_MS", "500")?;
    let accept_invalid_certs = parse_bool("QUAKEFEED_ACCEPT_INVALID_CERTS", "false")?;

    let source_utc_offset_minutes = parse_i32("QUAKEFEED_SOURCE_UTC_OFFSET_MINUTES", "480")?;
    if source_utc_offset_minutes.abs() >= 24 * 60 {
        return Err(invalid(
            "QUAKEFEED_SOURCE_UTC_OFFSET_MINUTES",
            "must be within one day of UTC".to_string(),
        ));
    }

    let rate_limit_per_minute = parse_u32("QUAKEFEED_RATE_LIMIT_PER_MINUTE", "60")?;
    if rate_limit_per_minute == 0 {
        return Err(invalid(
            "QUAKEFEED_RATE_LIMIT_PER_MINUTE",
            "must be at least 1".to_string(),
        ));
    }

    let bounds = GeoBounds {
        lat_min: parse_f64("QUAKEFEED_LAT_MIN", "3")?,
        lat_max: parse_f64("QUAKEFEED_LAT_MAX", "22")?,
        lon_min: parse_f64("QUAKEFEED_LON_MIN", "115")?,
        lon_max: parse_f64("QUAKEFEED_LON_MAX", "128")?,
    };
    validate_bounds(&bounds)?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        source_url,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        accept_invalid_certs,
        source_utc_offset_minutes,
        rate_limit_per_minute,
        bounds,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "QUAKEFEED_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn validate_bounds(bounds: &GeoBounds) -> Result<(), ConfigError> {
    if bounds.lat_min >= bounds.lat_max {
        return Err(ConfigError::InvalidBounds {
            axis: "latitude",
            min: bounds.lat_min,
            max: bounds.lat_max,
        });
    }
    if bounds.lon_min >= bounds.lon_max {
        return Err(ConfigError::InvalidBounds {
            axis: "longitude",
            min: bounds.lon_min,
            max: bounds.lon_max,
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
