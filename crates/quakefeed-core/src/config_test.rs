use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "QUAKEFEED_ENV"));
}

#[test]
fn build_app_config_uses_defaults_for_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults are valid");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.source_url, "https://earthquake.phivolcs.dost.gov.ph/");
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.max_retries, 2);
    assert_eq!(cfg.retry_backoff_base_ms, 500);
    assert!(!cfg.accept_invalid_certs);
    assert_eq!(cfg.source_utc_offset_minutes, 480);
    assert_eq!(cfg.rate_limit_per_minute, 60);
    assert_eq!(cfg.bounds, GeoBounds::default());
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = HashMap::new();
    map.insert("QUAKEFEED_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "QUAKEFEED_BIND_ADDR"),
        "expected InvalidEnvVar(QUAKEFEED_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_non_http_source_url() {
    let mut map = HashMap::new();
    map.insert("QUAKEFEED_SOURCE_URL", "ftp://example.com/");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "QUAKEFEED_SOURCE_URL")
    );
}

#[test]
fn build_app_config_parses_accept_invalid_certs() {
    let mut map = HashMap::new();
    map.insert("QUAKEFEED_ACCEPT_INVALID_CERTS", "TRUE");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.accept_invalid_certs);

    map.insert("QUAKEFEED_ACCEPT_INVALID_CERTS", "maybe");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "QUAKEFEED_ACCEPT_INVALID_CERTS")
    );
}

#[test]
fn build_app_config_max_retries_invalid() {
    let mut map = HashMap::new();
    map.insert("QUAKEFEED_MAX_RETRIES", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "QUAKEFEED_MAX_RETRIES")
    );
}

#[test]
fn build_app_config_overrides_bounds() {
    let mut map = HashMap::new();
    map.insert("QUAKEFEED_LAT_MIN", "4.5");
    map.insert("QUAKEFEED_LON_MAX", "130");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!((cfg.bounds.lat_min - 4.5).abs() < f64::EPSILON);
    assert!((cfg.bounds.lon_max - 130.0).abs() < f64::EPSILON);
    assert!((cfg.bounds.lat_max - 22.0).abs() < f64::EPSILON);
}

#[test]
fn build_app_config_rejects_inverted_bounds() {
    let mut map = HashMap::new();
    map.insert("QUAKEFEED_LON_MIN", "129");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(
            result,
            Err(ConfigError::InvalidBounds {
                axis: "longitude",
                ..
            })
        ),
        "expected InvalidBounds(longitude), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_offset_beyond_a_day() {
    let mut map = HashMap::new();
    map.insert("QUAKEFEED_SOURCE_UTC_OFFSET_MINUTES", "1440");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(
        result,
        Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "QUAKEFEED_SOURCE_UTC_OFFSET_MINUTES"
    ));
}

#[test]
fn build_app_config_rejects_zero_rate_limit() {
    let mut map = HashMap::new();
    map.insert("QUAKEFEED_RATE_LIMIT_PER_MINUTE", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(
        result,
        Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "QUAKEFEED_RATE_LIMIT_PER_MINUTE"
    ));
}

#[test]
fn every_variable_is_optional() {
    let map: HashMap<&str, &str> = HashMap::new();
    assert!(build_app_config(lookup_from_map(&map)).is_ok());

    let mut map = HashMap::new();
    map.insert("QUAKEFEED_LAT_MIN", "30");
    match build_app_config(lookup_from_map(&map)) {
        Err(ConfigError::InvalidBounds { axis, .. }) => assert_eq!(axis, "latitude"),
        Err(ConfigError::InvalidEnvVar { var, .. }) => panic!("unexpected invalid {var}"),
        Ok(_) => panic!("inverted bounds accepted"),
    }
}
