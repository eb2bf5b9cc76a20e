use std::net::SocketAddr;

use crate::model::GeoBounds;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Latest-bulletin page; monthly archives are resolved relative to it.
    pub source_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    /// The bulletin host has served incomplete certificate chains before.
    pub accept_invalid_certs: bool,
    /// Fixed UTC offset of the wall-clock times printed by the source.
    pub source_utc_offset_minutes: i32,
    /// Requests per minute the HTTP surface accepts before answering 429.
    pub rate_limit_per_minute: u32,
    pub bounds: GeoBounds,
}
