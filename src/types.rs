use crate::alert::{AlertTrigger, DEFAULT_ALERT_DESTINATION};
use crate::error::{GatewayError, Result};
use crate::filter::FingerprintFilter;
use derive_builder::Builder;
use std::str::FromStr;
use std::time::Duration;

/// Everything a request handler needs, shared as `Arc<AppState>`.
#[derive(Debug)]
pub struct AppState {
    pub filter: FingerprintFilter,
    pub alerts: AlertTrigger,
    pub max_body_bytes: usize,
    pub body_read_timeout: Duration,
}

impl AppState {
    pub fn new(filter: FingerprintFilter, alerts: AlertTrigger) -> Self {
        Self {
            filter,
            alerts,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            body_read_timeout: DEFAULT_BODY_READ_TIMEOUT,
        }
    }

    pub fn with_limits(
        mut self,
        max_body_bytes: usize,
        body_read_timeout: Duration,
    ) -> Self {
        self.max_body_bytes = max_body_bytes;
        self.body_read_timeout = body_read_timeout;
        self
    }
}

pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
pub const DEFAULT_BODY_READ_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Builder, Clone, Debug)]
#[builder(pattern = "owned")]
pub struct ServerConfig {
    #[builder(default = "\"127.0.0.1\".to_string()")]
    pub server_host: String,
    #[builder(default = "3000")]
    pub server_port: u16,
    #[builder(default = "1_000_000")]
    pub filter_bits: usize,
    #[builder(default = "3")]
    pub filter_hashes: usize,
    #[builder(default = "DEFAULT_MAX_BODY_BYTES")]
    pub max_body_bytes: usize,
    #[builder(default = "DEFAULT_BODY_READ_TIMEOUT")]
    pub body_read_timeout: Duration,
    #[builder(default = "DEFAULT_ALERT_DESTINATION.to_string()")]
    pub alert_destination: String,
    #[builder(default = "None")]
    pub known_good_path: Option<String>,
}

/// Parses `var_name` if it is set. Unset or blank variables yield `None`
/// so the builder default applies.
fn env_parse<T>(var_name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(var_name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| GatewayError::EnvParseError {
                var_name: var_name.to_string(),
                value: value.clone(),
                error: e.to_string(),
            }),
        _ => Ok(None),
    }
}

impl ServerConfig {
    /// Reads `GATEWAY_*` variables, honouring a `.env` file if present.
    /// Anything not set falls back to the `ServerConfigBuilder` defaults.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut builder = ServerConfigBuilder::default();
        if let Some(host) = env_parse("GATEWAY_HOST")? {
            builder = builder.server_host(host);
        }
        if let Some(port) = env_parse("GATEWAY_PORT")? {
            builder = builder.server_port(port);
        }
        if let Some(bits) = env_parse("GATEWAY_FILTER_BITS")? {
            builder = builder.filter_bits(bits);
        }
        if let Some(hashes) = env_parse("GATEWAY_FILTER_HASHES")? {
            builder = builder.filter_hashes(hashes);
        }
        if let Some(max) = env_parse("GATEWAY_MAX_BODY_BYTES")? {
            builder = builder.max_body_bytes(max);
        }
        if let Some(secs) = env_parse("GATEWAY_BODY_TIMEOUT_SECS")? {
            builder = builder.body_read_timeout(Duration::from_secs(secs));
        }
        if let Some(destination) = env_parse("GATEWAY_ALERT_DESTINATION")? {
            builder = builder.alert_destination(destination);
        }
        if let Some(path) = env_parse::<String>("GATEWAY_KNOWN_GOOD_PATH")? {
            builder = builder.known_good_path(Some(path));
        }

        builder
            .build()
            .map_err(|e| GatewayError::InvalidConfig(e.to_string()))
    }
}
