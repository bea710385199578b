use std::env;
use std::net::SocketAddr;

use thiserror::Error;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Without a database URL the server keeps events in memory.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: String,
    /// `None` lifts the request body limit entirely.
    pub max_body_bytes: Option<usize>,
    pub production: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: 5,
            host: "0.0.0.0".to_string(),
            port: 3001,
            cors_allowed_origins: DEFAULT_ALLOWED_ORIGINS.to_string(),
            max_body_bytes: None,
            production: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        Ok(Self {
            database_url: var("DATABASE_URL"),
            max_connections: parse(
                "DATABASE_MAX_CONNECTIONS",
                "u32",
                var("DATABASE_MAX_CONNECTIONS"),
            )?
            .unwrap_or(defaults.max_connections),
            host: var("HOST").unwrap_or(defaults.host),
            port: parse("PORT", "u16", var("PORT"))?.unwrap_or(defaults.port),
            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS")
                .unwrap_or(defaults.cors_allowed_origins),
            max_body_bytes: parse("MAX_BODY_BYTES", "byte count", var("MAX_BODY_BYTES"))?,
            production: var("RUST_ENV")
                .map(|v| v.to_lowercase() == "production")
                .unwrap_or(false),
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::Invalid {
            name: "HOST",
            expected: "socket address",
            value: addr,
        })
    }
}

fn parse<T: std::str::FromStr>(
    name: &'static str,
    expected: &'static str,
    value: Option<String>,
) -> Result<Option<T>, ConfigError> {
    value
        .map(|raw| {
            raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name,
                expected,
                value: raw,
            })
        })
        .transpose()
}
