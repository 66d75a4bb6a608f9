//! Engine configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TRADECART_DATABASE_URL` - `PostgreSQL` connection string
//!
//! ## Optional
//! - `TRADECART_HOST` - Bind address (default: 127.0.0.1)
//! - `TRADECART_PORT` - Listen port (default: 3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag (e.g., production)
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0..=1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Tracing sample rate (default: 0.0)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_PORT: u16 = 3000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Engine application configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry tracing sample rate
    pub sentry_traces_sample_rate: f32,
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = SecretString::from(require("TRADECART_DATABASE_URL")?);

        let host = match std::env::var("TRADECART_HOST") {
            Ok(v) => parse_var("TRADECART_HOST", &v)?,
            Err(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
        };

        let port = match std::env::var("TRADECART_PORT") {
            Ok(v) => parse_var("TRADECART_PORT", &v)?,
            Err(_) => DEFAULT_PORT,
        };

        let sentry_sample_rate = match std::env::var("SENTRY_SAMPLE_RATE") {
            Ok(v) => parse_var("SENTRY_SAMPLE_RATE", &v)?,
            Err(_) => 1.0,
        };

        let sentry_traces_sample_rate = match std::env::var("SENTRY_TRACES_SAMPLE_RATE") {
            Ok(v) => parse_var("SENTRY_TRACES_SAMPLE_RATE", &v)?,
            Err(_) => 0.0,
        };

        Ok(Self {
            database_url,
            host,
            port,
            sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            sentry_environment: std::env::var("SENTRY_ENVIRONMENT").ok(),
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// The socket address the server binds to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn require(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_owned()))
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidEnvVar(name.to_owned(), value.to_owned()))
}
