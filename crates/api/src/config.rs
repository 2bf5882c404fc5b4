//! Application configuration loaded from environment variables.

use domain::{DuplicatePolicy, UnknownDuplicatePolicy};
use thiserror::Error;

/// A configuration variable held a value that could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a number, got {value:?}")]
    NotANumber { var: &'static str, value: String },

    #[error("{var} must be greater than zero")]
    Zero { var: &'static str },

    #[error("DUPLICATE_ORDER_POLICY: {0}")]
    DuplicatePolicy(#[from] UnknownDuplicatePolicy),
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `DATABASE_URL`: PostgreSQL connection string; unset keeps orders in memory
/// - `DUPLICATE_ORDER_POLICY`: `overwrite` (default) or `reject`
/// - `LISTENER_CAPACITY`: notification channel capacity (default: `1024`)
/// - `DEFAULT_PAGE_SIZE`: page size when a request gives none (default: `10`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub duplicate_policy: DuplicatePolicy,
    pub listener_capacity: usize,
    pub default_page_size: u32,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Loads configuration through `lookup`, falling back to defaults.
    ///
    /// Unset and empty variables take the default. Set but unusable values
    /// are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(value) => parse_number("PORT", value)?,
            None => defaults.port,
        };
        let duplicate_policy = match get("DUPLICATE_ORDER_POLICY") {
            Some(value) => value.parse()?,
            None => defaults.duplicate_policy,
        };
        let listener_capacity = match get("LISTENER_CAPACITY") {
            Some(value) => non_zero("LISTENER_CAPACITY", parse_number("LISTENER_CAPACITY", value)?)?,
            None => defaults.listener_capacity,
        };
        let default_page_size = match get("DEFAULT_PAGE_SIZE") {
            Some(value) => non_zero("DEFAULT_PAGE_SIZE", parse_number("DEFAULT_PAGE_SIZE", value)?)?,
            None => defaults.default_page_size,
        };

        Ok(Self {
            host: get("HOST").unwrap_or(defaults.host),
            port,
            log_level: get("RUST_LOG").unwrap_or(defaults.log_level),
            database_url: get("DATABASE_URL"),
            duplicate_policy,
            listener_capacity,
            default_page_size,
        })
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_number<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::NotANumber { var, value })
}

fn non_zero<T: Default + PartialEq>(var: &'static str, value: T) -> Result<T, ConfigError> {
    if value == T::default() {
        return Err(ConfigError::Zero { var });
    }
    Ok(value)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            duplicate_policy: DuplicatePolicy::Overwrite,
            listener_capacity: 1024,
            default_page_size: 10,
        }
    }
}
