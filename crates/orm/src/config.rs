//! Environment-driven database configuration

use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::database::PoolConfig;

/// Database settings shared by the pool and by every element query
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub database_url: String,
    /// Prepended to every physical table name (`shop_` → `shop_elements`)
    pub table_prefix: String,
    pub pool: PoolConfig,
}

impl DatabaseConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = get_env_required("DATABASE_URL")?;
        let table_prefix = get_env_or_default("DB_TABLE_PREFIX", "");

        let defaults = PoolConfig::default();
        let pool = PoolConfig {
            max_connections: get_env_parsed("DB_MAX_CONNECTIONS", defaults.max_connections)?,
            min_connections: get_env_parsed("DB_MIN_CONNECTIONS", defaults.min_connections)?,
            acquire_timeout: get_env_parsed("DB_ACQUIRE_TIMEOUT", defaults.acquire_timeout)?,
            ..defaults
        };

        Ok(DatabaseConfig {
            database_url,
            table_prefix,
            pool,
        })
    }

    /// Build a configuration without touching the environment
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            table_prefix: String::new(),
            pool: PoolConfig::default(),
        }
    }

    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: "database_url".to_string(),
                reason: "Database URL cannot be empty".to_string(),
            });
        }

        if !self
            .table_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ConfigError::ValidationFailed {
                field: "table_prefix".to_string(),
                reason: "Table prefix may only contain ASCII letters, digits and underscores"
                    .to_string(),
            });
        }

        if self.pool.min_connections > self.pool.max_connections {
            return Err(ConfigError::ValidationFailed {
                field: "min_connections".to_string(),
                reason: format!(
                    "min_connections ({}) exceeds max_connections ({})",
                    self.pool.min_connections, self.pool.max_connections
                ),
            });
        }

        Ok(())
    }
}

// Helper functions for environment variable handling
fn get_env_required(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingEnvVar {
        var: key.to_string(),
    })
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_env_parsed<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            field: key.to_string(),
            value: raw,
            expected: "a non-negative integer".to_string(),
        }),
        Err(_) => Ok(default),
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}")]
    MissingEnvVar { var: String },

    #[error("Invalid value for {field}: '{value}', expected {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Validation failed for {field}: {reason}")]
    ValidationFailed { field: String, reason: String },
}
