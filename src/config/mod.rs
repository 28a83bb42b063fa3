//! Configuration management for the authorization engine
//!
//! This module handles loading, validation, and management of all engine configuration.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{AuthzError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Prefix of every environment variable read by [`Config::from_env`]
pub const ENV_PREFIX: &str = "AUTHZ_";

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub authz: AuthzConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AuthzError::Config(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_yaml_str(&content)?;
        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| AuthzError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");
        Self::from_vars(std::env::vars())
    }

    /// Build configuration from `AUTHZ_*` key/value pairs on top of the defaults
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut config = Self::default();

        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value: String = value.into();

            match name {
                "ADMIN_ROLE" => config.authz.admin_role = value,
                "MODERATOR_ROLE" => config.authz.moderator_role = value,
                "MISSING_CONTEXT" => config.authz.missing_context = parse_var(name, &value)?,
                "RATE_LIMIT_FALLBACK" => {
                    config.authz.rate_limit_backend_unavailable = parse_var(name, &value)?
                }
                "TIE_BREAK" => config.authz.tie_break = parse_var(name, &value)?,
                "CACHE_ENABLED" => config.cache.enabled = parse_var(name, &value)?,
                "CACHE_BACKEND" => config.cache.backend = parse_var(name, &value)?,
                "CACHE_TTL" => config.cache.ttl = parse_var(name, &value)?,
                "CACHE_MAX_ENTRIES" => config.cache.max_entries = parse_var(name, &value)?,
                "DATABASE_URL" => config.storage.database.url = value,
                "DATABASE_MAX_CONNECTIONS" => {
                    config.storage.database.max_connections = parse_var(name, &value)?
                }
                "REDIS_URL" => {
                    config.storage.redis.url = value;
                    config.storage.redis.enabled = true;
                }
                "LOG_LEVEL" => config.logging.level = value,
                "LOG_JSON" => config.logging.json = parse_var(name, &value)?,
                other => debug!("Ignoring unknown variable {}{}", ENV_PREFIX, other),
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.authz
            .validate()
            .map_err(|e| AuthzError::Config(format!("Authz config error: {}", e)))?;

        self.cache
            .validate()
            .map_err(|e| AuthzError::Config(format!("Cache config error: {}", e)))?;

        self.storage
            .validate()
            .map_err(|e| AuthzError::Config(format!("Storage config error: {}", e)))?;

        self.logging
            .validate()
            .map_err(|e| AuthzError::Config(format!("Logging config error: {}", e)))?;

        if self.cache.enabled
            && self.cache.backend == CacheBackend::Redis
            && !self.storage.redis.enabled
        {
            return Err(AuthzError::Config(
                "Cache backend 'redis' requires storage.redis.enabled".to_string(),
            ));
        }

        Ok(())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| AuthzError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}

fn parse_var<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AuthzError::Config(format!("Invalid value for {}{}: {}", ENV_PREFIX, name, e)))
}
