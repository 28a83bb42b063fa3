//! Redis connection management
//!
//! This module provides Redis connectivity and health checks.

use crate::config::RedisConfig;
use crate::utils::error::{AuthzError, Result};
use redis::{Client, aio::ConnectionManager};
use std::time::Duration;
use tracing::{debug, info};

/// Redis connection pool over one managed multiplexed connection.
///
/// The manager reconnects in the background after the server drops the
/// connection; commands issued meanwhile fail with a Redis error.
#[derive(Clone)]
pub struct RedisPool {
    /// Cheap to clone, every clone shares the connection
    pub(crate) connection: ConnectionManager,
    /// Configuration
    pub(crate) config: RedisConfig,
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPool")
            .field("url", &Self::sanitize_url(&self.config.url))
            .finish()
    }
}

/// Redis connection wrapper
pub struct RedisConnection {
    pub(crate) conn: ConnectionManager,
}

impl RedisPool {
    /// Create a new Redis pool
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        info!("Creating Redis connection pool");
        debug!("Redis URL: {}", Self::sanitize_url(&config.url));

        let client = Client::open(config.url.as_str()).map_err(AuthzError::Redis)?;

        let connection = tokio::time::timeout(
            Duration::from_secs(config.connection_timeout),
            client.get_connection_manager(),
        )
        .await
        .map_err(|_| {
            AuthzError::Cache(format!(
                "Timed out connecting to Redis at {}",
                Self::sanitize_url(&config.url)
            ))
        })?
        .map_err(AuthzError::Redis)?;

        info!("Redis connection pool created successfully");
        Ok(Self {
            connection,
            config: config.clone(),
        })
    }

    /// Get a connection from the pool
    pub fn get_connection(&self) -> RedisConnection {
        RedisConnection {
            conn: self.connection.clone(),
        }
    }

    /// Health check
    pub async fn health_check(&self) -> Result<()> {
        debug!("Performing Redis health check");
        let mut conn = self.get_connection();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn.conn)
            .await
            .map_err(AuthzError::Redis)?;

        debug!("Redis health check passed");
        Ok(())
    }

    /// Sanitize Redis URL for logging (hide password)
    pub(crate) fn sanitize_url(url: &str) -> String {
        if let Ok(parsed) = url::Url::parse(url) {
            let mut sanitized = parsed.clone();
            if sanitized.password().is_some() {
                let _ = sanitized.set_password(Some("***"));
            }
            sanitized.to_string()
        } else {
            "invalid_url".to_string()
        }
    }
}
