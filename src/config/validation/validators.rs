//! Validators for each configuration section

use super::trait_def::Validate;
use crate::config::models::*;

impl Validate for AuthzConfig {
    fn validate(&self) -> Result<(), String> {
        if self.admin_role.trim().is_empty() {
            return Err("Admin role slug cannot be empty".to_string());
        }

        if self.moderator_role.trim().is_empty() {
            return Err("Moderator role slug cannot be empty".to_string());
        }

        Ok(())
    }
}

impl Validate for CacheConfig {
    fn validate(&self) -> Result<(), String> {
        if self.ttl == 0 {
            return Err("Cache TTL must be greater than 0".to_string());
        }

        if self.max_entries == 0 {
            return Err("Cache max entries must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for StorageConfig {
    fn validate(&self) -> Result<(), String> {
        if self.database.url.trim().is_empty() {
            return Err("Database URL cannot be empty".to_string());
        }

        if self.database.max_connections == 0 {
            return Err("Database max connections must be greater than 0".to_string());
        }

        if self.redis.enabled {
            if self.redis.url.trim().is_empty() {
                return Err("Redis URL cannot be empty when Redis is enabled".to_string());
            }
            url::Url::parse(&self.redis.url)
                .map_err(|e| format!("Invalid Redis URL: {}", e))?;
        }

        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.level.trim().is_empty() {
            return Err("Log level cannot be empty".to_string());
        }

        Ok(())
    }
}
