//! Error types for the authorization engine

use thiserror::Error;

/// Result type alias for the authorization engine
pub type Result<T> = std::result::Result<T, AuthzError>;

/// Main error type for the authorization engine
#[derive(Error, Debug)]
pub enum AuthzError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Redis errors
    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Condition payload could not be decoded or failed validation
    #[error("Invalid permission conditions: {0}")]
    InvalidConditions(String),

    /// Assigning the parent would close a loop in the role hierarchy
    #[error("Circular inheritance: role {role_id} cannot inherit from role {parent_id}")]
    CircularInheritance { role_id: i64, parent_id: i64 },

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflict errors
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No identity attached to the request
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Identity present, permission denied
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Cache errors
    #[error("Cache error: {0}")]
    Cache(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}
