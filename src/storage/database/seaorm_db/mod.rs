// Module declarations
mod types;
mod connection;
mod role_ops;
mod permission_ops;
mod assignment_ops;
mod category_ops;
mod store;

// Re-export public types
pub use types::{DatabaseBackendType, DatabaseStats, SeaOrmDatabase};
