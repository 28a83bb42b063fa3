//! Common test utilities for forum-authz
//!
//! - In-memory SQLite database support
//! - Forum role fixtures
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::common::{TestDatabase, fixtures};
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let db = TestDatabase::new().await;
//!     let forum = fixtures::ForumFixture::seed(&db.service()).await;
//!     // ...
//! }
//! ```

pub mod database;
pub mod fixtures;

// Re-export commonly used items
pub use database::TestDatabase;
pub use fixtures::ForumFixture;
