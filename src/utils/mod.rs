//! Utility modules for the authorization engine
//!
//! - **error**: Error types and their HTTP mapping
//! - **logging**: Tracing subscriber setup

pub mod error;
pub mod logging;

pub use error::{AuthzError, Result};
pub use logging::init_logging;
