//! Core functionality for the authorization engine
//!
//! Cache port and the permission cache built on it.

pub mod cache_manager;
pub mod traits;
