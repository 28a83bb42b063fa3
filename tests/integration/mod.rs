//! Integration tests for forum-authz
//!
//! These tests run the authorization service against a real in-memory
//! SQLite store.

pub mod cache_tests;
pub mod database_tests;
pub mod scenario_tests;
