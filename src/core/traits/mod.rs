//! Core traits module
//!
//! Abstract interfaces the engine is written against

pub mod cache;

pub use cache::*;
