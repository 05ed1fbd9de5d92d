//! flydrive-configs
//!
//! Storage manager configuration types and loader.

pub mod config;

pub use config::*;
