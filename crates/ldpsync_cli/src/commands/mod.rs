//! CLI command implementations.

pub mod operate;
pub mod resolve;
pub mod show_config;
