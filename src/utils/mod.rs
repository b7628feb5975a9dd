//! Configuration and logging utilities.

/// Tracing subscriber setup.
pub mod logging;
/// TOML configuration with hot reload.
pub mod toml_config;

pub use toml_config::{ConfigError, Udx3Config, Udx3ConfigManager};
