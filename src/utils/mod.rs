//! Application configuration

pub mod config;

pub use config::{default_anchor_layout, AppConfig, ConfigError, ValidationReport};
