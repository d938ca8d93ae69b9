//! Core types and constants for the RSSI localization pipeline

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
