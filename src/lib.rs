//! RSSI Localization Simulator
//!
//! Indoor positioning from received signal strength: a log-normal shadowing
//! model synthesizes RSSI readings from fixed anchors, and a linearized
//! least-squares multilateration recovers the target position from them.

pub mod core;
pub mod algorithms;
pub mod simulation;
pub mod storage;
pub mod validation;
pub mod utils;
pub mod api;

// Re-export commonly used types
pub use core::{
    AnchorNode, PathLossModel, Position, RssiObservation, RssiReading, SavedRun, SimulationParams,
    SimulationResult,
};
pub use algorithms::{
    distance, estimated_distance, gaussian_noise, generate_readings, synthetic_rssi,
    LeastSquaresPredictor, MultilaterationSolver, Predictor,
};
pub use simulation::Simulator;
pub use storage::{RunStore, StoreError};
pub use validation::{
    AccuracyEvaluator, AccuracyReport, ErrorKind, LocalizationError, LocalizationResult,
};
pub use utils::config::{AppConfig, ConfigError};
