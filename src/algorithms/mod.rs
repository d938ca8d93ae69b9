//! Core positioning algorithms

pub mod signal_model;
pub mod multilateration;
pub mod predictor;

pub use signal_model::{
    distance, estimated_distance, gaussian_noise, generate_readings, synthetic_rssi,
};
pub use multilateration::MultilaterationSolver;
pub use predictor::{LeastSquaresPredictor, Predictor};
