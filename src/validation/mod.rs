//! Error taxonomy and accuracy evaluation

pub mod accuracy;
pub mod error;

pub use accuracy::{AccuracyEvaluator, AccuracyReport, AccuracyStatistics};
pub use error::{ErrorKind, LocalizationError, LocalizationResult};
