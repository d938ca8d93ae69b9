use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias used throughout the estimation pipeline
pub type LocalizationResult<T> = Result<T, LocalizationError>;

/// Error classification for the localization pipeline
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum LocalizationError {
    // Input validation errors
    #[error("At least {required} anchors are required")]
    InsufficientAnchors { available: usize, required: usize },

    #[error("Missing RSSI reading for anchor {anchor_id}")]
    MissingReading { anchor_id: String },

    #[error("Duplicate anchor id {anchor_id}")]
    DuplicateAnchor { anchor_id: String },

    #[error("Missing required fields: {fields}")]
    MissingFields { fields: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    // Numerical errors
    #[error("Singular matrix - anchor geometry is inadequate to localize (det {determinant:.3e})")]
    DegenerateGeometry { determinant: f64 },

    // Domain precondition errors
    #[error("Distance must be positive and finite, got {distance}")]
    InvalidDistance { distance: f64 },

    #[error("Path-loss exponent must be positive and finite, got {value}")]
    InvalidPathLossExponent { value: f64 },

    #[error("Noise standard deviation must be non-negative and finite, got {value}")]
    InvalidNoiseStdDev { value: f64 },
}

/// Broad failure category, used by callers to decide how to report an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Caller-correctable malformed or incomplete input
    InputValidation,
    /// Well-formed input whose geometry cannot be solved
    Numerical,
    /// Values outside the domain of the log/pow signal formulas
    DomainPrecondition,
}

impl LocalizationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LocalizationError::InsufficientAnchors { .. }
            | LocalizationError::MissingReading { .. }
            | LocalizationError::DuplicateAnchor { .. }
            | LocalizationError::MissingFields { .. }
            | LocalizationError::InvalidInput { .. } => ErrorKind::InputValidation,
            LocalizationError::DegenerateGeometry { .. } => ErrorKind::Numerical,
            LocalizationError::InvalidDistance { .. }
            | LocalizationError::InvalidPathLossExponent { .. }
            | LocalizationError::InvalidNoiseStdDev { .. } => ErrorKind::DomainPrecondition,
        }
    }

    /// Machine-readable code for structured error responses
    pub fn error_code(&self) -> &'static str {
        match self {
            LocalizationError::InsufficientAnchors { .. } => "INSUFFICIENT_ANCHORS",
            LocalizationError::MissingReading { .. } => "MISSING_READING",
            LocalizationError::DuplicateAnchor { .. } => "DUPLICATE_ANCHOR",
            LocalizationError::MissingFields { .. } => "MISSING_FIELDS",
            LocalizationError::InvalidInput { .. } => "INVALID_INPUT",
            LocalizationError::DegenerateGeometry { .. } => "DEGENERATE_GEOMETRY",
            LocalizationError::InvalidDistance { .. } => "INVALID_DISTANCE",
            LocalizationError::InvalidPathLossExponent { .. } => "INVALID_PATH_LOSS_EXPONENT",
            LocalizationError::InvalidNoiseStdDev { .. } => "INVALID_NOISE_STD_DEV",
        }
    }

    pub fn is_input_validation(&self) -> bool {
        self.kind() == ErrorKind::InputValidation
    }

    pub fn is_numerical(&self) -> bool {
        self.kind() == ErrorKind::Numerical
    }
}
