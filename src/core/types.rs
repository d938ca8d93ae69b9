//! Core data types for the localization pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::error::{LocalizationError, LocalizationResult};

/// 2D position in meters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Fixed reference node with a known position.
///
/// Serialized flat as `{ "id": .., "x": .., "y": .. }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorNode {
    pub id: String,
    #[serde(flatten)]
    pub position: Position,
}

impl AnchorNode {
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            position: Position::new(x, y),
        }
    }
}

/// Parameters of the log-normal shadowing model for one simulation run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParams {
    /// Reference RSSI at 1 m (dBm)
    pub p_tx: f64,
    /// Path-loss exponent (unitless, > 0)
    pub path_loss_n: f64,
    /// Standard deviation of the additive shadowing noise (dB, >= 0)
    pub noise_std_dev: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            p_tx: crate::core::DEFAULT_P_TX_DBM,
            path_loss_n: crate::core::DEFAULT_PATH_LOSS_EXPONENT,
            noise_std_dev: crate::core::DEFAULT_NOISE_STD_DEV_DB,
        }
    }
}

impl SimulationParams {
    pub fn new(p_tx: f64, path_loss_n: f64, noise_std_dev: f64) -> Self {
        Self {
            p_tx,
            path_loss_n,
            noise_std_dev,
        }
    }

    /// Noise-free subset used to invert RSSI back into distance
    pub fn path_loss(&self) -> PathLossModel {
        PathLossModel {
            p_tx: self.p_tx,
            path_loss_n: self.path_loss_n,
        }
    }

    /// Check the preconditions of the log/pow formulas
    pub fn validate(&self) -> LocalizationResult<()> {
        self.path_loss().validate()?;
        if !self.noise_std_dev.is_finite() || self.noise_std_dev < 0.0 {
            return Err(LocalizationError::InvalidNoiseStdDev {
                value: self.noise_std_dev,
            });
        }
        Ok(())
    }
}

/// Reference power and path-loss exponent, as carried by prediction requests
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathLossModel {
    #[serde(rename = "pTx")]
    pub p_tx: f64,
    #[serde(rename = "n", alias = "pathLossN")]
    pub path_loss_n: f64,
}

impl PathLossModel {
    pub fn validate(&self) -> LocalizationResult<()> {
        if !self.path_loss_n.is_finite() || self.path_loss_n <= 0.0 {
            return Err(LocalizationError::InvalidPathLossExponent {
                value: self.path_loss_n,
            });
        }
        if !self.p_tx.is_finite() {
            return Err(LocalizationError::InvalidInput {
                reason: format!("reference power must be finite, got {}", self.p_tx),
            });
        }
        Ok(())
    }
}

/// What a receiver actually observes from one anchor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RssiObservation {
    #[serde(rename = "id", alias = "anchorId")]
    pub anchor_id: String,
    pub rssi: f64,
}

/// One simulated reading per anchor per run.
///
/// `true_dist` is ground truth and never reaches a predictor; use
/// [`RssiReading::observation`] to hand readings to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RssiReading {
    pub anchor_id: String,
    pub true_dist: f64,
    pub rssi: f64,
    pub est_dist: f64,
}

impl RssiReading {
    pub fn observation(&self) -> RssiObservation {
        RssiObservation {
            anchor_id: self.anchor_id.clone(),
            rssi: self.rssi,
        }
    }
}

/// Outcome of the current simulation, filled in atomically by one run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub target_true_pos: Option<Position>,
    pub target_predicted_pos: Option<Position>,
    pub error: Option<f64>,
    #[serde(default)]
    pub run_data: Vec<RssiReading>,
}

impl SimulationResult {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Pick a new target; any previous prediction no longer applies
    pub fn with_target(target: Position) -> Self {
        Self {
            target_true_pos: Some(target),
            ..Self::default()
        }
    }

    /// True once a run has produced a prediction and its error
    pub fn is_complete(&self) -> bool {
        self.target_true_pos.is_some()
            && self.target_predicted_pos.is_some()
            && self.error.is_some()
    }

    pub fn from_saved(run: &SavedRun) -> Self {
        Self {
            target_true_pos: Some(run.target_true_pos),
            target_predicted_pos: Some(run.target_predicted_pos),
            error: Some(run.error),
            run_data: run.run_data.clone(),
        }
    }
}

/// Immutable snapshot of a completed run, owned by the run store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedRun {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub params: SimulationParams,
    pub target_true_pos: Position,
    pub target_predicted_pos: Position,
    pub error: f64,
    pub run_data: Vec<RssiReading>,
}
