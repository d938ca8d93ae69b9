//! Position predictors
//!
//! A [`Predictor`] turns anchor positions and raw RSSI observations into a
//! position estimate. Callers hold `Arc<dyn Predictor>` so alternative
//! estimators can be swapped in without touching them.

use std::collections::HashMap;

use crate::algorithms::multilateration::MultilaterationSolver;
use crate::algorithms::signal_model::estimated_distance;
use crate::core::{AnchorNode, PathLossModel, Position, RssiObservation};
use crate::validation::error::{LocalizationError, LocalizationResult};

pub trait Predictor: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    fn predict(
        &self,
        anchors: &[AnchorNode],
        observations: &[RssiObservation],
        model: &PathLossModel,
    ) -> LocalizationResult<Position>;
}

/// Inverts each RSSI through the path-loss model, then multilaterates
#[derive(Debug, Clone, Default)]
pub struct LeastSquaresPredictor {
    solver: MultilaterationSolver,
}

impl LeastSquaresPredictor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_solver(solver: MultilaterationSolver) -> Self {
        Self { solver }
    }
}

impl Predictor for LeastSquaresPredictor {
    fn name(&self) -> &str {
        "least-squares"
    }

    fn predict(
        &self,
        anchors: &[AnchorNode],
        observations: &[RssiObservation],
        model: &PathLossModel,
    ) -> LocalizationResult<Position> {
        model.validate()?;

        let mut distances = HashMap::with_capacity(observations.len());
        for obs in observations {
            let est = estimated_distance(obs.rssi, model)?;
            if distances.insert(obs.anchor_id.clone(), est).is_some() {
                return Err(LocalizationError::InvalidInput {
                    reason: format!("more than one RSSI reading for anchor {}", obs.anchor_id),
                });
            }
        }

        self.solver.solve(anchors, &distances)
    }
}
