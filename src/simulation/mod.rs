//! End-to-end simulation runs
//!
//! A [`Simulator`] owns the static anchor layout and a predictor. Each run
//! synthesizes readings for a chosen target, predicts from the RSSI
//! observations alone, and scores the prediction against the true target.

use rand::Rng;
use std::sync::Arc;
use tracing::{info, warn};

use crate::algorithms::predictor::{LeastSquaresPredictor, Predictor};
use crate::algorithms::signal_model::{distance, generate_readings};
use crate::core::{AnchorNode, Position, RssiObservation, SimulationParams, SimulationResult};
use crate::validation::error::{LocalizationError, LocalizationResult};

#[derive(Clone)]
pub struct Simulator {
    anchors: Vec<AnchorNode>,
    field_size_m: f64,
    predictor: Arc<dyn Predictor>,
}

impl Simulator {
    /// Simulator backed by the least-squares predictor
    pub fn new(anchors: Vec<AnchorNode>, field_size_m: f64) -> Self {
        Self::with_predictor(anchors, field_size_m, Arc::new(LeastSquaresPredictor::new()))
    }

    pub fn with_predictor(
        anchors: Vec<AnchorNode>,
        field_size_m: f64,
        predictor: Arc<dyn Predictor>,
    ) -> Self {
        Self {
            anchors,
            field_size_m,
            predictor,
        }
    }

    pub fn anchors(&self) -> &[AnchorNode] {
        &self.anchors
    }

    pub fn field_size_m(&self) -> f64 {
        self.field_size_m
    }

    pub fn predictor(&self) -> &Arc<dyn Predictor> {
        &self.predictor
    }

    /// Run one simulation against `target`.
    ///
    /// The returned result is always complete; on failure nothing is
    /// populated and the error is returned instead.
    pub fn run<R: Rng + ?Sized>(
        &self,
        target: Position,
        params: &SimulationParams,
        rng: &mut R,
    ) -> LocalizationResult<SimulationResult> {
        params.validate()?;
        self.check_in_field(&target)?;

        let outcome = generate_readings(&self.anchors, &target, params, rng).and_then(|readings| {
            let observations: Vec<RssiObservation> =
                readings.iter().map(|r| r.observation()).collect();
            let predicted = self
                .predictor
                .predict(&self.anchors, &observations, &params.path_loss())?;
            Ok((readings, predicted))
        });

        let (readings, predicted) = match outcome {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, x = target.x, y = target.y, "simulation run failed");
                return Err(e);
            }
        };

        let error = distance(&target, &predicted);
        info!(
            predictor = self.predictor.name(),
            error_m = error,
            "simulation complete"
        );

        Ok(SimulationResult {
            target_true_pos: Some(target),
            target_predicted_pos: Some(predicted),
            error: Some(error),
            run_data: readings,
        })
    }

    fn check_in_field(&self, target: &Position) -> LocalizationResult<()> {
        let inside = |v: f64| v.is_finite() && (0.0..=self.field_size_m).contains(&v);
        if inside(target.x) && inside(target.y) {
            Ok(())
        } else {
            Err(LocalizationError::InvalidInput {
                reason: format!(
                    "target ({}, {}) lies outside the {} m field",
                    target.x, target.y, self.field_size_m
                ),
            })
        }
    }
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("anchors", &self.anchors)
            .field("field_size_m", &self.field_size_m)
            .field("predictor", &self.predictor.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PathLossModel, DEFAULT_FIELD_SIZE_M};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn square_anchors() -> Vec<AnchorNode> {
        vec![
            AnchorNode::new("A1", 10.0, 10.0),
            AnchorNode::new("A2", 90.0, 10.0),
            AnchorNode::new("A3", 90.0, 90.0),
            AnchorNode::new("A4", 10.0, 90.0),
        ]
    }

    #[test]
    fn test_noiseless_run_is_exact() {
        let simulator = Simulator::new(square_anchors(), DEFAULT_FIELD_SIZE_M);
        let params = SimulationParams::new(-40.0, 2.5, 0.0);
        let mut rng = StdRng::seed_from_u64(0);

        let result = simulator.run(Position::new(50.0, 50.0), &params, &mut rng).unwrap();
        assert!(result.is_complete());
        assert_eq!(result.run_data.len(), 4);
        assert!(result.error.unwrap() < 1e-6);

        let predicted = result.target_predicted_pos.unwrap();
        assert!((predicted.x - 50.0).abs() < 1e-6);
        assert!((predicted.y - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_noisy_run_reports_error_against_truth() {
        let simulator = Simulator::new(square_anchors(), DEFAULT_FIELD_SIZE_M);
        let params = SimulationParams::new(-40.0, 2.5, 4.0);
        let mut rng = StdRng::seed_from_u64(2024);

        let target = Position::new(35.0, 62.0);
        let result = simulator.run(target, &params, &mut rng).unwrap();
        let predicted = result.target_predicted_pos.unwrap();
        assert!((result.error.unwrap() - distance(&target, &predicted)).abs() < 1e-12);
        assert!(result.error.unwrap() > 0.0);
    }

    #[test]
    fn test_target_outside_field_rejected() {
        let simulator = Simulator::new(square_anchors(), DEFAULT_FIELD_SIZE_M);
        let mut rng = StdRng::seed_from_u64(0);

        let err = simulator
            .run(Position::new(150.0, 20.0), &SimulationParams::default(), &mut rng)
            .unwrap_err();
        assert!(err.is_input_validation());
    }

    #[test]
    fn test_target_on_anchor_fails() {
        let simulator = Simulator::new(square_anchors(), DEFAULT_FIELD_SIZE_M);
        let mut rng = StdRng::seed_from_u64(0);

        let err = simulator
            .run(Position::new(90.0, 90.0), &SimulationParams::default(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, LocalizationError::InvalidDistance { .. }));
    }

    #[test]
    fn test_collinear_layout_fails_instead_of_zero_error() {
        let anchors = vec![
            AnchorNode::new("A1", 0.0, 50.0),
            AnchorNode::new("A2", 50.0, 50.0),
            AnchorNode::new("A3", 100.0, 50.0),
        ];
        let simulator = Simulator::new(anchors, DEFAULT_FIELD_SIZE_M);
        let mut rng = StdRng::seed_from_u64(0);

        let err = simulator
            .run(Position::new(30.0, 20.0), &SimulationParams::new(-40.0, 2.5, 0.0), &mut rng)
            .unwrap_err();
        assert!(err.is_numerical());
    }

    struct FixedPredictor(Position);

    impl Predictor for FixedPredictor {
        fn name(&self) -> &str {
            "fixed"
        }

        fn predict(
            &self,
            _anchors: &[AnchorNode],
            observations: &[RssiObservation],
            _model: &PathLossModel,
        ) -> LocalizationResult<Position> {
            assert_eq!(observations.len(), 4);
            Ok(self.0)
        }
    }

    #[test]
    fn test_predictor_can_be_swapped() {
        let simulator = Simulator::with_predictor(
            square_anchors(),
            DEFAULT_FIELD_SIZE_M,
            Arc::new(FixedPredictor(Position::new(0.0, 0.0))),
        );
        let mut rng = StdRng::seed_from_u64(0);

        let result = simulator
            .run(Position::new(30.0, 40.0), &SimulationParams::new(-40.0, 2.5, 0.0), &mut rng)
            .unwrap();
        assert_eq!(result.target_predicted_pos, Some(Position::new(0.0, 0.0)));
        assert!((result.error.unwrap() - 50.0).abs() < 1e-12);
    }
}
