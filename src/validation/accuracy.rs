use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

use crate::core::{Position, SimulationParams};
use crate::simulation::Simulator;

/// Monte Carlo accuracy evaluation for a fixed anchor layout
pub struct AccuracyEvaluator {
    /// Localization errors of the successful trials, most recent last
    pub error_history: VecDeque<f64>,
    /// Trials that failed to produce a position
    pub failures: usize,
    /// Maximum history size
    max_history_size: usize,
}

/// Accuracy statistics over multiple trials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyStatistics {
    /// Mean localization error (meters)
    pub mean_error: f64,
    /// Standard deviation of localization error (meters)
    pub std_dev_error: f64,
    /// Root Mean Square Error (meters)
    pub rmse: f64,
    /// 95th percentile error (meters)
    pub error_95_percentile: f64,
    pub max_error: f64,
    pub min_error: f64,
    pub sample_count: usize,
}

/// Evaluation outcome with recommendations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccuracyReport {
    pub target: Position,
    pub params: SimulationParams,
    pub trials: usize,
    pub statistics: AccuracyStatistics,
    /// Trials that failed (degenerate geometry and the like), never counted as zero error
    pub failures: usize,
    /// Share of successful trials within one meter of the target (0-1)
    pub within_one_meter_rate: f64,
    pub recommendations: Vec<String>,
}

impl Default for AccuracyEvaluator {
    fn default() -> Self {
        Self {
            error_history: VecDeque::new(),
            failures: 0,
            max_history_size: 10_000,
        }
    }
}

impl AccuracyEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history_size(max_history_size: usize) -> Self {
        Self {
            max_history_size: max_history_size.max(1),
            ..Self::default()
        }
    }

    /// Add one localization error to history
    pub fn record_error(&mut self, error_m: f64) {
        self.error_history.push_back(error_m);
        while self.error_history.len() > self.max_history_size {
            self.error_history.pop_front();
        }
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    pub fn reset(&mut self) {
        self.error_history.clear();
        self.failures = 0;
    }

    /// Calculate accuracy statistics from error history
    pub fn calculate_statistics(&self) -> AccuracyStatistics {
        if self.error_history.is_empty() {
            return AccuracyStatistics {
                mean_error: 0.0,
                std_dev_error: 0.0,
                rmse: 0.0,
                error_95_percentile: 0.0,
                max_error: 0.0,
                min_error: 0.0,
                sample_count: 0,
            };
        }

        let n = self.error_history.len();
        let mean_error = self.error_history.iter().sum::<f64>() / n as f64;

        let rmse = (self.error_history.iter().map(|e| e.powi(2)).sum::<f64>() / n as f64).sqrt();

        let variance = self
            .error_history
            .iter()
            .map(|e| (e - mean_error).powi(2))
            .sum::<f64>()
            / n as f64;

        let max_error = self.error_history.iter().copied().fold(0.0, f64::max);
        let min_error = self.error_history.iter().copied().fold(f64::INFINITY, f64::min);

        let mut sorted: Vec<f64> = self.error_history.iter().copied().collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let index_95 = ((n as f64 * 0.95).ceil() as usize).saturating_sub(1);
        let error_95_percentile = sorted[index_95.min(n - 1)];

        AccuracyStatistics {
            mean_error,
            std_dev_error: variance.sqrt(),
            rmse,
            error_95_percentile,
            max_error,
            min_error,
            sample_count: n,
        }
    }

    /// Run `trials` independent simulations and summarize their errors.
    ///
    /// The history grows to hold every trial, so the report always covers
    /// the whole evaluation.
    pub fn evaluate<R: Rng + ?Sized>(
        &mut self,
        simulator: &Simulator,
        target: Position,
        params: &SimulationParams,
        trials: usize,
        rng: &mut R,
    ) -> AccuracyReport {
        self.reset();
        self.max_history_size = self.max_history_size.max(trials);

        for _ in 0..trials {
            match simulator.run(target, params, rng) {
                Ok(result) => match result.error {
                    Some(error) => self.record_error(error),
                    None => self.record_failure(),
                },
                Err(e) => {
                    debug!(error = %e, "trial failed");
                    self.record_failure();
                }
            }
        }

        self.report(simulator, target, params, trials)
    }

    fn report(
        &self,
        simulator: &Simulator,
        target: Position,
        params: &SimulationParams,
        trials: usize,
    ) -> AccuracyReport {
        let statistics = self.calculate_statistics();

        let within = self.error_history.iter().filter(|e| **e < 1.0).count();
        let within_one_meter_rate = if self.error_history.is_empty() {
            0.0
        } else {
            within as f64 / self.error_history.len() as f64
        };

        let mut recommendations = Vec::new();
        if self.failures > 0 {
            recommendations.push(
                "Some trials could not be solved; spread anchors so no three are collinear"
                    .to_string(),
            );
        }
        if statistics.mean_error > 5.0 {
            if params.noise_std_dev > 2.0 {
                recommendations.push(
                    "Shadowing noise dominates the error budget; expect large errors above 2 dB"
                        .to_string(),
                );
            }
            if simulator.anchors().len() < 5 {
                recommendations
                    .push("Add anchors to overdetermine the least-squares fit".to_string());
            }
        }
        let heavy_tail = statistics.error_95_percentile > 2.0 * statistics.mean_error;
        if heavy_tail && statistics.sample_count > 0 {
            recommendations.push(
                "Heavy error tail; long anchor-target distances amplify RSSI noise".to_string(),
            );
        }

        AccuracyReport {
            target,
            params: *params,
            trials,
            statistics,
            failures: self.failures,
            within_one_meter_rate,
            recommendations,
        }
    }
}
