//! Log-normal shadowing signal model
//!
//! Forward model: `RSSI = pTx - 10 * n * log10(d) + X_sigma`, with `X_sigma`
//! drawn from a zero-mean Gaussian. The inverse drops the noise term and
//! solves for `d`.

use rand::Rng;
use std::f64::consts::PI;
use tracing::debug;

use crate::core::{AnchorNode, PathLossModel, Position, RssiReading, SimulationParams};
use crate::validation::error::{LocalizationError, LocalizationResult};

/// Euclidean distance between two positions
pub fn distance(p1: &Position, p2: &Position) -> f64 {
    let dx = p1.x - p2.x;
    let dy = p1.y - p2.y;
    (dx * dx + dy * dy).sqrt()
}

/// Draw one Gaussian sample using the Box-Muller transform
pub fn gaussian_noise<R: Rng + ?Sized>(mean: f64, std_dev: f64, rng: &mut R) -> f64 {
    if std_dev == 0.0 {
        return mean;
    }

    // ln(0) is undefined; gen::<f64>() can return exactly 0.0
    let u1 = rng.gen::<f64>().max(f64::MIN_POSITIVE);
    let u2 = rng.gen::<f64>();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    mean + std_dev * z
}

/// Synthesize a noisy RSSI observation for an anchor at `true_distance`
pub fn synthetic_rssi<R: Rng + ?Sized>(
    true_distance: f64,
    params: &SimulationParams,
    rng: &mut R,
) -> LocalizationResult<f64> {
    params.validate()?;
    if !true_distance.is_finite() || true_distance <= 0.0 {
        return Err(LocalizationError::InvalidDistance {
            distance: true_distance,
        });
    }

    let path_loss = 10.0 * params.path_loss_n * true_distance.log10();
    let noise = gaussian_noise(0.0, params.noise_std_dev, rng);
    Ok(params.p_tx - path_loss + noise)
}

/// Invert the noiseless model: `d = 10^((pTx - RSSI) / (10 * n))`
pub fn estimated_distance(rssi: f64, model: &PathLossModel) -> LocalizationResult<f64> {
    model.validate()?;
    if !rssi.is_finite() {
        return Err(LocalizationError::InvalidInput {
            reason: format!("RSSI must be finite, got {}", rssi),
        });
    }
    let distance = 10f64.powf((model.p_tx - rssi) / (10.0 * model.path_loss_n));
    if !distance.is_finite() || distance <= 0.0 {
        return Err(LocalizationError::InvalidDistance { distance });
    }
    Ok(distance)
}

/// Simulate one reading per anchor, in anchor order
pub fn generate_readings<R: Rng + ?Sized>(
    anchors: &[AnchorNode],
    target: &Position,
    params: &SimulationParams,
    rng: &mut R,
) -> LocalizationResult<Vec<RssiReading>> {
    params.validate()?;
    let model = params.path_loss();

    let readings = anchors
        .iter()
        .map(|anchor| {
            let true_dist = distance(&anchor.position, target);
            let rssi = synthetic_rssi(true_dist, params, rng)?;
            let est_dist = estimated_distance(rssi, &model)?;
            Ok(RssiReading {
                anchor_id: anchor.id.clone(),
                true_dist,
                rssi,
                est_dist,
            })
        })
        .collect::<LocalizationResult<Vec<_>>>()?;

    debug!(
        anchors = readings.len(),
        noise_std_dev = params.noise_std_dev,
        "generated RSSI readings"
    );
    Ok(readings)
}
