use nalgebra::{DMatrix, DVector, Matrix2, Vector2};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::core::{AnchorNode, Position, MIN_ANCHORS, SINGULAR_DETERMINANT_THRESHOLD};
use crate::validation::error::{LocalizationError, LocalizationResult};

/// Linearized least-squares multilateration in 2D
///
/// Each circle `(x - xi)^2 + (y - yi)^2 = ri^2` is subtracted from the
/// reference anchor's circle, which cancels the quadratic terms and leaves
/// one linear equation per non-reference anchor. The stacked system
/// `A * [x, y]^T = b` is solved through the normal equations; since the
/// unknown is always 2D, `A^T A` is a fixed 2x2 matrix inverted in closed form.
#[derive(Debug, Clone)]
pub struct MultilaterationSolver {
    /// Normal-matrix determinants below this magnitude are rejected as singular
    pub singularity_threshold: f64,
}

impl Default for MultilaterationSolver {
    fn default() -> Self {
        Self {
            singularity_threshold: SINGULAR_DETERMINANT_THRESHOLD,
        }
    }
}

impl MultilaterationSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Estimate the target position from anchors and per-anchor distances keyed by anchor id
    pub fn solve(
        &self,
        anchors: &[AnchorNode],
        distances: &HashMap<String, f64>,
    ) -> LocalizationResult<Position> {
        if anchors.len() < MIN_ANCHORS {
            return Err(LocalizationError::InsufficientAnchors {
                available: anchors.len(),
                required: MIN_ANCHORS,
            });
        }

        let mut seen = HashSet::with_capacity(anchors.len());
        for anchor in anchors {
            if !seen.insert(anchor.id.as_str()) {
                return Err(LocalizationError::DuplicateAnchor {
                    anchor_id: anchor.id.clone(),
                });
            }
        }

        let ranges = anchors
            .iter()
            .map(|anchor| {
                distances
                    .get(&anchor.id)
                    .copied()
                    .ok_or_else(|| LocalizationError::MissingReading {
                        anchor_id: anchor.id.clone(),
                    })
            })
            .collect::<LocalizationResult<Vec<f64>>>()?;

        let positions: Vec<Position> = anchors.iter().map(|a| a.position).collect();
        self.solve_ranges(&positions, &ranges)
    }

    /// Positional form of [`solve`](Self::solve): `ranges[i]` belongs to `positions[i]`
    pub fn solve_ranges(
        &self,
        positions: &[Position],
        ranges: &[f64],
    ) -> LocalizationResult<Position> {
        if positions.len() < MIN_ANCHORS {
            return Err(LocalizationError::InsufficientAnchors {
                available: positions.len(),
                required: MIN_ANCHORS,
            });
        }
        if ranges.len() != positions.len() {
            return Err(LocalizationError::InvalidInput {
                reason: format!(
                    "{} distances supplied for {} anchors",
                    ranges.len(),
                    positions.len()
                ),
            });
        }
        // The linearization squares every range
        if let Some(&bad) = ranges
            .iter()
            .find(|r| !r.is_finite() || **r < 0.0 || !(**r * **r).is_finite())
        {
            return Err(LocalizationError::InvalidDistance { distance: bad });
        }

        let (a_matrix, b_vector) = Self::linearize(positions, ranges);
        let at = a_matrix.transpose();
        let ata: Matrix2<f64> = (&at * &a_matrix).fixed_view::<2, 2>(0, 0).into_owned();
        let atb: Vector2<f64> = (&at * &b_vector).fixed_rows::<2>(0).into_owned();

        if !b_vector.iter().chain(atb.iter()).all(|v| v.is_finite()) {
            return Err(LocalizationError::InvalidInput {
                reason: "anchor coordinates and ranges overflow the linearized system".to_string(),
            });
        }

        let solution = self.solve_2x2(&ata, &atb)?;
        debug!(
            anchors = positions.len(),
            x = solution.x,
            y = solution.y,
            "multilateration solved"
        );
        Ok(solution)
    }

    /// Determinant of `A^T A` for a layout, independent of the measured ranges.
    ///
    /// Values near zero mean the anchors are collinear or coincident.
    pub fn normal_matrix_determinant(positions: &[Position]) -> f64 {
        if positions.len() < 2 {
            return 0.0;
        }
        let zeros = vec![0.0; positions.len()];
        let (a_matrix, _) = Self::linearize(positions, &zeros);
        let ata = a_matrix.transpose() * &a_matrix;
        ata[(0, 0)] * ata[(1, 1)] - ata[(0, 1)] * ata[(1, 0)]
    }

    /// Build the (n-1) x 2 system against anchor 0 as reference
    fn linearize(positions: &[Position], ranges: &[f64]) -> (DMatrix<f64>, DVector<f64>) {
        let n = positions.len();
        let p1 = positions[0];
        let r1 = ranges[0];

        let mut a_matrix = DMatrix::zeros(n - 1, 2);
        let mut b_vector = DVector::zeros(n - 1);

        for i in 1..n {
            let pi = positions[i];
            let ri = ranges[i];
            let row = i - 1;

            a_matrix[(row, 0)] = 2.0 * (pi.x - p1.x);
            a_matrix[(row, 1)] = 2.0 * (pi.y - p1.y);

            b_vector[row] = r1.powi(2) - ri.powi(2)
                - p1.x.powi(2) - p1.y.powi(2)
                + pi.x.powi(2) + pi.y.powi(2);
        }

        (a_matrix, b_vector)
    }

    /// Cramer's rule on the 2x2 normal equations
    fn solve_2x2(&self, a: &Matrix2<f64>, b: &Vector2<f64>) -> LocalizationResult<Position> {
        let det = a[(0, 0)] * a[(1, 1)] - a[(0, 1)] * a[(1, 0)];

        if det.abs() < self.singularity_threshold || !det.is_finite() {
            return Err(LocalizationError::DegenerateGeometry { determinant: det });
        }

        let x = (b[0] * a[(1, 1)] - b[1] * a[(0, 1)]) / det;
        let y = (a[(0, 0)] * b[1] - a[(1, 0)] * b[0]) / det;
        if !x.is_finite() || !y.is_finite() {
            return Err(LocalizationError::DegenerateGeometry { determinant: det });
        }
        Ok(Position::new(x, y))
    }
}
