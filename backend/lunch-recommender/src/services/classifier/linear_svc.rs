//! Linear Support Vector Classifier
//!
//! L2-regularized hinge loss, solved in the dual by coordinate descent
//! (one alpha per training row, box-constrained to [0, C]).
//! The intercept is modeled as an extra constant feature of value 1.

use super::{Result, TrainingError};
use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, warn};

/// Projected gradients below this are treated as zero
const GRADIENT_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct SvcParams {
    /// Inverse regularization strength
    pub c: f64,
    /// Stop once the projected-gradient spread of an epoch falls below this
    pub tolerance: f64,
    pub max_iter: usize,
    /// Seeds the per-epoch coordinate shuffle
    pub seed: u64,
}

impl Default for SvcParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            tolerance: 1e-4,
            max_iter: 1000,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LinearSvc {
    weights: Array1<f64>,
    bias: f64,
}

impl LinearSvc {
    /// Fit on rows of `features` with boolean labels (true = selected)
    pub fn fit(features: ArrayView2<f64>, labels: &[bool], params: &SvcParams) -> Result<Self> {
        let (rows, width) = features.dim();

        if rows == 0 {
            return Err(TrainingError::EmptyTrainingSet);
        }
        if rows != labels.len() {
            return Err(TrainingError::LengthMismatch {
                rows,
                labels: labels.len(),
            });
        }
        if labels.iter().all(|&l| l) || labels.iter().all(|&l| !l) {
            return Err(TrainingError::SingleClass);
        }

        let signs: Vec<f64> = labels.iter().map(|&l| if l { 1.0 } else { -1.0 }).collect();
        // Diagonal of the kernel matrix, +1 for the constant intercept feature
        let diagonal: Vec<f64> = features.rows().into_iter().map(|r| r.dot(&r) + 1.0).collect();

        let mut alpha = vec![0.0; rows];
        let mut weights = Array1::<f64>::zeros(width);
        let mut bias = 0.0;
        let mut order: Vec<usize> = (0..rows).collect();
        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut converged = false;
        let mut epochs = 0;

        while epochs < params.max_iter {
            epochs += 1;
            order.shuffle(&mut rng);

            let mut max_projected = f64::NEG_INFINITY;
            let mut min_projected = f64::INFINITY;

            for &i in &order {
                let row = features.row(i);
                let gradient = signs[i] * (weights.dot(&row) + bias) - 1.0;

                let projected = if alpha[i] <= 0.0 {
                    gradient.min(0.0)
                } else if alpha[i] >= params.c {
                    gradient.max(0.0)
                } else {
                    gradient
                };

                max_projected = max_projected.max(projected);
                min_projected = min_projected.min(projected);

                if projected.abs() > GRADIENT_EPSILON {
                    let previous = alpha[i];
                    alpha[i] = (previous - gradient / diagonal[i]).clamp(0.0, params.c);
                    let step = (alpha[i] - previous) * signs[i];
                    weights.scaled_add(step, &row);
                    bias += step;
                }
            }

            if max_projected - min_projected <= params.tolerance {
                converged = true;
                break;
            }
        }

        if converged {
            debug!(rows = rows, width = width, epochs = epochs, "Linear SVC converged");
        } else {
            warn!(
                rows = rows,
                width = width,
                max_iter = params.max_iter,
                "Linear SVC did not converge, using last iterate"
            );
        }

        if weights.iter().any(|w| !w.is_finite()) || !bias.is_finite() {
            return Err(TrainingError::Diverged);
        }

        Ok(Self { weights, bias })
    }

    /// Signed distance-like margin; positive means "selected"
    pub fn decision(&self, features: ArrayView1<f64>) -> f64 {
        self.weights.dot(&features) + self.bias
    }

    pub fn decisions(&self, features: ArrayView2<f64>) -> Array1<f64> {
        features.dot(&self.weights) + self.bias
    }

    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_separates_disjoint_features() {
        // Feature 0 marks selected meals, feature 1 marks skipped ones
        let features = array![
            [1.0, 0.0, 1.0],
            [1.0, 0.0, 0.0],
            [1.0, 0.0, 1.0],
            [0.0, 1.0, 1.0],
            [0.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ];
        let labels = [true, true, true, false, false, false];

        let svc = LinearSvc::fit(features.view(), &labels, &SvcParams::default()).unwrap();

        for (row, &label) in features.rows().into_iter().zip(labels.iter()) {
            let decision = svc.decision(row);
            assert_eq!(decision > 0.0, label, "decision {} for {:?}", decision, row);
        }
        assert!(svc.weights()[0] > svc.weights()[1]);
    }

    #[test]
    fn test_batch_decisions_match_single() {
        let features = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
        let labels = [true, false, true];

        let svc = LinearSvc::fit(features.view(), &labels, &SvcParams::default()).unwrap();
        let batch = svc.decisions(features.view());

        for (i, row) in features.rows().into_iter().enumerate() {
            assert!((batch[i] - svc.decision(row)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let features = array![[1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]];
        let labels = [true, true, false, false];
        let params = SvcParams {
            seed: 3,
            ..SvcParams::default()
        };

        let first = LinearSvc::fit(features.view(), &labels, &params).unwrap();
        let second = LinearSvc::fit(features.view(), &labels, &params).unwrap();

        assert_eq!(first.weights(), second.weights());
        assert_eq!(first.bias(), second.bias());
    }

    #[test]
    fn test_single_class_is_rejected() {
        let features = array![[1.0], [0.0]];

        let result = LinearSvc::fit(features.view(), &[true, true], &SvcParams::default());

        assert!(matches!(result, Err(TrainingError::SingleClass)));
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let features = ndarray::Array2::<f64>::zeros((0, 3));

        let result = LinearSvc::fit(features.view(), &[], &SvcParams::default());

        assert!(matches!(result, Err(TrainingError::EmptyTrainingSet)));
    }
}
