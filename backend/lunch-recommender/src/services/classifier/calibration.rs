//! Probability Calibration
//!
//! Turns raw SVM margins into probabilities with Platt scaling:
//! `P(selected | f) = 1 / (1 + exp(A * f + B))`.
//!
//! `CalibratedClassifier` fits one (SVM, sigmoid) pair per stratified
//! cross-validation fold: the SVM on the other folds, the sigmoid on the
//! held-out fold's margins. Predictions average the fold probabilities.

use super::linear_svc::{LinearSvc, SvcParams};
use super::{RelevanceModel, Result, TrainingError};
use crate::utils::sigmoid;
use ndarray::{Array1, ArrayView2, Axis};
use tracing::debug;

const NEWTON_MAX_ITER: usize = 100;
const NEWTON_MIN_STEP: f64 = 1e-10;
/// Keeps the Hessian positive definite
const HESSIAN_RIDGE: f64 = 1e-12;
const GRADIENT_TOLERANCE: f64 = 1e-5;

/// Sigmoid fitted to decision values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SigmoidCalibrator {
    a: f64,
    b: f64,
}

impl SigmoidCalibrator {
    /// Newton's method with backtracking line search on the regularized
    /// cross-entropy (targets smoothed towards the class priors).
    pub fn fit(decisions: &[f64], labels: &[bool]) -> Self {
        let positives = labels.iter().filter(|&&l| l).count() as f64;
        let negatives = labels.len() as f64 - positives;

        let high_target = (positives + 1.0) / (positives + 2.0);
        let low_target = 1.0 / (negatives + 2.0);
        let targets: Vec<f64> = labels
            .iter()
            .map(|&l| if l { high_target } else { low_target })
            .collect();

        let mut a = 0.0;
        let mut b = ((negatives + 1.0) / (positives + 1.0)).ln();
        let mut loss = Self::loss(decisions, &targets, a, b);

        for _ in 0..NEWTON_MAX_ITER {
            let (mut h11, mut h22, mut h21) = (HESSIAN_RIDGE, HESSIAN_RIDGE, 0.0);
            let (mut g1, mut g2) = (0.0, 0.0);

            for (&f, &t) in decisions.iter().zip(targets.iter()) {
                // p = P(selected), q = 1 - p
                let p = sigmoid(-(f * a + b));
                let q = 1.0 - p;
                let d2 = p * q;
                h11 += f * f * d2;
                h22 += d2;
                h21 += f * d2;
                let d1 = t - p;
                g1 += f * d1;
                g2 += d1;
            }

            if g1.abs() < GRADIENT_TOLERANCE && g2.abs() < GRADIENT_TOLERANCE {
                break;
            }

            let det = h11 * h22 - h21 * h21;
            let da = -(h22 * g1 - h21 * g2) / det;
            let db = -(-h21 * g1 + h11 * g2) / det;
            let slope = g1 * da + g2 * db;

            let mut step = 1.0;
            while step >= NEWTON_MIN_STEP {
                let (next_a, next_b) = (a + step * da, b + step * db);
                let next_loss = Self::loss(decisions, &targets, next_a, next_b);
                if next_loss < loss + 1e-4 * step * slope {
                    a = next_a;
                    b = next_b;
                    loss = next_loss;
                    break;
                }
                step /= 2.0;
            }

            if step < NEWTON_MIN_STEP {
                debug!("Sigmoid line search stalled");
                break;
            }
        }

        Self { a, b }
    }

    fn loss(decisions: &[f64], targets: &[f64], a: f64, b: f64) -> f64 {
        decisions
            .iter()
            .zip(targets.iter())
            .map(|(&f, &t)| {
                let z = f * a + b;
                if z >= 0.0 {
                    t * z + (-z).exp().ln_1p()
                } else {
                    (t - 1.0) * z + z.exp().ln_1p()
                }
            })
            .sum()
    }

    pub fn probability(&self, decision: f64) -> f64 {
        sigmoid(-(self.a * decision + self.b))
    }
}

/// Assign each row to one of `folds` folds, round-robin within each class
/// so every fold gets a near-equal share of both classes.
pub fn stratified_folds(labels: &[bool], folds: usize) -> Vec<usize> {
    let mut assignment = vec![0; labels.len()];
    let (mut next_positive, mut next_negative) = (0, 0);

    for (i, &label) in labels.iter().enumerate() {
        let counter = if label {
            &mut next_positive
        } else {
            &mut next_negative
        };
        assignment[i] = *counter % folds;
        *counter += 1;
    }

    assignment
}

#[derive(Debug, Clone)]
struct CalibratedFold {
    svc: LinearSvc,
    sigmoid: SigmoidCalibrator,
}

/// Ensemble of per-fold calibrated linear classifiers
#[derive(Debug, Clone)]
pub struct CalibratedClassifier {
    folds: Vec<CalibratedFold>,
}

impl CalibratedClassifier {
    pub fn fit(
        features: ArrayView2<f64>,
        labels: &[bool],
        params: &SvcParams,
        folds: usize,
    ) -> Result<Self> {
        if folds < 2 {
            return Err(TrainingError::InvalidFoldCount(folds));
        }
        if features.nrows() != labels.len() {
            return Err(TrainingError::LengthMismatch {
                rows: features.nrows(),
                labels: labels.len(),
            });
        }

        let positives = labels.iter().filter(|&&l| l).count();
        let smallest_class = positives.min(labels.len() - positives);
        if smallest_class < folds {
            return Err(TrainingError::TooFewSamples {
                smallest_class,
                folds,
            });
        }

        let assignment = stratified_folds(labels, folds);
        let mut fitted = Vec::with_capacity(folds);

        for fold in 0..folds {
            let (held_out, train): (Vec<usize>, Vec<usize>) =
                (0..labels.len()).partition(|&i| assignment[i] == fold);

            let train_features = features.select(Axis(0), &train);
            let train_labels: Vec<bool> = train.iter().map(|&i| labels[i]).collect();
            let svc = LinearSvc::fit(train_features.view(), &train_labels, params)?;

            let held_out_features = features.select(Axis(0), &held_out);
            let held_out_labels: Vec<bool> = held_out.iter().map(|&i| labels[i]).collect();
            let margins = svc.decisions(held_out_features.view()).to_vec();
            let sigmoid = SigmoidCalibrator::fit(&margins, &held_out_labels);

            debug!(
                fold = fold,
                train_rows = train.len(),
                calibration_rows = held_out.len(),
                "Calibrated fold fitted"
            );

            fitted.push(CalibratedFold { svc, sigmoid });
        }

        Ok(Self { folds: fitted })
    }

    pub fn fold_count(&self) -> usize {
        self.folds.len()
    }
}

impl RelevanceModel for CalibratedClassifier {
    fn predict_proba(&self, features: ArrayView2<f64>) -> Array1<f64> {
        let mut total = Array1::<f64>::zeros(features.nrows());

        for fold in &self.folds {
            let margins = fold.svc.decisions(features);
            total += &margins.mapv(|m| fold.sigmoid.probability(m));
        }

        total / self.folds.len() as f64
    }
}
