// ============================================
// Random Under-Sampler (類別平衡)
// ============================================
//
// Drops random rows of the majority class until both classes have the
// minority's count. Seeded, so the same input always yields the same subset.
// Kept rows stay in their original relative order.

use crate::models::Label;
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum BalanceError {
    #[error("Cannot balance: no {0:?} examples")]
    EmptyClass(Label),

    #[error("Feature rows ({rows}) and labels ({labels}) differ in length")]
    LengthMismatch { rows: usize, labels: usize },
}

pub type Result<T> = std::result::Result<T, BalanceError>;

pub struct RandomUnderSampler {
    seed: u64,
}

impl RandomUnderSampler {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Return a class-balanced subset of `(features, labels)`.
    ///
    /// Labels are 1.0 (selected) or 0.0 (not selected).
    pub fn resample(
        &self,
        features: &Array2<f64>,
        labels: &Array1<f64>,
    ) -> Result<(Array2<f64>, Array1<f64>)> {
        if features.nrows() != labels.len() {
            return Err(BalanceError::LengthMismatch {
                rows: features.nrows(),
                labels: labels.len(),
            });
        }

        let (positives, negatives): (Vec<usize>, Vec<usize>) =
            (0..labels.len()).partition(|&i| Label::from_value(labels[i]) == Label::Selected);

        if positives.is_empty() {
            return Err(BalanceError::EmptyClass(Label::Selected));
        }
        if negatives.is_empty() {
            return Err(BalanceError::EmptyClass(Label::NotSelected));
        }

        let (minority, majority) = if positives.len() <= negatives.len() {
            (positives, negatives)
        } else {
            (negatives, positives)
        };

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut keep: Vec<usize> = rand::seq::index::sample(&mut rng, majority.len(), minority.len())
            .into_iter()
            .map(|i| majority[i])
            .chain(minority.iter().copied())
            .collect();
        keep.sort_unstable();

        debug!(
            input_rows = labels.len(),
            output_rows = keep.len(),
            per_class = minority.len(),
            "Training data undersampled"
        );

        Ok((features.select(Axis(0), &keep), labels.select(Axis(0), &keep)))
    }
}
