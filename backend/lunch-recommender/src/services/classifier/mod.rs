//! Classifier Module
//!
//! Per-request relevance model for meals.
//!
//! # Architecture
//! - **Linear SVC**: hinge-loss maximum-margin separator (dual coordinate descent)
//! - **Calibration**: stratified k-fold Platt scaling, averaged over folds
//!
//! # Workflow
//! 1. Receive the balanced feature matrix and 0/1 labels
//! 2. Fit k (SVM, sigmoid) pairs, one per held-out fold
//! 3. Predict positive-class probability as the mean over folds
//!
//! Nothing is persisted; a new model is trained for every request.

pub mod calibration;
pub mod linear_svc;

pub use calibration::{CalibratedClassifier, SigmoidCalibrator};
pub use linear_svc::{LinearSvc, SvcParams};

use crate::config::RecommenderConfig;
use crate::models::Label;
use ndarray::{Array1, Array2, ArrayView2};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("Training set is empty")]
    EmptyTrainingSet,

    #[error("Training set contains a single class")]
    SingleClass,

    #[error("Feature rows ({rows}) and labels ({labels}) differ in length")]
    LengthMismatch { rows: usize, labels: usize },

    #[error("Smallest class has {smallest_class} rows, fewer than {folds} calibration folds")]
    TooFewSamples { smallest_class: usize, folds: usize },

    #[error("At least 2 calibration folds are required, got {0}")]
    InvalidFoldCount(usize),

    #[error("Solver produced non-finite weights")]
    Diverged,
}

pub type Result<T> = std::result::Result<T, TrainingError>;

/// Anything that maps feature rows to P(selected)
pub trait RelevanceModel {
    fn predict_proba(&self, features: ArrayView2<f64>) -> Array1<f64>;
}

pub struct Trainer {
    params: SvcParams,
    folds: usize,
}

impl Trainer {
    pub fn new(params: SvcParams, folds: usize) -> Self {
        Self { params, folds }
    }

    pub fn from_config(config: &RecommenderConfig) -> Self {
        Self::new(
            SvcParams {
                c: config.svm_c,
                tolerance: config.svm_tolerance,
                max_iter: config.svm_max_iter,
                seed: config.random_seed,
            },
            config.calibration_folds,
        )
    }

    /// Fit a calibrated classifier on balanced data (labels 1.0 / 0.0)
    pub fn fit(&self, features: &Array2<f64>, labels: &Array1<f64>) -> Result<CalibratedClassifier> {
        let labels: Vec<bool> = labels
            .iter()
            .map(|&v| Label::from_value(v) == Label::Selected)
            .collect();

        let model = CalibratedClassifier::fit(features.view(), &labels, &self.params, self.folds)?;

        info!(
            rows = features.nrows(),
            features = features.ncols(),
            folds = model.fold_count(),
            "Relevance model trained"
        );

        Ok(model)
    }
}
