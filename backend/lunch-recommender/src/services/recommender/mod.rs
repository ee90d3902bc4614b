// ============================================
// Recommendation Engine (推薦引擎)
// ============================================
//
// Pipeline, run fully for every request:
//   Assemble → Vectorize → Balance → Train → Rank
//
// Terminal states:
// - ranked list produced
// - empty list (insufficient data, or training failed on too little data)

use crate::config::RecommenderConfig;
use crate::models::{Label, RecommendedMeal, UserId};
use crate::services::classifier::Trainer;
use crate::services::features::{FeatureIndex, Vectorizer};
use crate::services::normalizer::TextNormalizer;
use crate::services::ranking::Ranker;
use crate::services::store::MealStore;
use crate::services::training::{AssemblyOutcome, RandomUnderSampler, TrainingSetAssembler};
use chrono::{Local, NaiveDate};
use ndarray::{concatenate, s, Array1, Array2, Axis};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum RecommenderError {
    #[error("Meal store query failed: {0}")]
    Store(#[from] anyhow::Error),

    #[error("Training matrix assembly failed: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

pub type Result<T> = std::result::Result<T, RecommenderError>;

pub struct RecommendationEngine<S> {
    store: S,
    normalizer: Arc<TextNormalizer>,
    config: RecommenderConfig,
}

impl<S> RecommendationEngine<S>
where
    S: MealStore,
{
    pub fn new(store: S, normalizer: Arc<TextNormalizer>, config: RecommenderConfig) -> Self {
        Self {
            store,
            normalizer,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// Top `count` of today's meals for `user_id`, best first
    pub fn get_recommendations(&self, user_id: UserId, count: usize) -> Result<Vec<RecommendedMeal>> {
        self.get_recommendations_for_date(user_id, count, Local::now().date_naive())
    }

    /// Top `count` of the meals offered on `date` for `user_id`, best first
    pub fn get_recommendations_for_date(
        &self,
        user_id: UserId,
        count: usize,
        date: NaiveDate,
    ) -> Result<Vec<RecommendedMeal>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let assembler = TrainingSetAssembler::new(self.config.min_positive_examples);
        let training_set = match assembler.assemble(&self.store, user_id)? {
            AssemblyOutcome::Ready(set) => set,
            AssemblyOutcome::Insufficient(reason) => {
                info!(user_id = %user_id, reason = %reason, "Insufficient data for recommendations");
                return Ok(Vec::new());
            }
        };

        let candidates = self.store.meals_for_date(date)?;
        if candidates.is_empty() {
            info!(user_id = %user_id, date = %date, "No meals offered, nothing to rank");
            return Ok(Vec::new());
        }

        let corpus = self.store.all_meals()?;
        let restaurants = self.store.enabled_restaurants()?;
        let index = FeatureIndex::build(&self.normalizer, &corpus, &restaurants);
        let vectorizer = Vectorizer::new(&self.normalizer, &index);

        let positives = vectorizer.matrix(&training_set.positives, Some(Label::Selected));
        let negatives = vectorizer.matrix(&training_set.negatives, Some(Label::NotSelected));
        let training = concatenate(Axis(0), &[positives.view(), negatives.view()])?;
        let (features, labels) = split_label_column(&training);

        let sampler = RandomUnderSampler::new(self.config.random_seed);
        let (features, labels) = match sampler.resample(&features, &labels) {
            Ok(balanced) => balanced,
            Err(e) => {
                info!(user_id = %user_id, error = %e, "Insufficient data for recommendations");
                return Ok(Vec::new());
            }
        };

        let model = match Trainer::from_config(&self.config).fit(&features, &labels) {
            Ok(model) => model,
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    rows = features.nrows(),
                    error = %e,
                    "Training failed, returning no recommendations"
                );
                return Ok(Vec::new());
            }
        };

        let recommendations = Ranker::new().rank(candidates, &vectorizer, &model, count);

        info!(
            user_id = %user_id,
            source = training_set.source.as_str(),
            training_rows = features.nrows(),
            returned = recommendations.len(),
            "Recommendations computed"
        );

        Ok(recommendations)
    }
}

/// Split a labeled matrix into (features, labels); labels are the last column
fn split_label_column(matrix: &Array2<f64>) -> (Array2<f64>, Array1<f64>) {
    let width = matrix.ncols().saturating_sub(1);
    (
        matrix.slice(s![.., ..width]).to_owned(),
        matrix.column(width).to_owned(),
    )
}
