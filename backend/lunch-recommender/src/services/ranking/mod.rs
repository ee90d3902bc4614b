use crate::models::{Meal, RecommendedMeal};
use crate::services::classifier::RelevanceModel;
use crate::services::features::Vectorizer;
use crate::utils::clamp_probability;
use tracing::debug;

/// Ranking Layer - 以訓練好的模型為今日餐點打分
pub struct Ranker;

impl Default for Ranker {
    fn default() -> Self {
        Self::new()
    }
}

impl Ranker {
    pub fn new() -> Self {
        Self
    }

    /// Score every candidate, sort descending, keep the top `limit`.
    ///
    /// Equal scores keep their input order. An empty candidate list or a
    /// zero limit returns early without touching the model.
    pub fn rank<M>(
        &self,
        candidates: Vec<Meal>,
        vectorizer: &Vectorizer<'_>,
        model: &M,
        limit: usize,
    ) -> Vec<RecommendedMeal>
    where
        M: RelevanceModel + ?Sized,
    {
        if candidates.is_empty() || limit == 0 {
            return Vec::new();
        }

        let features = vectorizer.matrix(&candidates, None);
        let scores = model.predict_proba(features.view());

        let mut ranked: Vec<RecommendedMeal> = candidates
            .into_iter()
            .zip(scores.iter())
            .map(|(meal, &score)| RecommendedMeal {
                meal,
                score: clamp_probability(score),
            })
            .collect();

        // sort_by is stable, so ties keep candidate order
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(limit);

        debug!(returned = ranked.len(), limit = limit, "Candidates ranked");

        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::features::test_support::*;
    use crate::services::features::FeatureIndex;
    use ndarray::{Array1, ArrayView2};

    /// Scores each row by how many features it has set, scaled into [0, 1]
    struct FeatureCountModel;

    impl RelevanceModel for FeatureCountModel {
        fn predict_proba(&self, features: ArrayView2<f64>) -> Array1<f64> {
            features.rows().into_iter().map(|r| r.sum() / 10.0).collect()
        }
    }

    struct UnreachableModel;

    impl RelevanceModel for UnreachableModel {
        fn predict_proba(&self, _features: ArrayView2<f64>) -> Array1<f64> {
            panic!("model must not be invoked");
        }
    }

    #[test]
    fn test_rank_sorts_descending_and_truncates() {
        let normalizer = normalizer();
        let alpha = restaurant("Alpha");
        let meals = vec![
            meal("the a of", &alpha),
            meal("Fried cheese with tomato soup", &alpha),
            meal("Tomato soup", &alpha),
        ];
        let index = FeatureIndex::build(&normalizer, &meals, &[alpha]);
        let vectorizer = Vectorizer::new(&normalizer, &index);

        let ranked = Ranker::new().rank(meals.clone(), &vectorizer, &FeatureCountModel, 2);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].meal, meals[1]);
        assert_eq!(ranked[1].meal, meals[2]);
        assert!(ranked[0].score >= ranked[1].score);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let normalizer = normalizer();
        let alpha = restaurant("Alpha");
        let beta = restaurant("Beta");
        let meals = vec![meal("Tomato soup", &alpha), meal("Tomato soup", &beta)];
        let index = FeatureIndex::build(&normalizer, &meals, &[alpha, beta]);
        let vectorizer = Vectorizer::new(&normalizer, &index);

        let ranked = Ranker::new().rank(meals.clone(), &vectorizer, &FeatureCountModel, 5);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].meal, meals[0]);
        assert_eq!(ranked[1].meal, meals[1]);
    }

    #[test]
    fn test_empty_candidates_skip_model() {
        let normalizer = normalizer();
        let index = FeatureIndex::default();
        let vectorizer = Vectorizer::new(&normalizer, &index);

        let ranked = Ranker::new().rank(Vec::new(), &vectorizer, &UnreachableModel, 3);

        assert!(ranked.is_empty());
    }

    #[test]
    fn test_zero_limit_is_empty() {
        let normalizer = normalizer();
        let alpha = restaurant("Alpha");
        let meals = vec![meal("Tomato soup", &alpha)];
        let index = FeatureIndex::build(&normalizer, &meals, &[alpha]);
        let vectorizer = Vectorizer::new(&normalizer, &index);

        let ranked = Ranker::new().rank(meals, &vectorizer, &UnreachableModel, 0);

        assert!(ranked.is_empty());
    }
}
