//! Meal Vectorizer
//!
//! Converts meals into fixed-width binary feature vectors using a `FeatureIndex`.
//!
//! Layout: [token bits (token_count), restaurant bits (restaurant_count), label?]

use super::FeatureIndex;
use crate::models::{Label, Meal};
use crate::services::normalizer::TextNormalizer;
use ndarray::{Array1, Array2};
use std::collections::BTreeSet;
use tracing::debug;

pub struct Vectorizer<'a> {
    normalizer: &'a TextNormalizer,
    index: &'a FeatureIndex,
}

impl<'a> Vectorizer<'a> {
    pub fn new(normalizer: &'a TextNormalizer, index: &'a FeatureIndex) -> Self {
        Self { normalizer, index }
    }

    pub fn index(&self) -> &FeatureIndex {
        self.index
    }

    /// Positions set to 1 for this meal: its restaurant and every known token
    pub fn active_features(&self, meal: &Meal) -> BTreeSet<usize> {
        let mut active = BTreeSet::new();

        match self.index.restaurant_index(&meal.restaurant_id) {
            Some(slot) => {
                active.insert(slot);
            }
            None => debug!(
                meal_id = %meal.id,
                restaurant_id = %meal.restaurant_id,
                "Restaurant not in feature index, skipping restaurant bit"
            ),
        }

        for token in self.normalizer.normalize(&meal.name) {
            if let Some(slot) = self.index.token_index(&token) {
                active.insert(slot);
            }
        }

        active
    }

    pub fn vectorize(&self, meal: &Meal) -> Array1<f64> {
        let mut vector = Array1::zeros(self.index.width());
        for slot in self.active_features(meal) {
            vector[slot] = 1.0;
        }
        vector
    }

    /// One row per meal. With a label, a trailing column holds it for every row.
    pub fn matrix(&self, meals: &[Meal], label: Option<Label>) -> Array2<f64> {
        let width = self.index.width();
        let columns = width + usize::from(label.is_some());
        let mut matrix = Array2::zeros((meals.len(), columns));

        for (row, meal) in meals.iter().enumerate() {
            for slot in self.active_features(meal) {
                matrix[[row, slot]] = 1.0;
            }
        }

        if let Some(label) = label {
            matrix.column_mut(width).fill(label.value());
        }

        matrix
    }
}
