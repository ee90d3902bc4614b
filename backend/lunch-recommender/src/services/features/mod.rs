// ============================================
// Feature Space Module
// ============================================
// Builds the per-request feature index (one slot per normalized token,
// one slot per restaurant) and turns meals into binary feature vectors.

pub mod vectorizer;

pub use vectorizer::Vectorizer;

use crate::models::{Meal, Restaurant, RestaurantId};
use crate::services::normalizer::TextNormalizer;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Bijection from {token} ∪ {restaurant} to `0..width()`.
///
/// Tokens occupy `0..token_count()`, restaurants the range right after.
/// Rebuilt for every request; indices are only meaningful within one request.
#[derive(Debug, Clone, Default)]
pub struct FeatureIndex {
    tokens: HashMap<String, usize>,
    restaurants: HashMap<RestaurantId, usize>,
}

impl FeatureIndex {
    /// Index every token of the meal corpus, then every restaurant.
    ///
    /// Tokens are numbered in lexicographic order, restaurants in input order.
    pub fn build(normalizer: &TextNormalizer, meals: &[Meal], restaurants: &[Restaurant]) -> Self {
        let vocabulary: BTreeSet<String> = meals
            .iter()
            .flat_map(|meal| normalizer.normalize(&meal.name))
            .collect();

        let tokens: HashMap<String, usize> = vocabulary
            .into_iter()
            .enumerate()
            .map(|(i, token)| (token, i))
            .collect();

        let mut restaurant_slots = HashMap::new();
        for restaurant in restaurants {
            let next = tokens.len() + restaurant_slots.len();
            restaurant_slots.entry(restaurant.id).or_insert(next);
        }

        debug!(
            meals = meals.len(),
            tokens = tokens.len(),
            restaurants = restaurant_slots.len(),
            "Feature index built"
        );

        Self {
            tokens,
            restaurants: restaurant_slots,
        }
    }

    pub fn token_index(&self, token: &str) -> Option<usize> {
        self.tokens.get(token).copied()
    }

    pub fn restaurant_index(&self, restaurant_id: &RestaurantId) -> Option<usize> {
        self.restaurants.get(restaurant_id).copied()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn restaurant_count(&self) -> usize {
        self.restaurants.len()
    }

    /// Feature vector width (without a label column)
    pub fn width(&self) -> usize {
        self.tokens.len() + self.restaurants.len()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_token_and_restaurant_ranges_are_disjoint() {
        let normalizer = normalizer();
        let alpha = restaurant("Alpha");
        let beta = restaurant("Beta");
        let meals = vec![
            meal("Tomato soup", &alpha),
            meal("Fried cheese with fries", &beta),
        ];

        let index = FeatureIndex::build(&normalizer, &meals, &[alpha.clone(), beta.clone()]);

        // cheese, fry, soup, tomato
        assert_eq!(index.token_count(), 4);
        assert_eq!(index.restaurant_count(), 2);
        assert_eq!(index.width(), 6);
        assert_eq!(index.token_index("cheese"), Some(0));
        assert_eq!(index.token_index("tomato"), Some(3));
        assert_eq!(index.restaurant_index(&alpha.id), Some(4));
        assert_eq!(index.restaurant_index(&beta.id), Some(5));
    }

    #[test]
    fn test_duplicate_restaurants_get_one_slot() {
        let normalizer = normalizer();
        let alpha = restaurant("Alpha");

        let index = FeatureIndex::build(&normalizer, &[], &[alpha.clone(), alpha.clone()]);

        assert_eq!(index.width(), 1);
        assert_eq!(index.restaurant_index(&alpha.id), Some(0));
    }

    #[test]
    fn test_unknown_lookups() {
        let index = FeatureIndex::default();

        assert_eq!(index.token_index("soup"), None);
        assert_eq!(index.restaurant_index(&uuid::Uuid::new_v4()), None);
        assert_eq!(index.width(), 0);
    }
}
