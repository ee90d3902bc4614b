// ============================================
// Meal Store (資料查詢邊界)
// ============================================
//
// The recommender never owns persistence. Everything it needs from the
// surrounding system goes through `MealStore`; `InMemoryMealStore` serves
// snapshots and tests.

use crate::models::{Meal, MealId, Restaurant, Selection, UserId};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Query capability over meals, selections and restaurants
pub trait MealStore: Send + Sync {
    /// Whole meal corpus (every day, every restaurant)
    fn all_meals(&self) -> Result<Vec<Meal>>;

    fn meals_by_ids(&self, ids: &[MealId]) -> Result<Vec<Meal>>;

    /// Meals offered on any of the given dates
    fn meals_on_dates(&self, dates: &[NaiveDate]) -> Result<Vec<Meal>>;

    /// Candidates for a single day
    fn meals_for_date(&self, date: NaiveDate) -> Result<Vec<Meal>>;

    /// A user's selections, optionally filtered by the `recommended` flag
    fn user_selections(&self, user_id: UserId, recommended: Option<bool>)
        -> Result<Vec<Selection>>;

    fn all_selections(&self) -> Result<Vec<Selection>>;

    fn enabled_restaurants(&self) -> Result<Vec<Restaurant>>;
}

/// Serialized form of a store: `{ "restaurants": [...], "meals": [...], "selections": [...] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub restaurants: Vec<Restaurant>,
    #[serde(default)]
    pub meals: Vec<Meal>,
    #[serde(default)]
    pub selections: Vec<Selection>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryMealStore {
    restaurants: Vec<Restaurant>,
    meals: Vec<Meal>,
    selections: Vec<Selection>,
}

impl InMemoryMealStore {
    pub fn new(restaurants: Vec<Restaurant>, meals: Vec<Meal>, selections: Vec<Selection>) -> Self {
        Self {
            restaurants,
            meals,
            selections,
        }
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self::new(snapshot.restaurants, snapshot.meals, snapshot.selections)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let snapshot: Snapshot = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid snapshot {}", path.display()))?;
        Ok(Self::from_snapshot(snapshot))
    }

    pub fn add_restaurant(&mut self, restaurant: Restaurant) {
        self.restaurants.push(restaurant);
    }

    pub fn add_meal(&mut self, meal: Meal) {
        self.meals.push(meal);
    }

    pub fn add_selection(&mut self, selection: Selection) {
        self.selections.push(selection);
    }

    fn meals_matching<F>(&self, predicate: F) -> Vec<Meal>
    where
        F: Fn(&Meal) -> bool,
    {
        self.meals.iter().filter(|m| predicate(m)).cloned().collect()
    }
}

impl MealStore for InMemoryMealStore {
    fn all_meals(&self) -> Result<Vec<Meal>> {
        Ok(self.meals.clone())
    }

    fn meals_by_ids(&self, ids: &[MealId]) -> Result<Vec<Meal>> {
        let ids: HashSet<&MealId> = ids.iter().collect();
        Ok(self.meals_matching(|m| ids.contains(&m.id)))
    }

    fn meals_on_dates(&self, dates: &[NaiveDate]) -> Result<Vec<Meal>> {
        let dates: HashSet<&NaiveDate> = dates.iter().collect();
        Ok(self.meals_matching(|m| dates.contains(&m.date)))
    }

    fn meals_for_date(&self, date: NaiveDate) -> Result<Vec<Meal>> {
        Ok(self.meals_matching(|m| m.date == date))
    }

    fn user_selections(
        &self,
        user_id: UserId,
        recommended: Option<bool>,
    ) -> Result<Vec<Selection>> {
        Ok(self
            .selections
            .iter()
            .filter(|s| s.user_id == user_id)
            .filter(|s| recommended.map_or(true, |flag| s.recommended == flag))
            .cloned()
            .collect())
    }

    fn all_selections(&self) -> Result<Vec<Selection>> {
        Ok(self.selections.clone())
    }

    fn enabled_restaurants(&self) -> Result<Vec<Restaurant>> {
        Ok(self
            .restaurants
            .iter()
            .filter(|r| r.enabled)
            .cloned()
            .collect())
    }
}
