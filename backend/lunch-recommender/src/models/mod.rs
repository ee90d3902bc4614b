use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;
pub type MealId = Uuid;
pub type RestaurantId = Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// A meal offered by a restaurant on a given day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Meal {
    pub id: MealId,
    pub name: String,
    #[serde(default)]
    pub price: Option<f64>,
    pub restaurant_id: RestaurantId,
    pub date: NaiveDate,
}

/// A user's pick of a meal. `recommended` marks picks made from a recommendation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Selection {
    pub user_id: UserId,
    pub meal_id: MealId,
    #[serde(default)]
    pub recommended: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendedMeal {
    pub meal: Meal,
    /// Calibrated probability of the meal being selected (0.0 - 1.0)
    pub score: f64,
}

/// Which selection history the training set was assembled from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TrainingSource {
    Personal,   // the requester's own non-recommended picks
    Population, // picks of every user (cold start)
}

impl TrainingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingSource::Personal => "personal",
            TrainingSource::Population => "population",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Selected,
    NotSelected,
}

impl Label {
    pub fn value(&self) -> f64 {
        match self {
            Label::Selected => 1.0,
            Label::NotSelected => 0.0,
        }
    }

    pub fn from_value(value: f64) -> Self {
        if value > 0.5 {
            Label::Selected
        } else {
            Label::NotSelected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_values() {
        assert_eq!(Label::Selected.value(), 1.0);
        assert_eq!(Label::NotSelected.value(), 0.0);
        assert_eq!(Label::from_value(1.0), Label::Selected);
        assert_eq!(Label::from_value(0.0), Label::NotSelected);
    }

    #[test]
    fn test_restaurant_enabled_defaults_to_true() {
        let restaurant: Restaurant = serde_json::from_str(
            r#"{"id": "67e55044-10b1-426f-9247-bb680e5fe0c8", "name": "Alpha"}"#,
        )
        .unwrap();

        assert!(restaurant.enabled);
    }

    #[test]
    fn test_meal_price_is_optional() {
        let meal: Meal = serde_json::from_str(
            r#"{
                "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
                "name": "Tomato soup",
                "restaurant_id": "7d444840-9dc0-11d1-b245-5ffdce74fad2",
                "date": "2024-03-04"
            }"#,
        )
        .unwrap();

        assert_eq!(meal.price, None);
        assert_eq!(meal.date, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
    }
}
