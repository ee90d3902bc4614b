pub mod config;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use models::{Meal, RecommendedMeal, Restaurant, Selection};
pub use services::{
    InMemoryMealStore, LemmaDictionary, MealStore, RecommendationEngine, RecommenderError,
    StopwordList, TextNormalizer,
};
