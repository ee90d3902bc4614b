pub mod classifier;
pub mod features;
pub mod normalizer;
pub mod ranking;
pub mod recommender;
pub mod store;
pub mod training;

pub use classifier::{CalibratedClassifier, RelevanceModel, Trainer};
pub use features::{FeatureIndex, Vectorizer};
pub use normalizer::{LemmaDictionary, Lemmatizer, StopwordList, TextNormalizer};
pub use ranking::Ranker;
pub use recommender::{RecommendationEngine, RecommenderError};
pub use store::{InMemoryMealStore, MealStore, Snapshot};
pub use training::{RandomUnderSampler, TrainingSetAssembler};
