use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Prefix shared by every recommender environment variable
const ENV_PREFIX: &str = "RECOMMENDER_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment configuration: {0}")]
    Env(#[from] envy::Error),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub resources: ResourceConfig,
    pub recommender: RecommenderConfig,
}

/// Linguistic resources loaded once at engine construction
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    #[serde(default = "default_lemma_dictionary_path")]
    pub lemma_dictionary_path: PathBuf,
    #[serde(default = "default_stopwords_path")]
    pub stopwords_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommenderConfig {
    /// Positive examples needed before a training path is used
    #[serde(default = "default_min_positive_examples")]
    pub min_positive_examples: usize,
    /// Seed for undersampling and solver coordinate order
    #[serde(default)]
    pub random_seed: u64,
    #[serde(default = "default_calibration_folds")]
    pub calibration_folds: usize,
    #[serde(default = "default_svm_c")]
    pub svm_c: f64,
    #[serde(default = "default_svm_tolerance")]
    pub svm_tolerance: f64,
    #[serde(default = "default_svm_max_iter")]
    pub svm_max_iter: usize,
    #[serde(default = "default_count")]
    pub default_count: usize,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            min_positive_examples: default_min_positive_examples(),
            random_seed: 0,
            calibration_folds: default_calibration_folds(),
            svm_c: default_svm_c(),
            svm_tolerance: default_svm_tolerance(),
            svm_max_iter: default_svm_max_iter(),
            default_count: default_count(),
        }
    }
}

impl RecommenderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.calibration_folds < 2 {
            return Err(ConfigError::InvalidValue {
                field: "calibration_folds",
                reason: format!("must be at least 2, got {}", self.calibration_folds),
            });
        }
        if self.svm_c.is_nan() || self.svm_c <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "svm_c",
                reason: format!("must be positive, got {}", self.svm_c),
            });
        }
        if self.svm_tolerance.is_nan() || self.svm_tolerance <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "svm_tolerance",
                reason: format!("must be positive, got {}", self.svm_tolerance),
            });
        }
        if self.svm_max_iter == 0 {
            return Err(ConfigError::InvalidValue {
                field: "svm_max_iter",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = Config {
            resources: envy::prefixed(ENV_PREFIX).from_env()?,
            recommender: envy::prefixed(ENV_PREFIX).from_env()?,
        };
        config.recommender.validate()?;

        Ok(config)
    }

    /// Load from explicit `RECOMMENDER_*` pairs instead of the process environment
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)> + Clone,
    {
        let config = Config {
            resources: envy::prefixed(ENV_PREFIX).from_iter(vars.clone())?,
            recommender: envy::prefixed(ENV_PREFIX).from_iter(vars)?,
        };
        config.recommender.validate()?;

        Ok(config)
    }
}

fn default_lemma_dictionary_path() -> PathBuf {
    PathBuf::from("nlp_data/lemmas.tsv")
}

fn default_stopwords_path() -> PathBuf {
    PathBuf::from("nlp_data/stopwords-cs.txt")
}

fn default_min_positive_examples() -> usize {
    10
}

fn default_calibration_folds() -> usize {
    5
}

fn default_svm_c() -> f64 {
    1.0
}

fn default_svm_tolerance() -> f64 {
    1e-4
}

fn default_svm_max_iter() -> usize {
    1000
}

fn default_count() -> usize {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(Vec::new()).unwrap();

        assert_eq!(config.recommender.min_positive_examples, 10);
        assert_eq!(config.recommender.random_seed, 0);
        assert_eq!(config.recommender.calibration_folds, 5);
        assert_eq!(config.recommender.default_count, 10);
        assert_eq!(
            config.resources.stopwords_path,
            PathBuf::from("nlp_data/stopwords-cs.txt")
        );
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_vars(vars(&[
            ("RECOMMENDER_MIN_POSITIVE_EXAMPLES", "3"),
            ("RECOMMENDER_RANDOM_SEED", "42"),
            ("RECOMMENDER_SVM_C", "0.5"),
            ("RECOMMENDER_LEMMA_DICTIONARY_PATH", "/tmp/lemmas.tsv"),
        ]))
        .unwrap();

        assert_eq!(config.recommender.min_positive_examples, 3);
        assert_eq!(config.recommender.random_seed, 42);
        assert!((config.recommender.svm_c - 0.5).abs() < f64::EPSILON);
        assert_eq!(
            config.resources.lemma_dictionary_path,
            PathBuf::from("/tmp/lemmas.tsv")
        );
    }

    #[test]
    fn test_rejects_single_fold() {
        let result = Config::from_vars(vars(&[("RECOMMENDER_CALIBRATION_FOLDS", "1")]));

        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                field: "calibration_folds",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_unparseable_number() {
        let result = Config::from_vars(vars(&[("RECOMMENDER_SVM_MAX_ITER", "lots")]));

        assert!(matches!(result, Err(ConfigError::Env(_))));
    }
}
