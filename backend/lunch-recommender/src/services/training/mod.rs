// ============================================
// Training Set Assembly (訓練集組裝)
// ============================================
//
// Positives: meals that were chosen. Negatives: meals offered on the same
// days that were not chosen.
//
// Paths:
// - Personal: the requester's own picks (recommended picks excluded)
// - Population: anyone's picks, used when the requester has too few
//
// Too few positives on both paths, or no negatives, is a normal outcome
// ("insufficient data") rather than an error.

pub mod balancer;

pub use balancer::{BalanceError, RandomUnderSampler};

use crate::models::{Meal, MealId, Selection, TrainingSource, UserId};
use crate::services::store::MealStore;
use crate::utils::dedup_preserving_order;
use anyhow::Result;
use chrono::NaiveDate;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info};

/// Why no training set could be produced
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InsufficientData {
    #[error("only {found} positive examples, {required} required")]
    TooFewPositives { found: usize, required: usize },

    #[error("no negative examples on the {} path", .path.as_str())]
    NoNegatives { path: TrainingSource },
}

#[derive(Debug, Clone)]
pub struct TrainingSet {
    pub source: TrainingSource,
    pub positives: Vec<Meal>,
    pub negatives: Vec<Meal>,
}

#[derive(Debug, Clone)]
pub enum AssemblyOutcome {
    Ready(TrainingSet),
    Insufficient(InsufficientData),
}

pub struct TrainingSetAssembler {
    min_positive_examples: usize,
}

impl TrainingSetAssembler {
    pub fn new(min_positive_examples: usize) -> Self {
        Self {
            min_positive_examples,
        }
    }

    pub fn min_positive_examples(&self) -> usize {
        self.min_positive_examples
    }

    /// Assemble positives/negatives for `user_id`, falling back to the
    /// population when the user's own history is too sparse.
    pub fn assemble<S>(&self, store: &S, user_id: UserId) -> Result<AssemblyOutcome>
    where
        S: MealStore + ?Sized,
    {
        let personal = self.personal_examples(store, user_id)?;
        if personal.positives.len() >= self.min_positive_examples {
            return Ok(Self::finish(personal));
        }

        debug!(
            user_id = %user_id,
            personal_positives = personal.positives.len(),
            required = self.min_positive_examples,
            "Personal history too sparse, using population selections"
        );

        let population = self.population_examples(store)?;
        if population.positives.len() < self.min_positive_examples {
            return Ok(AssemblyOutcome::Insufficient(
                InsufficientData::TooFewPositives {
                    found: population.positives.len(),
                    required: self.min_positive_examples,
                },
            ));
        }

        Ok(Self::finish(population))
    }

    /// The user's non-recommended picks vs. everything else offered those days
    fn personal_examples<S>(&self, store: &S, user_id: UserId) -> Result<TrainingSet>
    where
        S: MealStore + ?Sized,
    {
        let selections = store.user_selections(user_id, Some(false))?;
        Self::examples_from(store, &selections, TrainingSource::Personal)
    }

    /// Anything anyone picked vs. what nobody picked on those days
    fn population_examples<S>(&self, store: &S) -> Result<TrainingSet>
    where
        S: MealStore + ?Sized,
    {
        let selections = store.all_selections()?;
        Self::examples_from(store, &selections, TrainingSource::Population)
    }

    fn examples_from<S>(
        store: &S,
        selections: &[Selection],
        source: TrainingSource,
    ) -> Result<TrainingSet>
    where
        S: MealStore + ?Sized,
    {
        let selected_ids: Vec<MealId> =
            dedup_preserving_order(selections.iter().map(|s| s.meal_id));
        let positives = store.meals_by_ids(&selected_ids)?;

        let dates: Vec<NaiveDate> = dedup_preserving_order(positives.iter().map(|m| m.date));
        let selected: HashSet<MealId> = selected_ids.into_iter().collect();
        let negatives = if dates.is_empty() {
            Vec::new()
        } else {
            store
                .meals_on_dates(&dates)?
                .into_iter()
                .filter(|m| !selected.contains(&m.id))
                .collect()
        };

        Ok(TrainingSet {
            source,
            positives,
            negatives,
        })
    }

    fn finish(set: TrainingSet) -> AssemblyOutcome {
        if set.negatives.is_empty() {
            return AssemblyOutcome::Insufficient(InsufficientData::NoNegatives {
                path: set.source,
            });
        }

        info!(
            source = set.source.as_str(),
            positives = set.positives.len(),
            negatives = set.negatives.len(),
            "Training set assembled"
        );

        AssemblyOutcome::Ready(set)
    }
}
