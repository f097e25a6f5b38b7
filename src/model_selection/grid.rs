//! Exhaustive cross-validated search over random forest hyperparameters.

use super::{cross_validate, KFold};
use crate::error::{AdspendError, Result};
use crate::primitives::{Matrix, Vector};
use crate::traits::Estimator;
use crate::tree::{MaxFeatures, RandomForestRegressor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One point of the forest search space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
}

impl ForestParams {
    /// Builds an unfitted forest with these hyperparameters.
    #[must_use]
    pub fn build(&self, random_state: u64) -> RandomForestRegressor {
        RandomForestRegressor::new(self.n_estimators, random_state)
            .with_max_depth(self.max_depth)
            .with_min_samples_split(self.min_samples_split)
            .with_min_samples_leaf(self.min_samples_leaf)
            .with_max_features(self.max_features)
    }
}

impl fmt::Display for ForestParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let depth = self
            .max_depth
            .map_or_else(|| "None".to_string(), |d| d.to_string());
        write!(
            f,
            "max_depth={depth}, max_features={}, min_samples_leaf={}, min_samples_split={}, n_estimators={}",
            self.max_features, self.min_samples_leaf, self.min_samples_split, self.n_estimators
        )
    }
}

/// Candidate values for every forest hyperparameter.
///
/// Configurations are enumerated with the keys in alphabetical order and the
/// last key varying fastest: `n_estimators` changes on every step,
/// `max_depth` on the slowest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParamGrid {
    pub n_estimators: Vec<usize>,
    pub max_depth: Vec<Option<usize>>,
    pub min_samples_split: Vec<usize>,
    pub min_samples_leaf: Vec<usize>,
    pub max_features: Vec<MaxFeatures>,
}

impl Default for ForestParamGrid {
    /// The full 3 × 3 × 3 × 4 × 3 = 324 configuration grid.
    fn default() -> Self {
        Self {
            n_estimators: vec![50, 100, 200],
            max_depth: vec![Some(5), Some(10), None],
            min_samples_split: vec![2, 5, 10],
            min_samples_leaf: vec![1, 2, 4, 8],
            max_features: vec![MaxFeatures::Sqrt, MaxFeatures::Log2, MaxFeatures::All],
        }
    }
}

impl ForestParamGrid {
    /// A 16-configuration grid for smoke runs.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            n_estimators: vec![10, 25],
            max_depth: vec![Some(4), None],
            min_samples_split: vec![2],
            min_samples_leaf: vec![1, 2],
            max_features: vec![MaxFeatures::Sqrt, MaxFeatures::All],
        }
    }

    /// Number of configurations (product of the option counts).
    #[must_use]
    pub fn len(&self) -> usize {
        self.n_estimators.len()
            * self.max_depth.len()
            * self.min_samples_split.len()
            * self.min_samples_leaf.len()
            * self.max_features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks every option list is non-empty and every value is usable.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        fn non_empty<T>(param: &str, values: &[T]) -> Result<()> {
            if values.is_empty() {
                return Err(AdspendError::invalid_hyperparameter(
                    param,
                    "[]",
                    "at least one candidate value",
                ));
            }
            Ok(())
        }

        non_empty("n_estimators", &self.n_estimators)?;
        non_empty("max_depth", &self.max_depth)?;
        non_empty("min_samples_split", &self.min_samples_split)?;
        non_empty("min_samples_leaf", &self.min_samples_leaf)?;
        non_empty("max_features", &self.max_features)?;

        if let Some(&bad) = self.n_estimators.iter().find(|&&n| n == 0) {
            return Err(AdspendError::invalid_hyperparameter("n_estimators", bad, ">= 1"));
        }
        if self.max_depth.contains(&Some(0)) {
            return Err(AdspendError::invalid_hyperparameter("max_depth", 0, ">= 1 or None"));
        }
        if let Some(&bad) = self.min_samples_split.iter().find(|&&n| n < 2) {
            return Err(AdspendError::invalid_hyperparameter("min_samples_split", bad, ">= 2"));
        }
        if let Some(&bad) = self.min_samples_leaf.iter().find(|&&n| n == 0) {
            return Err(AdspendError::invalid_hyperparameter("min_samples_leaf", bad, ">= 1"));
        }
        Ok(())
    }

    /// Configuration at position `index` of the enumeration order.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<ForestParams> {
        if index >= self.len() {
            return None;
        }
        let mut rest = index;
        let mut take = |n: usize| {
            let i = rest % n;
            rest /= n;
            i
        };
        let n_estimators = self.n_estimators[take(self.n_estimators.len())];
        let min_samples_split = self.min_samples_split[take(self.min_samples_split.len())];
        let min_samples_leaf = self.min_samples_leaf[take(self.min_samples_leaf.len())];
        let max_features = self.max_features[take(self.max_features.len())];
        let max_depth = self.max_depth[take(self.max_depth.len())];
        Some(ForestParams {
            n_estimators,
            max_depth,
            min_samples_split,
            min_samples_leaf,
            max_features,
        })
    }

    /// Every configuration in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = ForestParams> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }
}

/// Cross-validation outcome of one configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridCandidate {
    pub params: ForestParams,
    pub mean_score: f32,
    pub std_score: f32,
}

/// Result of [`ForestGridSearch::fit`].
#[derive(Debug, Clone, Serialize)]
pub struct GridSearchResult {
    /// Configuration with the highest mean CV R²
    pub best_params: ForestParams,
    /// Its mean CV R²
    pub best_score: f32,
    /// Forest refit on all training rows with `best_params`
    #[serde(skip)]
    pub best_model: RandomForestRegressor,
    /// Every configuration in enumeration order
    pub candidates: Vec<GridCandidate>,
}

/// Exhaustive grid search scored by mean K-fold R².
///
/// Ties keep the configuration enumerated first. Every forest (fold models
/// and the final refit) is seeded with the same `random_state`.
#[derive(Debug, Clone)]
pub struct ForestGridSearch {
    grid: ForestParamGrid,
    cv: KFold,
    random_state: u64,
}

impl ForestGridSearch {
    #[must_use]
    pub fn new(grid: ForestParamGrid, cv: KFold, random_state: u64) -> Self {
        Self {
            grid,
            cv,
            random_state,
        }
    }

    #[must_use]
    pub fn grid(&self) -> &ForestParamGrid {
        &self.grid
    }

    /// Scores every configuration on `(x, y)` and refits the winner on all
    /// of it.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid grid or folds, a failing fit, or when
    /// no configuration produces a finite score.
    pub fn fit(&self, x: &Matrix<f32>, y: &Vector<f32>) -> Result<GridSearchResult> {
        self.grid.validate()?;
        tracing::info!(
            configurations = self.grid.len(),
            folds = self.cv.n_splits(),
            "starting forest grid search"
        );

        let mut candidates = Vec::with_capacity(self.grid.len());
        let mut best: Option<(ForestParams, f32)> = None;
        for params in self.grid.iter() {
            let cv_result = cross_validate(&params.build(self.random_state), x, y, &self.cv)?;
            let mean_score = cv_result.mean();
            tracing::debug!(%params, mean_score, "scored configuration");

            let improves = match best {
                None => !mean_score.is_nan(),
                Some((_, best_score)) => mean_score > best_score,
            };
            if improves {
                best = Some((params, mean_score));
            }
            candidates.push(GridCandidate {
                params,
                mean_score,
                std_score: cv_result.std(),
            });
        }

        let (best_params, best_score) = best.ok_or_else(|| {
            AdspendError::Other("no configuration produced a finite CV score".into())
        })?;

        let mut best_model = best_params.build(self.random_state);
        best_model.fit(x, y)?;
        tracing::info!(%best_params, best_score, "grid search finished");

        Ok(GridSearchResult {
            best_params,
            best_score,
            best_model,
            candidates,
        })
    }
}

#[cfg(test)]
#[path = "grid_tests.rs"]
mod tests;
