//! Random forest regressor.

use super::helpers::bootstrap_sample;
use super::{check_fit_input, check_predict_width, DecisionTreeRegressor, MaxFeatures};
use crate::error::{AdspendError, Result};
use crate::primitives::{Matrix, Vector};
use crate::traits::Estimator;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Random Forest regressor: an average of bootstrap-trained CART trees.
///
/// Tree `i` draws its bootstrap rows and its per-split feature subsets from
/// one `StdRng` seeded with `random_state + i`.
///
/// # Example
///
/// ```
/// use adspend::prelude::*;
/// use adspend::tree::RandomForestRegressor;
///
/// let x = Matrix::from_vec(5, 1, vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
/// let y = Vector::from_slice(&[2.0, 4.0, 6.0, 8.0, 10.0]);
///
/// let mut rf = RandomForestRegressor::new(10, 7).with_max_depth(Some(5));
/// rf.fit(&x, &y).unwrap();
/// assert_eq!(rf.predict(&x).unwrap().len(), 5);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    trees: Vec<DecisionTreeRegressor>,
    n_features: usize,
    n_estimators: usize,
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
    max_features: MaxFeatures,
    bootstrap: bool,
    random_state: u64,
}

impl RandomForestRegressor {
    /// Creates a forest of `n_estimators` fully grown trees that consider
    /// every feature at each split.
    #[must_use]
    pub fn new(n_estimators: usize, random_state: u64) -> Self {
        Self {
            trees: Vec::new(),
            n_features: 0,
            n_estimators,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            bootstrap: true,
            random_state,
        }
    }

    /// Sets the maximum depth of each tree (`None` = unlimited).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the minimum samples required to split a node.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    /// Sets the minimum samples each leaf must keep.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    /// Sets how many features each split considers.
    #[must_use]
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Disables bagging when `false` (every tree sees all rows once).
    #[must_use]
    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    /// Number of trees requested.
    #[must_use]
    pub fn n_estimators(&self) -> usize {
        self.n_estimators
    }

    /// Seed the forest was built with.
    #[must_use]
    pub fn random_state(&self) -> u64 {
        self.random_state
    }

    /// Fitted trees (empty before `fit`).
    #[must_use]
    pub fn trees(&self) -> &[DecisionTreeRegressor] {
        &self.trees
    }

    /// Returns true once `fit` has succeeded.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    fn tree_template(&self) -> DecisionTreeRegressor {
        DecisionTreeRegressor::new()
            .with_max_depth(self.max_depth)
            .with_min_samples_split(self.min_samples_split)
            .with_min_samples_leaf(self.min_samples_leaf)
            .with_max_features(self.max_features)
    }

    /// Mean-decrease-in-impurity importances.
    ///
    /// Each tree's importances are normalised to sum to 1, averaged over the
    /// trees that split at least once, then renormalised. A forest of stumps
    /// yields all zeros. `None` before `fit`.
    #[must_use]
    pub fn feature_importances(&self) -> Option<Vec<f32>> {
        if self.trees.is_empty() {
            return None;
        }

        let mut total = vec![0.0_f32; self.n_features];
        let mut n_split_trees = 0_usize;
        for tree in &self.trees {
            let Some(importances) = tree.feature_importances() else {
                continue;
            };
            if importances.iter().sum::<f32>() > 0.0 {
                n_split_trees += 1;
                for (acc, v) in total.iter_mut().zip(&importances) {
                    *acc += v;
                }
            }
        }

        if n_split_trees > 0 {
            total.iter_mut().for_each(|v| *v /= n_split_trees as f32);
            let sum: f32 = total.iter().sum();
            if sum > 0.0 {
                total.iter_mut().for_each(|v| *v /= sum);
            }
        }
        Some(total)
    }
}

impl Estimator for RandomForestRegressor {
    /// Fits every tree on its own bootstrap sample.
    ///
    /// # Errors
    ///
    /// Returns an error on shape mismatch, empty data, or invalid
    /// hyperparameters.
    fn fit(&mut self, x: &Matrix<f32>, y: &Vector<f32>) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(AdspendError::invalid_hyperparameter("n_estimators", 0, ">= 1"));
        }
        check_fit_input(x, y)?;
        self.tree_template().validate()?;

        let n_samples = x.n_rows();
        let all_rows: Vec<usize> = (0..n_samples).collect();
        let mut trees = Vec::with_capacity(self.n_estimators);
        for i in 0..self.n_estimators {
            let mut rng = StdRng::seed_from_u64(self.random_state.wrapping_add(i as u64));
            let rows = if self.bootstrap {
                bootstrap_sample(n_samples, &mut rng)
            } else {
                all_rows.clone()
            };
            let mut tree = self.tree_template();
            tree.fit_rows(x, y, &rows, &mut rng)?;
            trees.push(tree);
        }

        self.trees = trees;
        self.n_features = x.n_cols();
        tracing::debug!(
            n_estimators = self.n_estimators,
            max_depth = ?self.max_depth,
            max_features = %self.max_features,
            "fitted random forest"
        );
        Ok(())
    }

    /// Averages the predictions of all trees.
    fn predict(&self, x: &Matrix<f32>) -> Result<Vector<f32>> {
        if self.trees.is_empty() {
            return Err(AdspendError::NotFitted {
                component: "RandomForestRegressor",
            });
        }
        check_predict_width(x, self.n_features)?;

        let n_trees = self.trees.len() as f32;
        let mut predictions = Vec::with_capacity(x.n_rows());
        for i in 0..x.n_rows() {
            let row = x.row_slice(i);
            let mut sum = 0.0;
            for tree in &self.trees {
                sum += tree.predict_row(row)?;
            }
            predictions.push(sum / n_trees);
        }
        Ok(Vector::from_vec(predictions))
    }
}

#[cfg(test)]
#[path = "random_forest_tests_regressor.rs"]
mod tests;
