//! Regression trees and the random forest ensemble.
//!
//! - CART regression trees grown by variance reduction
//! - Random Forest with bootstrap bagging and per-split feature subsampling
//! - Mean-decrease-in-impurity (MDI) feature importances
//!
//! Every random draw comes from a `StdRng` seeded by the caller's
//! `random_state`, so equal seeds give identical trees.
//!
//! # Example
//!
//! ```
//! use adspend::prelude::*;
//! use adspend::tree::{MaxFeatures, RandomForestRegressor};
//!
//! let x = Matrix::from_vec(8, 1, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]).unwrap();
//! let y = Vector::from_slice(&[1.0, 1.0, 1.0, 1.0, 5.0, 5.0, 5.0, 5.0]);
//!
//! let mut rf = RandomForestRegressor::new(20, 42)
//!     .with_max_depth(Some(3))
//!     .with_max_features(MaxFeatures::All);
//! rf.fit(&x, &y).unwrap();
//! assert!(rf.score(&x, &y).unwrap() > 0.8);
//! ```

mod helpers;
mod random_forest;

pub use random_forest::RandomForestRegressor;

use crate::error::{AdspendError, Result};
use crate::primitives::{Matrix, Vector};
use crate::traits::Estimator;
use helpers::GrowthLimits;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of features considered at each split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaxFeatures {
    /// `max(1, floor(sqrt(n_features)))`
    Sqrt,
    /// `max(1, floor(log2(n_features)))`
    Log2,
    /// Every feature.
    All,
}

impl MaxFeatures {
    /// Resolves to a concrete feature count for `n_features` columns.
    #[must_use]
    pub fn resolve(self, n_features: usize) -> usize {
        let n = n_features as f64;
        let k = match self {
            Self::Sqrt => n.sqrt().floor() as usize,
            Self::Log2 if n_features > 0 => n.log2().floor() as usize,
            Self::Log2 => 0,
            Self::All => n_features,
        };
        k.clamp(1, n_features.max(1))
    }
}

impl fmt::Display for MaxFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sqrt => "sqrt",
            Self::Log2 => "log2",
            Self::All => "all",
        };
        f.write_str(name)
    }
}

/// Leaf node in a regression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionLeaf {
    /// Predicted value (mean of the training targets that reached the leaf)
    pub value: f32,
    /// Number of training samples in this leaf
    pub n_samples: usize,
}

/// Internal node in a regression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionNode {
    /// Index of the feature to split on
    pub feature_idx: usize,
    /// Samples with `feature <= threshold` go left
    pub threshold: f32,
    /// Training samples that reached this node
    pub n_samples: usize,
    /// Summed squared error removed by this split
    pub impurity_decrease: f32,
    /// Left subtree
    pub left: Box<RegressionTreeNode>,
    /// Right subtree
    pub right: Box<RegressionTreeNode>,
}

/// A node in a regression tree (either internal node or leaf).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RegressionTreeNode {
    /// Internal decision node with split condition
    Node(RegressionNode),
    /// Leaf node with value prediction
    Leaf(RegressionLeaf),
}

impl RegressionTreeNode {
    /// Returns the depth of the tree rooted at this node.
    ///
    /// Leaf nodes have depth 0, internal nodes have depth 1 + max(left, right).
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf(_) => 0,
            Self::Node(node) => 1 + node.left.depth().max(node.right.depth()),
        }
    }

    /// Number of leaves below (and including) this node.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Node(node) => node.left.n_leaves() + node.right.n_leaves(),
        }
    }

    fn predict_one(&self, row: &[f32]) -> f32 {
        let mut node = self;
        loop {
            match node {
                Self::Leaf(leaf) => return leaf.value,
                Self::Node(n) => {
                    node = if row[n.feature_idx] <= n.threshold {
                        &n.left
                    } else {
                        &n.right
                    };
                }
            }
        }
    }
}

/// Decision tree regressor using the CART algorithm.
///
/// Splits minimise the summed squared error of the children; leaves
/// predict the mean target. With `max_features` below the column count,
/// each split looks at a random feature subset drawn from `random_state`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeRegressor {
    tree: Option<RegressionTreeNode>,
    n_features: usize,
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
    max_features: MaxFeatures,
    random_state: u64,
}

impl Default for DecisionTreeRegressor {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTreeRegressor {
    /// Creates an unlimited-depth tree considering every feature, seed 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: None,
            n_features: 0,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            random_state: 0,
        }
    }

    /// Sets the maximum depth (`None` grows until leaves are pure).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the minimum number of samples required to split a node.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    /// Sets the minimum number of samples each leaf must keep.
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

    /// Sets the seed for per-split feature subsampling.
    #[must_use]
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = random_state;
        self
    }

    /// Root of the fitted tree.
    #[must_use]
    pub fn tree(&self) -> Option<&RegressionTreeNode> {
        self.tree.as_ref()
    }

    /// Depth of the fitted tree.
    #[must_use]
    pub fn depth(&self) -> Option<usize> {
        self.tree.as_ref().map(RegressionTreeNode::depth)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.max_depth == Some(0) {
            return Err(AdspendError::invalid_hyperparameter("max_depth", 0, ">= 1 or None"));
        }
        if self.min_samples_split < 2 {
            return Err(AdspendError::invalid_hyperparameter(
                "min_samples_split",
                self.min_samples_split,
                ">= 2",
            ));
        }
        if self.min_samples_leaf < 1 {
            return Err(AdspendError::invalid_hyperparameter(
                "min_samples_leaf",
                self.min_samples_leaf,
                ">= 1",
            ));
        }
        Ok(())
    }

    /// Grows the tree on `rows` of `(x, y)`; rows may repeat.
    pub(crate) fn fit_rows(
        &mut self,
        x: &Matrix<f32>,
        y: &Vector<f32>,
        rows: &[usize],
        rng: &mut StdRng,
    ) -> Result<()> {
        self.validate()?;
        if rows.is_empty() {
            return Err(AdspendError::empty_input("cannot grow a tree on zero rows"));
        }
        let limits = GrowthLimits {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: self.max_features.resolve(x.n_cols()),
        };
        self.n_features = x.n_cols();
        self.tree = Some(helpers::build_regression_tree(
            x,
            y.as_slice(),
            rows,
            0,
            &limits,
            rng,
        ));
        Ok(())
    }

    /// MDI importances normalised to sum to 1, or all zeros for a stump.
    #[must_use]
    pub fn feature_importances(&self) -> Option<Vec<f32>> {
        let tree = self.tree.as_ref()?;
        let mut importances = vec![0.0; self.n_features];
        helpers::accumulate_impurity_decrease(tree, &mut importances);
        let total: f32 = importances.iter().sum();
        if total > 0.0 {
            importances.iter_mut().for_each(|v| *v /= total);
        }
        Some(importances)
    }

    pub(crate) fn predict_row(&self, row: &[f32]) -> Result<f32> {
        let tree = self.tree.as_ref().ok_or(AdspendError::NotFitted {
            component: "DecisionTreeRegressor",
        })?;
        Ok(tree.predict_one(row))
    }
}

pub(crate) fn check_fit_input(x: &Matrix<f32>, y: &Vector<f32>) -> Result<()> {
    if x.n_rows() != y.len() {
        return Err(AdspendError::dimension_mismatch(
            "target length",
            x.n_rows(),
            y.len(),
        ));
    }
    if x.n_rows() == 0 || x.n_cols() == 0 {
        return Err(AdspendError::empty_input("cannot fit a tree on empty data"));
    }
    Ok(())
}

pub(crate) fn check_predict_width(x: &Matrix<f32>, n_features: usize) -> Result<()> {
    if x.n_cols() != n_features {
        return Err(AdspendError::dimension_mismatch(
            "features",
            n_features,
            x.n_cols(),
        ));
    }
    Ok(())
}

impl Estimator for DecisionTreeRegressor {
    fn fit(&mut self, x: &Matrix<f32>, y: &Vector<f32>) -> Result<()> {
        check_fit_input(x, y)?;
        let rows: Vec<usize> = (0..x.n_rows()).collect();
        let mut rng = StdRng::seed_from_u64(self.random_state);
        self.fit_rows(x, y, &rows, &mut rng)
    }

    fn predict(&self, x: &Matrix<f32>) -> Result<Vector<f32>> {
        let tree = self.tree.as_ref().ok_or(AdspendError::NotFitted {
            component: "DecisionTreeRegressor",
        })?;
        check_predict_width(x, self.n_features)?;
        Ok(Vector::from_vec(
            (0..x.n_rows())
                .map(|i| tree.predict_one(x.row_slice(i)))
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests;
