//! Model Interpretability and Explainability.
//!
//! Tools for understanding what a fitted regressor relies on:
//!
//! - **Feature importances**: model-native MDI scores of a random forest,
//!   normalised into shares that sum to one.
//! - **SHAP (`SHapley` Additive exPlanations)**: exact interventional Shapley
//!   values for any [`Estimator`](crate::traits::Estimator) against a
//!   background sample.
//!
//! # Example
//!
//! ```
//! use adspend::prelude::*;
//! use adspend::interpret::{FeatureImportances, ShapExplainer};
//!
//! let x = Matrix::from_vec(6, 2, vec![
//!     1.0, 0.0,
//!     2.0, 1.0,
//!     3.0, 0.0,
//!     4.0, 1.0,
//!     5.0, 0.0,
//!     6.0, 1.0,
//! ]).unwrap();
//! let y = Vector::from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
//!
//! let mut forest = RandomForestRegressor::new(10, 42);
//! forest.fit(&x, &y).unwrap();
//!
//! let names = vec!["TV".to_string(), "Radio".to_string()];
//! let importances = FeatureImportances::from_forest(&names, &forest).unwrap();
//! assert_eq!(importances.ranked()[0].0, "TV");
//!
//! let explainer = ShapExplainer::new(&forest, &x, 100).unwrap();
//! let shap = explainer.explain_matrix(&x).unwrap();
//! assert_eq!(shap.mean_abs().len(), 2);
//! ```
//!
//! # References
//!
//! - Breiman, L. (2001). Random Forests. Machine Learning, 45(1).
//! - Lundberg, S. M., & Lee, S. I. (2017). A Unified Approach to Interpreting
//!   Model Predictions. `NeurIPS`.

mod shap;

pub use shap::{ShapExplainer, ShapValues};

use crate::error::{AdspendError, Result};
use crate::primitives::Vector;
use crate::tree::RandomForestRegressor;
use serde::Serialize;
use std::cmp::Ordering;

/// Trait for model explainers.
///
/// Explainers compute per-feature attributions for a single prediction.
pub trait Explainer {
    /// Explain a single prediction.
    ///
    /// Returns one contribution per feature where:
    /// - Positive values push the prediction above the baseline
    /// - Negative values push it below
    /// - Sum of contributions + `expected_value` = prediction
    ///
    /// # Errors
    ///
    /// Returns an error if the sample width does not match the model.
    fn explain(&self, sample: &Vector<f32>) -> Result<Vector<f32>>;

    /// Baseline prediction (mean model output over the background data).
    fn expected_value(&self) -> f32;
}

/// Normalised per-feature importance shares.
///
/// `values` sum to 1 for any forest that splits at least once. When the raw
/// scores sum to zero every share is NaN, which downstream consumers (the
/// budget optimizer in particular) must tolerate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportances {
    names: Vec<String>,
    values: Vec<f32>,
}

impl FeatureImportances {
    /// Reads the forest's MDI scores and divides each by their sum.
    ///
    /// # Errors
    ///
    /// Returns `NotFitted` for an unfitted forest and `DimensionMismatch`
    /// when `names` does not have one entry per feature.
    pub fn from_forest(names: &[String], forest: &RandomForestRegressor) -> Result<Self> {
        let scores = forest
            .feature_importances()
            .ok_or(AdspendError::NotFitted {
                component: "RandomForestRegressor",
            })?;
        Self::from_scores(names, &scores)
    }

    /// Normalises arbitrary non-negative scores by their sum.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` when lengths differ, `EmptyInput` for no
    /// features.
    pub fn from_scores(names: &[String], scores: &[f32]) -> Result<Self> {
        if names.len() != scores.len() {
            return Err(AdspendError::dimension_mismatch(
                "importance names",
                scores.len(),
                names.len(),
            ));
        }
        if scores.is_empty() {
            return Err(AdspendError::empty_input("no features to rank"));
        }

        let total: f32 = scores.iter().sum();
        if total == 0.0 {
            tracing::warn!("feature importances sum to zero; shares are undefined (NaN)");
        }
        let values = scores.iter().map(|&s| s / total).collect();
        Ok(Self {
            names: names.to_vec(),
            values,
        })
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Share of the named feature.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f32> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    /// True when the shares could not be normalised.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.values.iter().any(|v| !v.is_finite())
    }

    /// `(name, share)` pairs sorted by descending share; NaN sorts last and
    /// equal shares keep their column order.
    #[must_use]
    pub fn ranked(&self) -> Vec<(String, f32)> {
        let mut pairs: Vec<(String, f32)> = self
            .names
            .iter()
            .cloned()
            .zip(self.values.iter().copied())
            .collect();
        pairs.sort_by(|a, b| match (a.1.is_nan(), b.1.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => b.1.total_cmp(&a.1),
        });
        pairs
    }
}
