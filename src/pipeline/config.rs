//! Pipeline configuration.

use crate::error::{AdspendError, Result};
use crate::model_selection::ForestParamGrid;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Every tunable of a pipeline run.
///
/// Missing fields in a JSON file fall back to [`Default`], so a config file
/// only needs the values it changes:
///
/// ```
/// use adspend::pipeline::PipelineConfig;
///
/// let config: PipelineConfig = serde_json::from_str(r#"{"random_state": 7}"#).unwrap();
/// assert_eq!(config.random_state, 7);
/// assert_eq!(config.target, "Sales");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Spend columns, in feature order
    pub channels: Vec<String>,
    /// Outcome column
    pub target: String,
    /// Held-out proportion
    pub test_size: f32,
    /// Seed for the split shuffle and every forest
    pub random_state: u64,
    /// Trees in the untuned baseline forest
    pub baseline_estimators: usize,
    /// Folds for the grid search
    pub cv_folds: usize,
    pub grid: ForestParamGrid,
    /// Budget redistributed by the optimizer
    pub total_budget: f64,
    /// Spend per channel in the "current" comparison budget
    pub current_spend_per_channel: f64,
    /// Background rows for the SHAP explainer
    pub shap_background: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            channels: vec!["TV".into(), "Radio".into(), "Newspaper".into()],
            target: "Sales".into(),
            test_size: 0.2,
            random_state: 42,
            baseline_estimators: 100,
            cv_folds: 5,
            grid: ForestParamGrid::default(),
            total_budget: 100_000.0,
            current_spend_per_channel: 33_333.0,
            shap_background: 100,
        }
    }
}

impl PipelineConfig {
    /// Reads and validates a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or fails
    /// [`validate`](Self::validate).
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        tracing::debug!(path = %path.as_ref().display(), "loaded pipeline config");
        Ok(config)
    }

    #[must_use]
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = random_state;
        self
    }

    #[must_use]
    pub fn with_test_size(mut self, test_size: f32) -> Self {
        self.test_size = test_size;
        self
    }

    #[must_use]
    pub fn with_cv_folds(mut self, cv_folds: usize) -> Self {
        self.cv_folds = cv_folds;
        self
    }

    #[must_use]
    pub fn with_total_budget(mut self, total_budget: f64) -> Self {
        self.total_budget = total_budget;
        self
    }

    #[must_use]
    pub fn with_grid(mut self, grid: ForestParamGrid) -> Self {
        self.grid = grid;
        self
    }

    #[must_use]
    pub fn with_baseline_estimators(mut self, n_estimators: usize) -> Self {
        self.baseline_estimators = n_estimators;
        self
    }

    #[must_use]
    pub fn with_shap_background(mut self, rows: usize) -> Self {
        self.shap_background = rows;
        self
    }

    /// Checks every field before any work starts.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field found.
    pub fn validate(&self) -> Result<()> {
        if self.channels.is_empty() {
            return Err(AdspendError::empty_input("no channel columns configured"));
        }
        let mut seen = HashSet::new();
        for channel in &self.channels {
            if !seen.insert(channel.as_str()) {
                return Err(AdspendError::DuplicateChannel {
                    channel: channel.clone(),
                });
            }
        }
        if seen.contains(self.target.as_str()) {
            return Err(format!("target column '{}' is also a channel", self.target).into());
        }
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(AdspendError::invalid_hyperparameter(
                "test_size",
                self.test_size,
                "a proportion strictly between 0 and 1",
            ));
        }
        if self.baseline_estimators == 0 {
            return Err(AdspendError::invalid_hyperparameter("baseline_estimators", 0, ">= 1"));
        }
        if self.cv_folds < 2 {
            return Err(AdspendError::invalid_hyperparameter("cv_folds", self.cv_folds, ">= 2"));
        }
        self.grid.validate()?;
        for (param, value) in [
            ("total_budget", self.total_budget),
            ("current_spend_per_channel", self.current_spend_per_channel),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AdspendError::invalid_hyperparameter(param, value, "a finite amount >= 0"));
            }
        }
        if self.shap_background == 0 {
            return Err(AdspendError::invalid_hyperparameter("shap_background", 0, ">= 1"));
        }
        Ok(())
    }
}
