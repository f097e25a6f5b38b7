//! Serializable summary of a pipeline run.

use crate::budget::{BudgetAllocation, BudgetComparison, OptimizedBudget};
use crate::data::{write_csv, DataFrame, LabelColumn};
use crate::eda::EdaReport;
use crate::error::Result;
use crate::experiment::AbExperiment;
use crate::interpret::FeatureImportances;
use crate::metrics::RegressionMetrics;
use crate::model_selection::ForestParams;
use serde::Serialize;
use std::path::Path;

/// Test-set metrics per model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelComparison {
    pub linear_regression: RegressionMetrics,
    pub random_forest: RegressionMetrics,
    pub tuned_random_forest: RegressionMetrics,
}

/// Grid-search outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TuningSummary {
    pub best_params: ForestParams,
    pub best_cv_score: f32,
    pub configurations: usize,
}

/// Global SHAP attributions over the test partition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapSummary {
    pub expected_value: f32,
    /// Mean |SHAP| per channel, in channel order
    pub mean_abs: Vec<f32>,
}

/// Budget optimisation and the sales it is predicted to bring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetSummary {
    pub current: BudgetAllocation,
    pub optimized: OptimizedBudget,
    pub predicted_sales: BudgetComparison,
}

/// Every console summary of a run, plus the warnings raised on the way.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub eda: EdaReport,
    pub n_train: usize,
    pub n_test: usize,
    pub metrics: ModelComparison,
    pub tuning: TuningSummary,
    pub importances: FeatureImportances,
    pub shap: ShapSummary,
    pub budget: BudgetSummary,
    pub ab_test: AbExperiment,
    pub warnings: Vec<String>,
}

/// The cleaned frame with its A/B label columns.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledFrame {
    pub frame: DataFrame,
    pub labels: Vec<LabelColumn>,
}

impl LabeledFrame {
    /// Writes numeric columns then label columns, without an index.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        write_csv(path, &self.frame, &self.labels)
    }
}

/// Result of [`Pipeline::run`](super::Pipeline::run).
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub report: PipelineReport,
    pub labeled: LabeledFrame,
}
