//! End-to-end advertising-spend analysis.
//!
//! [`Pipeline::run`] takes a loaded [`RawFrame`] through cleaning, the
//! train/test split, scaling, training, evaluation, tuning, importances,
//! SHAP, budget optimisation, prediction and the A/B split. Each stage
//! returns a new value; nothing earlier is mutated.
//!
//! # Example
//!
//! ```no_run
//! use adspend::pipeline::{Pipeline, PipelineConfig};
//!
//! let pipeline = Pipeline::new(PipelineConfig::default().with_random_state(7));
//! let outcome = pipeline.run_files("advertising.csv", "cleaned_advertising.csv").unwrap();
//! println!("best params: {}", outcome.report.tuning.best_params);
//! ```

mod config;
mod report;

pub use config::PipelineConfig;
pub use report::{
    BudgetSummary, LabeledFrame, ModelComparison, PipelineOutcome, PipelineReport, ShapSummary,
    TuningSummary,
};

use crate::budget::{BudgetAllocation, BudgetOptimizer, SalesPredictor};
use crate::data::{read_csv, RawFrame};
use crate::eda::EdaReport;
use crate::error::{AdspendError, Result};
use crate::experiment::AbSimulator;
use crate::interpret::{FeatureImportances, ShapExplainer};
use crate::linear_model::LinearRegression;
use crate::metrics::evaluate;
use crate::model_selection::{train_test_split, ForestGridSearch, KFold};
use crate::preprocessing::StandardScaler;
use crate::traits::{Estimator, Transformer};
use crate::tree::RandomForestRegressor;
use std::path::Path;

/// Runs the full analysis with one configuration.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Loads `input`, runs the analysis and writes the labelled frame to
    /// `output`.
    ///
    /// # Errors
    ///
    /// Returns any load, analysis or write failure.
    pub fn run_files(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<PipelineOutcome> {
        let raw = read_csv(input)?;
        let outcome = self.run(&raw)?;
        outcome.labeled.write_csv(output.as_ref())?;
        tracing::info!(
            path = %output.as_ref().display(),
            rows = outcome.labeled.frame.n_rows(),
            "saved cleaned data with A/B test groups"
        );
        Ok(outcome)
    }

    /// Runs every stage after loading.
    ///
    /// # Errors
    ///
    /// Fails fast on an invalid config, missing columns, too few rows, or
    /// any shape error. Numeric degeneracies become report warnings.
    pub fn run(&self, raw: &RawFrame) -> Result<PipelineOutcome> {
        let cfg = &self.config;
        cfg.validate()?;

        let channel_refs: Vec<&str> = cfg.channels.iter().map(String::as_str).collect();
        let mut required = channel_refs.clone();
        required.push(cfg.target.as_str());
        raw.require_columns(&required)?;

        let mut warnings = Vec::new();

        // Cleaner
        let (clean, cleaning) = raw.clean();
        tracing::info!(
            rows_in = cleaning.rows_in,
            duplicates = cleaning.duplicates_removed,
            incomplete = cleaning.incomplete_removed,
            "cleaned dataset"
        );
        let frame = clean.into_dataframe()?;
        if frame.n_rows() < 2 {
            return Err(AdspendError::empty_input("fewer than two rows left after cleaning"));
        }
        let eda = EdaReport::from_frame(&frame, cleaning, &cfg.channels, &cfg.target)?;

        // Splitter
        let x = frame.select(&channel_refs)?.to_matrix()?;
        let y = frame.column(&cfg.target)?.clone();
        let (x_train, x_test, y_train, y_test) =
            train_test_split(&x, &y, cfg.test_size, cfg.random_state)?;
        tracing::info!(train = x_train.n_rows(), test = x_test.n_rows(), "split dataset");

        // Scaler: fitted on the training partition only
        let mut scaler = StandardScaler::new();
        let x_train_scaled = scaler.fit_transform(&x_train)?;
        let x_test_scaled = scaler.transform(&x_test)?;
        for j in scaler.zero_variance_features() {
            warnings.push(format!(
                "channel '{}' has zero variance in the training data; it is centred but not scaled",
                cfg.channels[j]
            ));
        }

        // Trainer + Evaluator
        let mut linear = LinearRegression::new();
        linear.fit(&x_train_scaled, &y_train)?;
        let mut forest = RandomForestRegressor::new(cfg.baseline_estimators, cfg.random_state);
        forest.fit(&x_train_scaled, &y_train)?;
        let linear_metrics = evaluate(&linear, &x_test_scaled, &y_test)?;
        let forest_metrics = evaluate(&forest, &x_test_scaled, &y_test)?;
        tracing::info!(
            linear_r2 = linear_metrics.r2,
            forest_r2 = forest_metrics.r2,
            "evaluated baseline models"
        );

        // Tuner
        let search = ForestGridSearch::new(cfg.grid.clone(), KFold::new(cfg.cv_folds), cfg.random_state);
        let tuned = search.fit(&x_train_scaled, &y_train)?;
        let tuned_metrics = evaluate(&tuned.best_model, &x_test_scaled, &y_test)?;

        // Importance Analyzer
        let importances = FeatureImportances::from_forest(&cfg.channels, &tuned.best_model)?;
        if importances.is_degenerate() {
            warnings.push("feature importances sum to zero; shares are undefined".to_string());
        }

        // SHAP over the test partition, against the scaled training rows
        let explainer = ShapExplainer::new(&tuned.best_model, &x_train_scaled, cfg.shap_background)?;
        let shap_values = explainer.explain_matrix(&x_test_scaled)?;
        let shap = ShapSummary {
            expected_value: shap_values.expected_value,
            mean_abs: shap_values.mean_abs(),
        };

        // Budget Optimizer
        let optimized = BudgetOptimizer::new(cfg.total_budget).optimize(&importances)?;
        warnings.extend(optimized.diagnostics.iter().map(ToString::to_string));
        tracing::info!(allocation = %optimized.allocation, "optimized budget allocation");

        // Predictor
        let current = BudgetAllocation::new(
            cfg.channels
                .iter()
                .map(|c| (c.clone(), cfg.current_spend_per_channel)),
        )?;
        let predictor = SalesPredictor::new(cfg.channels.clone(), scaler, tuned.best_model)?;
        let predicted_sales = predictor.compare(&current, &optimized.allocation)?;
        tracing::info!(
            current = predicted_sales.current,
            optimized = predicted_sales.optimized,
            uplift = predicted_sales.uplift,
            "predicted sales"
        );

        // A/B Simulator
        let ab_test = AbSimulator::new(cfg.channels.clone(), cfg.target.clone()).run(&frame)?;
        for result in &ab_test.results {
            if result.a_mean.is_none() {
                warnings.push(format!("channel '{}': A/B group A is empty", result.channel));
            }
            if result.b_mean.is_none() {
                warnings.push(format!("channel '{}': A/B group B is empty", result.channel));
            }
        }
        let labels = ab_test.label_columns();

        let report = PipelineReport {
            eda,
            n_train: x_train.n_rows(),
            n_test: x_test.n_rows(),
            metrics: ModelComparison {
                linear_regression: linear_metrics,
                random_forest: forest_metrics,
                tuned_random_forest: tuned_metrics,
            },
            tuning: TuningSummary {
                best_params: tuned.best_params,
                best_cv_score: tuned.best_score,
                configurations: tuned.candidates.len(),
            },
            importances,
            shap,
            budget: BudgetSummary {
                current,
                optimized,
                predicted_sales,
            },
            ab_test,
            warnings,
        };

        Ok(PipelineOutcome {
            report,
            labeled: LabeledFrame { frame, labels },
        })
    }
}

#[cfg(test)]
mod tests;
