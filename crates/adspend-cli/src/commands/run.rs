//! `adspend run`: the full analysis, from CSV in to labelled CSV out.

use crate::error::{CliError, Result};
use crate::output;
use adspend::model_selection::ForestParamGrid;
use adspend::pipeline::{Pipeline, PipelineConfig, PipelineReport};
use std::path::PathBuf;

/// Flags of `adspend run`; every override is optional.
#[derive(Debug, Default)]
pub(crate) struct RunOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub config: Option<PathBuf>,
    pub seed: Option<u64>,
    pub budget: Option<f64>,
    pub test_size: Option<f32>,
    pub folds: Option<usize>,
    pub quick_grid: bool,
}

impl RunOptions {
    /// Config file (or defaults) with command-line overrides applied on top.
    pub(crate) fn resolve_config(&self) -> Result<PipelineConfig> {
        let mut config = super::load_config(self.config.as_deref())?;
        if let Some(seed) = self.seed {
            config = config.with_random_state(seed);
        }
        if let Some(budget) = self.budget {
            config = config.with_total_budget(budget);
        }
        if let Some(test_size) = self.test_size {
            config = config.with_test_size(test_size);
        }
        if let Some(folds) = self.folds {
            config = config.with_cv_folds(folds);
        }
        if self.quick_grid {
            config = config.with_grid(ForestParamGrid::quick());
        }
        config
            .validate()
            .map_err(|e| CliError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }
}

pub(crate) fn run(options: &RunOptions, json: bool) -> Result<()> {
    super::require_file(&options.input)?;
    let config = options.resolve_config()?;
    tracing::debug!(configurations = config.grid.len(), "resolved configuration");

    let outcome = Pipeline::new(config).run_files(&options.input, &options.output)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.report)?);
    } else {
        print_report(&outcome.report);
        output::success(&format!(
            "Cleaned data with A/B test groups saved to {}",
            options.output.display()
        ));
    }
    Ok(())
}

fn print_report(report: &PipelineReport) {
    super::eda::print_report(&report.eda);

    output::section("Train/Test Split");
    output::kv("Training rows", report.n_train);
    output::kv("Test rows", report.n_test);

    output::section("Model Evaluation");
    for (name, metrics) in [
        ("Linear Regression", report.metrics.linear_regression),
        ("Random Forest", report.metrics.random_forest),
        ("Tuned Random Forest", report.metrics.tuned_random_forest),
    ] {
        output::kv(
            name,
            format!(
                "R²={:.4}, MAE={:.4}, RMSE={:.4}",
                metrics.r2, metrics.mae, metrics.rmse
            ),
        );
    }

    output::section("Hyperparameter Tuning");
    output::kv("Configurations searched", report.tuning.configurations);
    output::kv("Best parameters", report.tuning.best_params);
    output::kv("Best CV R²", format!("{:.4}", report.tuning.best_cv_score));

    output::section("Feature Importances");
    for (channel, share) in report.importances.ranked() {
        output::kv(&channel, output::percent(share));
    }

    output::section("SHAP");
    output::kv("Expected value", format!("{:.4}", report.shap.expected_value));
    for (channel, value) in report.importances.names().iter().zip(&report.shap.mean_abs) {
        output::kv(&format!("mean |SHAP| {channel}"), format!("{value:.4}"));
    }

    output::section("Budget Optimization");
    for (channel, amount) in report.budget.optimized.allocation.iter() {
        output::kv(channel, output::money(amount));
    }

    output::section("Predicted Sales");
    let sales = &report.budget.predicted_sales;
    output::kv("Current allocation", format!("{:.4}", sales.current));
    output::kv("Optimized allocation", format!("{:.4}", sales.optimized));
    output::info(&format!("Expected sales increase: {:.4}", sales.uplift));

    output::section("A/B Test");
    for result in &report.ab_test.results {
        let mean = |m: Option<f32>| m.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"));
        output::kv(
            &result.channel,
            format!(
                "median={:.2}, A: n={} mean {}={}, B: n={} mean {}={}",
                result.median,
                result.a_count,
                report.ab_test.target,
                mean(result.a_mean),
                result.b_count,
                report.ab_test.target,
                mean(result.b_mean)
            ),
        );
    }

    if !report.warnings.is_empty() {
        output::section("Warnings");
        for warning in &report.warnings {
            output::warning(warning);
        }
    }
}
