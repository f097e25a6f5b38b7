use super::*;
use crate::model_selection::ForestParamGrid;
use crate::tree::MaxFeatures;

fn small_grid() -> ForestParamGrid {
    ForestParamGrid {
        n_estimators: vec![5, 10],
        max_depth: vec![Some(3), None],
        min_samples_split: vec![2],
        min_samples_leaf: vec![1],
        max_features: vec![MaxFeatures::All],
    }
}

fn fast_config() -> PipelineConfig {
    PipelineConfig::default()
        .with_grid(small_grid())
        .with_cv_folds(3)
        .with_baseline_estimators(10)
        .with_shap_background(20)
}

/// 60 synthetic spend rows plus one duplicate and one incomplete row.
fn advertising(newspaper_constant: bool) -> RawFrame {
    let mut tv = Vec::new();
    let mut radio = Vec::new();
    let mut paper = Vec::new();
    let mut sales = Vec::new();
    for i in 0..60 {
        let t = ((i * 37) % 101) as f32 * 3.0;
        let r = ((i * 17) % 53) as f32 * 0.9;
        let n = if newspaper_constant {
            10.0
        } else {
            ((i * 29) % 71) as f32
        };
        tv.push(Some(t));
        radio.push(Some(r));
        paper.push(Some(n));
        sales.push(Some(0.045 * t + 0.18 * r + 3.0));
    }
    tv.push(tv[0]);
    radio.push(radio[0]);
    paper.push(paper[0]);
    sales.push(sales[0]);

    tv.push(Some(50.0));
    radio.push(None);
    paper.push(Some(5.0));
    sales.push(Some(9.0));

    RawFrame::new(vec![
        ("TV".into(), tv),
        ("Radio".into(), radio),
        ("Newspaper".into(), paper),
        ("Sales".into(), sales),
    ])
    .expect("valid")
}

#[test]
fn test_run_end_to_end() {
    let outcome = Pipeline::new(fast_config())
        .run(&advertising(false))
        .expect("pipeline");
    let report = &outcome.report;

    assert_eq!(report.eda.cleaning.rows_in, 62);
    assert_eq!(report.eda.cleaning.duplicates_removed, 1);
    assert_eq!(report.eda.cleaning.incomplete_removed, 1);
    assert_eq!(report.n_train, 48);
    assert_eq!(report.n_test, 12);

    assert!(report.metrics.linear_regression.r2 > 0.99);
    assert!(report.metrics.tuned_random_forest.r2 > 0.5);
    assert_eq!(report.tuning.configurations, 4);

    let shares = report.importances.values();
    assert!((shares.iter().sum::<f32>() - 1.0).abs() < 1e-4);
    assert_eq!(report.shap.mean_abs.len(), 3);

    let allocation = &report.budget.optimized.allocation;
    assert!((allocation.total() - 100_000.0).abs() < 1e-6);
    assert_eq!(report.budget.current.get("TV"), Some(33_333.0));
    let sales = &report.budget.predicted_sales;
    assert!((sales.uplift - (sales.optimized - sales.current)).abs() < 1e-4);

    assert_eq!(report.ab_test.results.len(), 3);
    assert!(report.warnings.is_empty(), "warnings: {:?}", report.warnings);

    let labeled = &outcome.labeled;
    assert_eq!(labeled.frame.n_rows(), 60);
    assert_eq!(labeled.labels.len(), 3);
    assert!(labeled.labels.iter().all(|col| col.values.len() == 60));
    assert_eq!(labeled.labels[0].name, "TV_Test_Group");
}

#[test]
fn test_run_is_deterministic() {
    let raw = advertising(false);
    let a = Pipeline::new(fast_config()).run(&raw).expect("pipeline");
    let b = Pipeline::new(fast_config()).run(&raw).expect("pipeline");
    assert_eq!(a.report.metrics, b.report.metrics);
    assert_eq!(a.report.tuning, b.report.tuning);
    assert_eq!(a.report.budget, b.report.budget);
    assert_eq!(a.labeled, b.labeled);
}

#[test]
fn test_constant_channel_becomes_warnings() {
    let outcome = Pipeline::new(fast_config())
        .run(&advertising(true))
        .expect("degenerate channel is not fatal");
    let warnings = &outcome.report.warnings;
    assert!(warnings.iter().any(|w| w.contains("Newspaper") && w.contains("zero variance")));
    assert!(warnings.iter().any(|w| w.contains("Newspaper") && w.contains("group A is empty")));
    assert_eq!(outcome.report.importances.get("Newspaper"), Some(0.0));
}

#[test]
fn test_missing_column_fails_fast() {
    let raw = RawFrame::new(vec![
        ("TV".into(), vec![Some(1.0), Some(2.0)]),
        ("Sales".into(), vec![Some(1.0), Some(2.0)]),
    ])
    .expect("valid");
    assert!(matches!(
        Pipeline::new(fast_config()).run(&raw),
        Err(AdspendError::MissingColumn { .. })
    ));
}

#[test]
fn test_invalid_config_fails_before_work() {
    let raw = advertising(false);
    let bad = fast_config().with_test_size(1.5);
    assert!(Pipeline::new(bad).run(&raw).is_err());
    let bad = fast_config().with_cv_folds(1);
    assert!(Pipeline::new(bad).run(&raw).is_err());
}

#[test]
fn test_config_validation() {
    assert!(PipelineConfig::default().validate().is_ok());

    let mut dup = PipelineConfig::default();
    dup.channels.push("TV".into());
    assert!(matches!(dup.validate(), Err(AdspendError::DuplicateChannel { .. })));

    let mut target_is_channel = PipelineConfig::default();
    target_is_channel.target = "Radio".into();
    assert!(target_is_channel.validate().is_err());

    assert!(PipelineConfig::default().with_total_budget(f64::INFINITY).validate().is_err());
    assert!(PipelineConfig::default().with_shap_background(0).validate().is_err());
}

#[test]
fn test_config_json_file_with_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"random_state": 9, "total_budget": 5000.0}"#).expect("write");

    let config = PipelineConfig::from_json_file(&path).expect("load");
    assert_eq!(config.random_state, 9);
    assert_eq!(config.total_budget, 5000.0);
    assert_eq!(config.cv_folds, 5);
    assert_eq!(config.grid.len(), 324);

    std::fs::write(&path, r#"{"cv_folds": 1}"#).expect("write");
    assert!(PipelineConfig::from_json_file(&path).is_err());
    std::fs::write(&path, "not json").expect("write");
    assert!(matches!(
        PipelineConfig::from_json_file(&path),
        Err(AdspendError::Json(_))
    ));
}

#[test]
fn test_run_files_writes_labeled_csv() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("advertising.csv");
    let output = dir.path().join("cleaned.csv");
    std::fs::write(
        &input,
        (0..30)
            .map(|i| {
                let tv = ((i * 37) % 101) as f32 * 2.0;
                let radio = ((i * 11) % 41) as f32;
                let paper = ((i * 7) % 23) as f32;
                format!("{tv},{radio},{paper},{}\n", 0.05 * tv + 0.2 * radio + 2.0)
            })
            .fold("TV,Radio,Newspaper,Sales\n".to_string(), |acc, line| acc + &line),
    )
    .expect("write");

    let outcome = Pipeline::new(fast_config().with_cv_folds(2))
        .run_files(&input, &output)
        .expect("pipeline");

    let written = std::fs::read_to_string(&output).expect("read");
    let mut lines = written.lines();
    assert_eq!(
        lines.next(),
        Some("TV,Radio,Newspaper,Sales,TV_Test_Group,Radio_Test_Group,Newspaper_Test_Group")
    );
    assert_eq!(lines.count(), outcome.labeled.frame.n_rows());
}
