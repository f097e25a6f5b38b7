use super::*;

fn synthetic_ads(n: usize) -> (Matrix<f32>, Vector<f32>) {
    // Deterministic pseudo-spend: sales driven mostly by feature 0, a little
    // by feature 1, not at all by feature 2.
    let mut data = Vec::with_capacity(n * 3);
    let mut y = Vec::with_capacity(n);
    for i in 0..n {
        let tv = ((i * 37) % 101) as f32 * 3.0;
        let radio = ((i * 17) % 53) as f32;
        let paper = ((i * 29) % 71) as f32;
        data.extend_from_slice(&[tv, radio, paper]);
        y.push(0.05 * tv + 0.1 * radio + 3.0);
    }
    (
        Matrix::from_vec(n, 3, data).expect("valid"),
        Vector::from_vec(y),
    )
}

#[test]
fn test_regressor_new_defaults() {
    let rf = RandomForestRegressor::new(7, 42);
    assert_eq!(rf.n_estimators(), 7);
    assert_eq!(rf.random_state(), 42);
    assert!(!rf.is_fitted());
    assert!(rf.feature_importances().is_none());
}

#[test]
fn test_regressor_fits_and_scores() {
    let (x, y) = synthetic_ads(120);
    let mut rf = RandomForestRegressor::new(25, 42);
    rf.fit(&x, &y).expect("fit");
    assert_eq!(rf.trees().len(), 25);
    let r2 = rf.score(&x, &y).expect("score");
    assert!(r2 > 0.9, "training R² {r2}");
}

#[test]
fn test_same_seed_same_forest() {
    let (x, y) = synthetic_ads(60);
    let mut a = RandomForestRegressor::new(8, 3).with_max_features(MaxFeatures::Sqrt);
    let mut b = RandomForestRegressor::new(8, 3).with_max_features(MaxFeatures::Sqrt);
    a.fit(&x, &y).expect("fit");
    b.fit(&x, &y).expect("fit");
    assert_eq!(
        a.predict(&x).expect("predict"),
        b.predict(&x).expect("predict")
    );
    assert_eq!(a.feature_importances(), b.feature_importances());
}

#[test]
fn test_different_seed_different_forest() {
    let (x, y) = synthetic_ads(60);
    let mut a = RandomForestRegressor::new(5, 1);
    let mut b = RandomForestRegressor::new(5, 2);
    a.fit(&x, &y).expect("fit");
    b.fit(&x, &y).expect("fit");
    assert_ne!(
        a.predict(&x).expect("predict"),
        b.predict(&x).expect("predict")
    );
}

#[test]
fn test_importances_normalised_and_ranked() {
    let (x, y) = synthetic_ads(150);
    let mut rf = RandomForestRegressor::new(30, 42);
    rf.fit(&x, &y).expect("fit");
    let imp = rf.feature_importances().expect("fitted");
    assert_eq!(imp.len(), 3);
    assert!((imp.iter().sum::<f32>() - 1.0).abs() < 1e-4);
    assert!(imp.iter().all(|&v| v >= 0.0));
    assert!(imp[0] > imp[1], "importances {imp:?}");
    assert!(imp[0] > imp[2], "importances {imp:?}");
}

#[test]
fn test_constant_target_gives_zero_importances() {
    let (x, _) = synthetic_ads(20);
    let y = Vector::from_vec(vec![4.0; 20]);
    let mut rf = RandomForestRegressor::new(4, 0);
    rf.fit(&x, &y).expect("fit");
    let imp = rf.feature_importances().expect("fitted");
    assert!(imp.iter().all(|&v| v == 0.0));
    let pred = rf.predict(&x).expect("predict");
    assert!(pred.iter().all(|&p| (p - 4.0).abs() < 1e-6));
}

#[test]
fn test_without_bootstrap_trees_agree_when_all_features_used() {
    let (x, y) = synthetic_ads(40);
    let mut rf = RandomForestRegressor::new(3, 9)
        .with_bootstrap(false)
        .with_max_depth(Some(3));
    rf.fit(&x, &y).expect("fit");
    let p0 = rf.trees()[0].predict(&x).expect("predict");
    let forest = rf.predict(&x).expect("predict");
    for (a, b) in p0.iter().zip(forest.iter()) {
        assert!((a - b).abs() < 1e-4);
    }
}

#[test]
fn test_invalid_configurations() {
    let (x, y) = synthetic_ads(10);
    assert!(matches!(
        RandomForestRegressor::new(0, 1).fit(&x, &y),
        Err(AdspendError::InvalidHyperparameter { .. })
    ));
    assert!(RandomForestRegressor::new(2, 1)
        .with_min_samples_split(1)
        .fit(&x, &y)
        .is_err());
    let short = Vector::from_slice(&[1.0]);
    assert!(RandomForestRegressor::new(2, 1).fit(&x, &short).is_err());
}

#[test]
fn test_predict_before_fit() {
    let (x, _) = synthetic_ads(5);
    assert!(matches!(
        RandomForestRegressor::new(2, 1).predict(&x),
        Err(AdspendError::NotFitted { .. })
    ));
}

#[test]
fn test_predictions_within_target_range() {
    let (x, y) = synthetic_ads(80);
    let mut rf = RandomForestRegressor::new(10, 5).with_min_samples_leaf(4);
    rf.fit(&x, &y).expect("fit");
    let lo = y.iter().copied().fold(f32::INFINITY, f32::min);
    let hi = y.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    for p in rf.predict(&x).expect("predict").iter() {
        assert!(*p >= lo - 1e-3 && *p <= hi + 1e-3);
    }
}
