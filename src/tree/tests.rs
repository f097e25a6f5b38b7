use super::*;

fn step_data() -> (Matrix<f32>, Vector<f32>) {
    // y depends on feature 0 only; feature 1 is noise-free filler
    let x = Matrix::from_vec(
        8,
        2,
        vec![
            1.0, 5.0, //
            2.0, 3.0, //
            3.0, 8.0, //
            4.0, 1.0, //
            5.0, 7.0, //
            6.0, 2.0, //
            7.0, 6.0, //
            8.0, 4.0,
        ],
    )
    .expect("valid");
    let y = Vector::from_slice(&[1.0, 1.0, 1.0, 1.0, 9.0, 9.0, 9.0, 9.0]);
    (x, y)
}

#[test]
fn test_max_features_resolve() {
    assert_eq!(MaxFeatures::Sqrt.resolve(3), 1);
    assert_eq!(MaxFeatures::Log2.resolve(3), 1);
    assert_eq!(MaxFeatures::All.resolve(3), 3);
    assert_eq!(MaxFeatures::Sqrt.resolve(16), 4);
    assert_eq!(MaxFeatures::Log2.resolve(16), 4);
    assert_eq!(MaxFeatures::Log2.resolve(1), 1);
}

#[test]
fn test_max_features_serde_names() {
    let json = serde_json::to_string(&MaxFeatures::Log2).expect("serialize");
    assert_eq!(json, "\"log2\"");
    let back: MaxFeatures = serde_json::from_str("\"sqrt\"").expect("deserialize");
    assert_eq!(back, MaxFeatures::Sqrt);
    assert_eq!(MaxFeatures::All.to_string(), "all");
}

#[test]
fn test_tree_fits_step_exactly() {
    let (x, y) = step_data();
    let mut tree = DecisionTreeRegressor::new();
    tree.fit(&x, &y).expect("fit");

    let root = tree.tree().expect("fitted");
    match root {
        RegressionTreeNode::Node(n) => {
            assert_eq!(n.feature_idx, 0);
            assert!((n.threshold - 4.5).abs() < 1e-6);
            assert_eq!(n.n_samples, 8);
        }
        RegressionTreeNode::Leaf(_) => panic!("root should split"),
    }
    assert_eq!(tree.depth(), Some(1));
    assert_eq!(root.n_leaves(), 2);

    let pred = tree.predict(&x).expect("predict");
    assert_eq!(pred.as_slice(), y.as_slice());
}

#[test]
fn test_tree_importances_credit_signal_feature() {
    let (x, y) = step_data();
    let mut tree = DecisionTreeRegressor::new();
    tree.fit(&x, &y).expect("fit");
    let imp = tree.feature_importances().expect("fitted");
    assert!((imp[0] - 1.0).abs() < 1e-6);
    assert_eq!(imp[1], 0.0);
}

#[test]
fn test_max_depth_limits_growth() {
    let x = Matrix::from_vec(6, 1, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).expect("valid");
    let y = Vector::from_slice(&[1.0, 4.0, 9.0, 16.0, 25.0, 36.0]);
    let mut tree = DecisionTreeRegressor::new().with_max_depth(Some(1));
    tree.fit(&x, &y).expect("fit");
    assert_eq!(tree.depth(), Some(1));

    let mut deep = DecisionTreeRegressor::new();
    deep.fit(&x, &y).expect("fit");
    assert!(deep.depth().expect("fitted") > 1);
}

#[test]
fn test_min_samples_leaf_respected() {
    fn leaf_sizes(node: &RegressionTreeNode, out: &mut Vec<usize>) {
        match node {
            RegressionTreeNode::Leaf(l) => out.push(l.n_samples),
            RegressionTreeNode::Node(n) => {
                leaf_sizes(&n.left, out);
                leaf_sizes(&n.right, out);
            }
        }
    }

    let x = Matrix::from_vec(10, 1, (0..10).map(|v| v as f32).collect()).expect("valid");
    let y = Vector::from_vec((0..10).map(|v| (v * v) as f32).collect());
    let mut tree = DecisionTreeRegressor::new().with_min_samples_leaf(3);
    tree.fit(&x, &y).expect("fit");

    let mut sizes = Vec::new();
    leaf_sizes(tree.tree().expect("fitted"), &mut sizes);
    assert!(sizes.iter().all(|&s| s >= 3), "leaf sizes {sizes:?}");
    assert_eq!(sizes.iter().sum::<usize>(), 10);
}

#[test]
fn test_min_samples_split_blocks_small_nodes() {
    let x = Matrix::from_vec(4, 1, vec![1.0, 2.0, 3.0, 4.0]).expect("valid");
    let y = Vector::from_slice(&[1.0, 2.0, 3.0, 4.0]);
    let mut tree = DecisionTreeRegressor::new().with_min_samples_split(5);
    tree.fit(&x, &y).expect("fit");
    assert_eq!(tree.depth(), Some(0));
    let pred = tree.predict(&x).expect("predict");
    assert!(pred.iter().all(|&p| (p - 2.5).abs() < 1e-6));
}

#[test]
fn test_constant_target_is_single_leaf() {
    let (x, _) = step_data();
    let y = Vector::from_slice(&[3.0; 8]);
    let mut tree = DecisionTreeRegressor::new();
    tree.fit(&x, &y).expect("fit");
    assert_eq!(tree.depth(), Some(0));
    let imp = tree.feature_importances().expect("fitted");
    assert!(imp.iter().all(|&v| v == 0.0));
}

#[test]
fn test_invalid_hyperparameters() {
    let (x, y) = step_data();
    assert!(matches!(
        DecisionTreeRegressor::new().with_max_depth(Some(0)).fit(&x, &y),
        Err(AdspendError::InvalidHyperparameter { .. })
    ));
    assert!(DecisionTreeRegressor::new()
        .with_min_samples_split(1)
        .fit(&x, &y)
        .is_err());
    assert!(DecisionTreeRegressor::new()
        .with_min_samples_leaf(0)
        .fit(&x, &y)
        .is_err());
}

#[test]
fn test_tree_predict_errors() {
    let (x, y) = step_data();
    assert!(matches!(
        DecisionTreeRegressor::new().predict(&x),
        Err(AdspendError::NotFitted { .. })
    ));

    let mut tree = DecisionTreeRegressor::new();
    tree.fit(&x, &y).expect("fit");
    let narrow = Matrix::from_vec(1, 1, vec![1.0]).expect("valid");
    assert!(tree.predict(&narrow).is_err());
}

#[test]
fn test_tree_fit_shape_errors() {
    let (x, _) = step_data();
    let short = Vector::from_slice(&[1.0, 2.0]);
    assert!(DecisionTreeRegressor::new().fit(&x, &short).is_err());
}
