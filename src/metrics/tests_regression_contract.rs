use super::*;
use std::cell::Cell;

#[test]
fn test_r2_perfect() {
    let y = Vector::from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0]);
    assert!((r_squared(&y, &y) - 1.0).abs() < 1e-6);
}

#[test]
fn test_r2_negative_for_bad_predictions() {
    let y_true = Vector::from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0]);
    let y_pred = Vector::from_slice(&[10.0, 20.0, 30.0, 40.0, 50.0]);
    assert!(r_squared(&y_pred, &y_true) < 0.0);
}

#[test]
fn test_r2_constant_target_is_zero() {
    let y_true = Vector::from_slice(&[2.0, 2.0, 2.0]);
    let y_pred = Vector::from_slice(&[1.0, 2.0, 3.0]);
    assert_eq!(r_squared(&y_pred, &y_true), 0.0);
}

#[test]
fn test_mae_mse_rmse_known_values() {
    let y_true = Vector::from_slice(&[3.0, -0.5, 2.0, 7.0]);
    let y_pred = Vector::from_slice(&[2.5, 0.0, 2.0, 8.0]);
    assert!((mae(&y_pred, &y_true) - 0.5).abs() < 1e-6);
    assert!((mse(&y_pred, &y_true) - 0.375).abs() < 1e-6);
    assert!((rmse(&y_pred, &y_true) - 0.375_f32.sqrt()).abs() < 1e-6);
}

#[test]
fn test_rmse_at_least_mae() {
    let y_true = Vector::from_slice(&[1.0, 5.0, 2.0, 8.0]);
    let y_pred = Vector::from_slice(&[2.0, 3.0, 2.5, 4.0]);
    assert!(rmse(&y_pred, &y_true) >= mae(&y_pred, &y_true));
}

#[test]
fn test_to_map_keys() {
    let m = RegressionMetrics {
        r2: 0.9,
        mae: 1.0,
        rmse: 1.5,
    };
    let map = m.to_map();
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec!["MAE", "R2", "RMSE"]);
    assert_eq!(map["R2"], 0.9);
}

#[test]
fn test_from_predictions_errors() {
    let a = Vector::from_slice(&[1.0, 2.0]);
    let b = Vector::from_slice(&[1.0]);
    assert!(RegressionMetrics::from_predictions(&a, &b).is_err());
    let empty = Vector::<f32>::from_vec(vec![]);
    assert!(RegressionMetrics::from_predictions(&empty, &empty).is_err());
}

struct CountingModel {
    calls: Cell<usize>,
}

impl Estimator for CountingModel {
    fn fit(&mut self, _x: &Matrix<f32>, _y: &Vector<f32>) -> Result<()> {
        Ok(())
    }

    fn predict(&self, x: &Matrix<f32>) -> Result<Vector<f32>> {
        self.calls.set(self.calls.get() + 1);
        Ok(Vector::from_vec(x.column(0).iter().map(|v| v + 1.0).collect()))
    }
}

#[test]
fn test_evaluate_predicts_once() {
    let model = CountingModel {
        calls: Cell::new(0),
    };
    let x = Matrix::from_vec(3, 1, vec![1.0, 2.0, 3.0]).expect("valid");
    let y = Vector::from_slice(&[1.0, 2.0, 3.0]);

    let metrics = evaluate(&model, &x, &y).expect("evaluate");
    assert_eq!(model.calls.get(), 1);
    assert!((metrics.mae - 1.0).abs() < 1e-6);
    assert!((metrics.rmse - 1.0).abs() < 1e-6);
    // SS_res = 3, SS_tot = 2
    assert!((metrics.r2 + 0.5).abs() < 1e-6);
}

#[test]
fn test_evaluate_row_mismatch() {
    let model = CountingModel {
        calls: Cell::new(0),
    };
    let x = Matrix::from_vec(2, 1, vec![1.0, 2.0]).expect("valid");
    let y = Vector::from_slice(&[1.0]);
    assert!(evaluate(&model, &x, &y).is_err());
    assert_eq!(model.calls.get(), 0);
}
