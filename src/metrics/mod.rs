//! Regression metrics and held-out evaluation.

use crate::error::{AdspendError, Result};
use crate::primitives::{Matrix, Vector};
use crate::traits::Estimator;
use serde::Serialize;
use std::collections::BTreeMap;

/// Computes the coefficient of determination (R²).
///
/// R² = 1 - (`SS_res` / `SS_tot`). Returns 0.0 when the target is constant.
///
/// # Examples
///
/// ```
/// use adspend::metrics::r_squared;
/// use adspend::primitives::Vector;
///
/// let y_true = Vector::from_slice(&[3.0, -0.5, 2.0, 7.0]);
/// let y_pred = Vector::from_slice(&[2.5, 0.0, 2.0, 8.0]);
/// let r2 = r_squared(&y_pred, &y_true);
/// assert!(r2 > 0.9);
/// ```
///
/// # Panics
///
/// Panics if vectors have different lengths.
#[must_use]
pub fn r_squared(y_pred: &Vector<f32>, y_true: &Vector<f32>) -> f32 {
    assert_eq!(y_pred.len(), y_true.len(), "Vectors must have same length");

    let y_mean = y_true.mean();
    let ss_res: f32 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f32 = y_true.iter().map(|t| (t - y_mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return 0.0;
    }

    1.0 - (ss_res / ss_tot)
}

/// Computes the Mean Squared Error (MSE).
///
/// # Panics
///
/// Panics if vectors have different lengths or are empty.
#[must_use]
pub fn mse(y_pred: &Vector<f32>, y_true: &Vector<f32>) -> f32 {
    assert_eq!(y_pred.len(), y_true.len(), "Vectors must have same length");
    assert!(!y_true.is_empty(), "Vectors cannot be empty");

    let sum_sq_error: f32 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();

    sum_sq_error / y_true.len() as f32
}

/// Computes the Mean Absolute Error (MAE).
///
/// # Panics
///
/// Panics if vectors have different lengths or are empty.
#[must_use]
pub fn mae(y_pred: &Vector<f32>, y_true: &Vector<f32>) -> f32 {
    assert_eq!(y_pred.len(), y_true.len(), "Vectors must have same length");
    assert!(!y_true.is_empty(), "Vectors cannot be empty");

    let sum_abs_error: f32 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).abs())
        .sum();

    sum_abs_error / y_true.len() as f32
}

/// Computes the Root Mean Squared Error (RMSE).
///
/// # Panics
///
/// Panics if vectors have different lengths or are empty.
#[must_use]
pub fn rmse(y_pred: &Vector<f32>, y_true: &Vector<f32>) -> f32 {
    mse(y_pred, y_true).sqrt()
}

/// Goodness-of-fit and error of one model on a held-out partition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegressionMetrics {
    /// Coefficient of determination.
    pub r2: f32,
    /// Mean absolute error.
    pub mae: f32,
    /// Root mean squared error.
    pub rmse: f32,
}

impl RegressionMetrics {
    /// Computes all three metrics from one set of predictions.
    ///
    /// # Errors
    ///
    /// Returns an error if lengths differ or the vectors are empty.
    pub fn from_predictions(y_pred: &Vector<f32>, y_true: &Vector<f32>) -> Result<Self> {
        if y_pred.len() != y_true.len() {
            return Err(AdspendError::dimension_mismatch(
                "predictions",
                y_true.len(),
                y_pred.len(),
            ));
        }
        if y_true.is_empty() {
            return Err(AdspendError::empty_input("cannot score an empty partition"));
        }
        Ok(Self {
            r2: r_squared(y_pred, y_true),
            mae: mae(y_pred, y_true),
            rmse: rmse(y_pred, y_true),
        })
    }

    /// Name-to-value view (`R2`, `MAE`, `RMSE`).
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<&'static str, f32> {
        BTreeMap::from([("R2", self.r2), ("MAE", self.mae), ("RMSE", self.rmse)])
    }
}

/// Scores a fitted model on `(x_test, y_test)` from a single `predict` call.
///
/// # Errors
///
/// Returns an error if prediction fails or shapes disagree.
///
/// # Examples
///
/// ```
/// use adspend::prelude::*;
/// use adspend::metrics::evaluate;
///
/// let x = Matrix::from_vec(4, 1, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
/// let y = Vector::from_slice(&[3.0, 5.0, 7.0, 9.0]);
/// let mut model = LinearRegression::new();
/// model.fit(&x, &y).unwrap();
///
/// let metrics = evaluate(&model, &x, &y).unwrap();
/// assert!(metrics.rmse < 1e-3);
/// assert_eq!(metrics.to_map().len(), 3);
/// ```
pub fn evaluate<E: Estimator + ?Sized>(
    model: &E,
    x_test: &Matrix<f32>,
    y_test: &Vector<f32>,
) -> Result<RegressionMetrics> {
    if x_test.n_rows() != y_test.len() {
        return Err(AdspendError::dimension_mismatch(
            "test rows",
            x_test.n_rows(),
            y_test.len(),
        ));
    }
    let y_pred = model.predict(x_test)?;
    RegressionMetrics::from_predictions(&y_pred, y_test)
}

#[cfg(test)]
#[path = "tests_regression_contract.rs"]
mod tests_regression_contract;
