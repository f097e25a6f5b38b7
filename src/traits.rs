//! Core traits for estimators and transformers.
//!
//! These traits define the API contracts every model and preprocessing step
//! in the pipeline follows.

use crate::error::Result;
use crate::primitives::{Matrix, Vector};

/// Primary trait for supervised regression estimators.
///
/// Estimators implement fit/predict/score following sklearn conventions.
///
/// # Examples
///
/// ```
/// use adspend::prelude::*;
///
/// // y = 2x + 1
/// let x_train = Matrix::from_vec(4, 1, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
/// let y_train = Vector::from_slice(&[3.0, 5.0, 7.0, 9.0]);
///
/// let mut model = LinearRegression::new();
/// model.fit(&x_train, &y_train).unwrap();
/// let score = model.score(&x_train, &y_train).unwrap();
/// assert!(score > 0.99);
/// ```
pub trait Estimator {
    /// Fits the model to training data.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails (dimension mismatch, singular matrix, etc.).
    fn fit(&mut self, x: &Matrix<f32>, y: &Vector<f32>) -> Result<()>;

    /// Predicts target values for input data.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is unfitted or the column count differs
    /// from the one seen during `fit`.
    fn predict(&self, x: &Matrix<f32>) -> Result<Vector<f32>>;

    /// Computes the coefficient of determination on `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns an error if prediction fails or lengths differ.
    fn score(&self, x: &Matrix<f32>, y: &Vector<f32>) -> Result<f32> {
        let y_pred = self.predict(x)?;
        if y_pred.len() != y.len() {
            return Err(crate::error::AdspendError::dimension_mismatch(
                "targets",
                y_pred.len(),
                y.len(),
            ));
        }
        Ok(crate::metrics::r_squared(&y_pred, y))
    }
}

/// Trait for data transformers (scalers).
///
/// ```text
/// let mut scaler = StandardScaler::new();
/// let x_scaled = scaler.fit_transform(&x)?;
/// let x_test_scaled = scaler.transform(&x_test)?;
/// ```
pub trait Transformer {
    /// Fits the transformer to data.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails.
    fn fit(&mut self, x: &Matrix<f32>) -> Result<()>;

    /// Transforms data using fitted parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if transformer is not fitted.
    fn transform(&self, x: &Matrix<f32>) -> Result<Matrix<f32>>;

    /// Fits and transforms in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails.
    fn fit_transform(&mut self, x: &Matrix<f32>) -> Result<Matrix<f32>> {
        self.fit(x)?;
        self.transform(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdspendError;

    // Mock transformer to test trait default methods
    struct MockTransformer {
        fitted: bool,
        scale: f32,
    }

    impl Transformer for MockTransformer {
        fn fit(&mut self, x: &Matrix<f32>) -> Result<()> {
            if x.n_rows() == 0 {
                return Err(AdspendError::empty_input("mock fit"));
            }
            let sum: f32 = x.as_slice().iter().sum();
            self.scale = sum / x.as_slice().len() as f32;
            self.fitted = true;
            Ok(())
        }

        fn transform(&self, x: &Matrix<f32>) -> Result<Matrix<f32>> {
            if !self.fitted {
                return Err(AdspendError::NotFitted {
                    component: "MockTransformer",
                });
            }
            Ok(x.mul_scalar(1.0 / self.scale))
        }
    }

    // Mock estimator predicting a constant
    struct ConstantEstimator(f32);

    impl Estimator for ConstantEstimator {
        fn fit(&mut self, _x: &Matrix<f32>, y: &Vector<f32>) -> Result<()> {
            self.0 = y.mean();
            Ok(())
        }

        fn predict(&self, x: &Matrix<f32>) -> Result<Vector<f32>> {
            Ok(Vector::from_vec(vec![self.0; x.n_rows()]))
        }
    }

    #[test]
    fn test_fit_transform_default_method() {
        let x = Matrix::from_vec(2, 1, vec![2.0, 4.0]).expect("valid matrix");
        let mut t = MockTransformer {
            fitted: false,
            scale: 1.0,
        };
        let out = t.fit_transform(&x).expect("fit_transform should succeed");
        assert!((out.get(0, 0) - 2.0 / 3.0).abs() < 1e-6);
        assert!(t.fitted);
    }

    #[test]
    fn test_transform_before_fit_errors() {
        let x = Matrix::from_vec(1, 1, vec![1.0]).expect("valid matrix");
        let t = MockTransformer {
            fitted: false,
            scale: 1.0,
        };
        assert!(matches!(
            t.transform(&x),
            Err(AdspendError::NotFitted { .. })
        ));
    }

    #[test]
    fn test_default_score_constant_model_is_zero() {
        let x = Matrix::from_vec(3, 1, vec![1.0, 2.0, 3.0]).expect("valid matrix");
        let y = Vector::from_slice(&[1.0, 2.0, 3.0]);
        let mut est = ConstantEstimator(0.0);
        est.fit(&x, &y).expect("fit");
        let r2 = est.score(&x, &y).expect("score");
        assert!(r2.abs() < 1e-6);
    }

    #[test]
    fn test_default_score_length_mismatch() {
        let x = Matrix::from_vec(3, 1, vec![1.0, 2.0, 3.0]).expect("valid matrix");
        let y = Vector::from_slice(&[1.0, 2.0]);
        let est = ConstantEstimator(0.0);
        assert!(est.score(&x, &y).is_err());
    }
}
