//! Linear models for regression.
//!
//! Includes Ordinary Least Squares (OLS) linear regression, the baseline the
//! tree ensemble is compared against.

use crate::error::{AdspendError, Result};
use crate::primitives::{Matrix, Vector};
use crate::traits::Estimator;
use serde::{Deserialize, Serialize};

/// Ordinary Least Squares (OLS) linear regression.
///
/// ```text
/// y = X β + b + ε
/// ```
///
/// # Solver
///
/// Normal equations `β = (XᵀX)⁻¹ Xᵀy` via Cholesky decomposition. With an
/// intercept the columns are centred first and `b = ȳ - x̄·β`, which keeps
/// the Gram matrix well conditioned for raw spend magnitudes.
///
/// # Examples
///
/// ```
/// use adspend::prelude::*;
///
/// // y = 2x + 1
/// let x = Matrix::from_vec(4, 1, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
/// let y = Vector::from_slice(&[3.0, 5.0, 7.0, 9.0]);
///
/// let mut model = LinearRegression::new();
/// model.fit(&x, &y).unwrap();
///
/// let r2 = model.score(&x, &y).unwrap();
/// assert!(r2 > 0.99);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegression {
    coefficients: Option<Vector<f32>>,
    intercept: f32,
    fit_intercept: bool,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearRegression {
    /// Creates a new `LinearRegression` that fits an intercept.
    #[must_use]
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: 0.0,
            fit_intercept: true,
        }
    }

    /// Sets whether to fit an intercept term.
    #[must_use]
    pub fn with_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    /// Returns the coefficients (excluding intercept), once fitted.
    #[must_use]
    pub fn coefficients(&self) -> Option<&Vector<f32>> {
        self.coefficients.as_ref()
    }

    /// Returns the intercept term.
    #[must_use]
    pub fn intercept(&self) -> f32 {
        self.intercept
    }

    /// Returns true if the model has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.coefficients.is_some()
    }

    /// Centres the `active` columns of `x` by `means`, dropping the rest.
    fn design(x: &Matrix<f32>, active: &[usize], means: &[f32]) -> Result<Matrix<f32>> {
        let n_rows = x.n_rows();
        let mut data = Vec::with_capacity(n_rows * active.len());
        for i in 0..n_rows {
            let row = x.row_slice(i);
            data.extend(active.iter().map(|&j| row[j] - means[j]));
        }
        Matrix::from_vec(n_rows, active.len(), data).map_err(Into::into)
    }

    /// Columns that carry no signal: constant ones with an intercept,
    /// all-zero ones without.
    fn is_inert(column: &[f32], fit_intercept: bool) -> bool {
        let first = column.first().copied().unwrap_or(0.0);
        column.iter().all(|&v| v == first) && (fit_intercept || first == 0.0)
    }
}

impl Estimator for LinearRegression {
    /// Fits the model by solving the normal equations.
    ///
    /// # Errors
    ///
    /// Returns an error if dimensions don't match, there are fewer samples
    /// than parameters, or `XᵀX` is singular.
    fn fit(&mut self, x: &Matrix<f32>, y: &Vector<f32>) -> Result<()> {
        let (n_samples, n_features) = x.shape();

        if n_samples != y.len() {
            return Err(AdspendError::dimension_mismatch(
                "target length",
                n_samples,
                y.len(),
            ));
        }
        if n_samples == 0 {
            return Err(AdspendError::empty_input("cannot fit with zero samples"));
        }

        let required = n_features + usize::from(self.fit_intercept);
        if n_samples < required {
            return Err(format!(
                "insufficient samples: {n_samples} rows for {required} parameters"
            )
            .into());
        }

        let (x_means, y_mean) = if self.fit_intercept {
            let x_means: Vec<f32> = (0..n_features).map(|j| x.column(j).mean()).collect();
            (x_means, y.mean())
        } else {
            (vec![0.0; n_features], 0.0)
        };
        let target = y.add_scalar(-y_mean);

        // Inert columns keep a zero coefficient, the minimum-norm solution.
        let active: Vec<usize> = (0..n_features)
            .filter(|&j| !Self::is_inert(x.column(j).as_slice(), self.fit_intercept))
            .collect();
        if active.len() < n_features {
            tracing::debug!(
                inert = n_features - active.len(),
                "constant columns get zero coefficients"
            );
        }

        let mut beta = Vector::zeros(n_features);
        if !active.is_empty() {
            let design = Self::design(x, &active, &x_means)?;
            let xt = design.transpose();
            let xtx = xt.matmul(&design)?;
            let xty = xt.matvec(&target)?;
            let solved = xtx
                .cholesky_solve(&xty)
                .map_err(|_| AdspendError::SingularMatrix)?;
            for (k, &j) in active.iter().enumerate() {
                beta[j] = solved[k];
            }
        }

        self.intercept = if self.fit_intercept {
            y_mean - beta.dot(&Vector::from_vec(x_means))
        } else {
            0.0
        };
        self.coefficients = Some(beta);
        Ok(())
    }

    /// Predicts target values for input data.
    fn predict(&self, x: &Matrix<f32>) -> Result<Vector<f32>> {
        let coefficients = self.coefficients.as_ref().ok_or(AdspendError::NotFitted {
            component: "LinearRegression",
        })?;
        if x.n_cols() != coefficients.len() {
            return Err(AdspendError::dimension_mismatch(
                "features",
                coefficients.len(),
                x.n_cols(),
            ));
        }
        Ok(x.matvec(coefficients)?.add_scalar(self.intercept))
    }
}
