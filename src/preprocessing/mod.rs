//! Feature standardization.
//!
//! # Example
//!
//! ```
//! use adspend::prelude::*;
//! use adspend::preprocessing::StandardScaler;
//!
//! let data = Matrix::from_vec(4, 2, vec![
//!     1.0, 100.0,
//!     2.0, 200.0,
//!     3.0, 300.0,
//!     4.0, 400.0,
//! ]).expect("valid matrix dimensions");
//!
//! let mut scaler = StandardScaler::new();
//! let scaled = scaler.fit_transform(&data).expect("fit_transform should succeed");
//!
//! let col0: f32 = (0..4).map(|i| scaled.get(i, 0)).sum::<f32>() / 4.0;
//! assert!(col0.abs() < 1e-5);
//! ```

use crate::error::{AdspendError, Result};
use crate::primitives::Matrix;
use crate::traits::Transformer;
use serde::{Deserialize, Serialize};

/// Standard deviations at or below this are treated as zero variance.
const ZERO_VARIANCE_STD: f32 = 1e-10;

/// Standardizes features by removing the mean and scaling to unit variance.
///
/// Uses the population standard deviation. Columns whose standard deviation
/// is zero are centred but left unscaled, and are listed by
/// [`StandardScaler::zero_variance_features`].
///
/// Fitted state never changes after `fit`: call it once on the training
/// partition and reuse the scaler for test and what-if data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Option<Vec<f32>>,
    std: Option<Vec<f32>>,
    with_mean: bool,
    with_std: bool,
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardScaler {
    /// Creates a scaler that both centres and scales.
    #[must_use]
    pub fn new() -> Self {
        Self {
            mean: None,
            std: None,
            with_mean: true,
            with_std: true,
        }
    }

    /// Sets whether to center the data by subtracting the mean.
    #[must_use]
    pub fn with_mean(mut self, with_mean: bool) -> Self {
        self.with_mean = with_mean;
        self
    }

    /// Sets whether to scale the data by dividing by standard deviation.
    #[must_use]
    pub fn with_std(mut self, with_std: bool) -> Self {
        self.with_std = with_std;
        self
    }

    /// Per-feature means, once fitted.
    #[must_use]
    pub fn mean(&self) -> Option<&[f32]> {
        self.mean.as_deref()
    }

    /// Per-feature population standard deviations, once fitted.
    #[must_use]
    pub fn std(&self) -> Option<&[f32]> {
        self.std.as_deref()
    }

    /// Returns true if the scaler has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.mean.is_some()
    }

    /// Number of features seen during `fit`.
    #[must_use]
    pub fn n_features(&self) -> Option<usize> {
        self.mean.as_ref().map(Vec::len)
    }

    /// Indices of fitted columns with zero variance (left unscaled).
    #[must_use]
    pub fn zero_variance_features(&self) -> Vec<usize> {
        self.std
            .as_ref()
            .map(|std| {
                std.iter()
                    .enumerate()
                    .filter(|(_, &s)| s <= ZERO_VARIANCE_STD)
                    .map(|(j, _)| j)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn fitted(&self) -> Result<(&[f32], &[f32])> {
        match (&self.mean, &self.std) {
            (Some(mean), Some(std)) => Ok((mean, std)),
            _ => Err(AdspendError::NotFitted {
                component: "StandardScaler",
            }),
        }
    }

    fn check_width(&self, x: &Matrix<f32>, expected: usize) -> Result<()> {
        if x.n_cols() != expected {
            return Err(AdspendError::dimension_mismatch(
                "scaler features",
                expected,
                x.n_cols(),
            ));
        }
        Ok(())
    }

    /// Transforms data back to the original scale.
    ///
    /// # Errors
    ///
    /// Returns an error if the scaler is not fitted or dimensions mismatch.
    pub fn inverse_transform(&self, x: &Matrix<f32>) -> Result<Matrix<f32>> {
        let (mean, std) = self.fitted()?;
        self.check_width(x, mean.len())?;

        let (n_samples, n_features) = x.shape();
        let mut result = Vec::with_capacity(n_samples * n_features);
        for i in 0..n_samples {
            for (j, &val) in x.row_slice(i).iter().enumerate() {
                let mut val = val;
                if self.with_std && std[j] > ZERO_VARIANCE_STD {
                    val *= std[j];
                }
                if self.with_mean {
                    val += mean[j];
                }
                result.push(val);
            }
        }

        Matrix::from_vec(n_samples, n_features, result).map_err(Into::into)
    }
}

impl Transformer for StandardScaler {
    /// Computes the mean and population standard deviation of each feature.
    fn fit(&mut self, x: &Matrix<f32>) -> Result<()> {
        let (n_samples, n_features) = x.shape();
        if n_samples == 0 {
            return Err(AdspendError::empty_input("cannot fit scaler with zero samples"));
        }

        let mut mean = vec![0.0; n_features];
        let mut std = vec![0.0; n_features];
        for j in 0..n_features {
            let col = x.column(j);
            mean[j] = col.mean();
            std[j] = col.variance().sqrt();
        }

        self.mean = Some(mean);
        self.std = Some(std);

        for j in self.zero_variance_features() {
            tracing::warn!(feature = j, "zero-variance column left unscaled");
        }
        Ok(())
    }

    /// Standardizes the data using fitted mean and std.
    fn transform(&self, x: &Matrix<f32>) -> Result<Matrix<f32>> {
        let (mean, std) = self.fitted()?;
        self.check_width(x, mean.len())?;

        let (n_samples, n_features) = x.shape();
        let mut result = Vec::with_capacity(n_samples * n_features);
        for i in 0..n_samples {
            for (j, &val) in x.row_slice(i).iter().enumerate() {
                let mut val = val;
                if self.with_mean {
                    val -= mean[j];
                }
                if self.with_std && std[j] > ZERO_VARIANCE_STD {
                    val /= std[j];
                }
                result.push(val);
            }
        }

        Matrix::from_vec(n_samples, n_features, result).map_err(Into::into)
    }
}
