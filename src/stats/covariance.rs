//! Covariance and correlation computations.
//!
//! ```text
//! Cov(X, Y) = (1/n) Σ (x_i - x̄)(y_i - ȳ)
//! ρ(X, Y)   = Cov(X, Y) / (σ_X σ_Y)
//! ```
//!
//! # Examples
//!
//! ```
//! use adspend::stats::{cov, corr};
//! use adspend::primitives::Vector;
//!
//! let x = Vector::from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0]);
//! let y = Vector::from_slice(&[2.0, 4.0, 6.0, 8.0, 10.0]);
//!
//! let covariance = cov(&x, &y).expect("covariance should compute");
//! let correlation = corr(&x, &y).expect("correlation should compute");
//!
//! assert!(covariance > 0.0);
//! assert!((correlation - 1.0).abs() < 1e-6);
//! ```

use crate::error::{AdspendError, Result};
use crate::primitives::{Matrix, Vector};

/// Standard deviations below this are treated as zero.
const ZERO_STD: f32 = 1e-10;

fn check_pair(x: &[f32], y: &[f32], what: &str) -> Result<()> {
    if x.len() != y.len() {
        return Err(AdspendError::DimensionMismatch {
            expected: format!("{} values in x", x.len()),
            actual: format!("{} values in y", y.len()),
        });
    }
    if x.is_empty() {
        return Err(AdspendError::empty_input(&format!(
            "cannot compute {what} of empty vectors"
        )));
    }
    Ok(())
}

/// Computes the population covariance between two vectors.
///
/// # Errors
///
/// Returns error if vectors have different lengths or are empty.
pub fn cov(x: &Vector<f32>, y: &Vector<f32>) -> Result<f32> {
    check_pair(x.as_slice(), y.as_slice(), "covariance")?;
    let n = x.len() as f32;
    let x_mean = x.mean();
    let y_mean = y.mean();

    let cov_sum: f32 = x
        .iter()
        .zip(y.iter())
        .map(|(&xi, &yi)| (xi - x_mean) * (yi - y_mean))
        .sum();

    Ok(cov_sum / n)
}

/// Pearson correlation of two equally long, non-empty slices.
///
/// Returns `None` when either side has zero variance.
pub(crate) fn pearson(x: &[f32], y: &[f32]) -> Option<f32> {
    let n = x.len() as f32;
    let x_mean = x.iter().sum::<f32>() / n;
    let y_mean = y.iter().sum::<f32>() / n;

    let mut cov_sum = 0.0;
    let mut x_var_sum = 0.0;
    let mut y_var_sum = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        cov_sum += dx * dy;
        x_var_sum += dx * dx;
        y_var_sum += dy * dy;
    }

    let x_std = (x_var_sum / n).sqrt();
    let y_std = (y_var_sum / n).sqrt();
    if x_std < ZERO_STD || y_std < ZERO_STD {
        return None;
    }
    Some(((cov_sum / n) / (x_std * y_std)).clamp(-1.0, 1.0))
}

/// Computes the Pearson correlation coefficient between two vectors.
///
/// # Errors
///
/// Returns error if vectors have different lengths, are empty, or have zero variance.
///
/// # Examples
///
/// ```
/// use adspend::stats::corr;
/// use adspend::primitives::Vector;
///
/// let x = Vector::from_slice(&[1.0, 2.0, 3.0, 4.0]);
/// let y = Vector::from_slice(&[8.0, 6.0, 4.0, 2.0]);
///
/// let correlation = corr(&x, &y).expect("Should compute correlation");
/// assert!((correlation + 1.0).abs() < 1e-6);
/// ```
pub fn corr(x: &Vector<f32>, y: &Vector<f32>) -> Result<f32> {
    check_pair(x.as_slice(), y.as_slice(), "correlation")?;
    pearson(x.as_slice(), y.as_slice())
        .ok_or_else(|| "Cannot compute correlation when variance is zero".into())
}

/// Computes the Pearson correlation matrix of the columns of `data` (n × p).
///
/// Diagonal entries are 1.0.
///
/// # Errors
///
/// Returns error if data is empty or any feature has zero variance.
pub fn corr_matrix(data: &Matrix<f32>) -> Result<Matrix<f32>> {
    let (n, p) = data.shape();
    if n == 0 || p == 0 {
        return Err(AdspendError::empty_input(
            "cannot compute correlation matrix for empty data",
        ));
    }

    let columns: Vec<Vector<f32>> = (0..p).map(|j| data.column(j)).collect();
    if let Some(j) = columns.iter().position(|c| c.variance().sqrt() < ZERO_STD) {
        return Err(format!("Feature {j} has zero variance").into());
    }

    let mut values = vec![0.0_f32; p * p];
    for i in 0..p {
        values[i * p + i] = 1.0;
        for j in 0..i {
            let r = pearson(columns[i].as_slice(), columns[j].as_slice()).unwrap_or(0.0);
            values[i * p + j] = r;
            values[j * p + i] = r;
        }
    }

    Matrix::from_vec(p, p, values).map_err(Into::into)
}

#[cfg(test)]
#[path = "covariance_tests.rs"]
mod tests;
