//! Descriptive statistics for the exploratory and A/B stages.
//!
//! - Quantiles using the R-7 method (Hyndman & Fan 1996)
//! - Median with even-length averaging
//! - Covariance and Pearson correlation
//!
//! # Examples
//!
//! ```
//! use adspend::stats::{median, quantile};
//!
//! let data = [1.0, 2.0, 3.0, 4.0, 5.0];
//! assert_eq!(quantile(&data, 0.5).expect("non-empty"), 3.0);
//! assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]).expect("non-empty"), 2.5);
//! ```

pub mod covariance;

pub use covariance::{corr, corr_matrix, cov};

use crate::error::{AdspendError, Result};

fn sorted_copy(data: &[f32]) -> Vec<f32> {
    let mut sorted = data.to_vec();
    sorted.sort_unstable_by(f32::total_cmp);
    sorted
}

/// Median of `data`. For an even count this is the mean of the two middle
/// values.
///
/// # Errors
///
/// Returns `EmptyInput` for an empty slice.
pub fn median(data: &[f32]) -> Result<f32> {
    median_f64(data).map(|m| m as f32)
}

/// Median kept in f64, so comparisons against it match the exact midpoint.
pub(crate) fn median_f64(data: &[f32]) -> Result<f64> {
    if data.is_empty() {
        return Err(AdspendError::empty_input("cannot compute median of empty data"));
    }
    let sorted = sorted_copy(data);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Ok(f64::from(sorted[mid]))
    } else {
        Ok((f64::from(sorted[mid - 1]) + f64::from(sorted[mid])) / 2.0)
    }
}

/// Quantile `q` in [0, 1] using linear interpolation between order
/// statistics (R-7, the default of most statistics packages).
///
/// # Errors
///
/// Returns an error for empty data or `q` outside [0, 1].
pub fn quantile(data: &[f32], q: f64) -> Result<f32> {
    if data.is_empty() {
        return Err(AdspendError::empty_input(
            "cannot compute quantile of empty data",
        ));
    }
    if !(0.0..=1.0).contains(&q) {
        return Err(AdspendError::invalid_hyperparameter("q", q, "a value in [0, 1]"));
    }

    let sorted = sorted_copy(data);
    let n = sorted.len();
    if n == 1 {
        return Ok(sorted[0]);
    }

    // h = (n - 1) * q, 0-indexed position in the sorted data
    let h = (n - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    let fraction = (h - lo as f64) as f32;
    Ok(sorted[lo] + fraction * (sorted[hi] - sorted[lo]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]).expect("non-empty"), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]).expect("non-empty"), 2.5);
        assert_eq!(median(&[7.0]).expect("non-empty"), 7.0);
    }

    #[test]
    fn test_median_empty() {
        assert!(matches!(median(&[]), Err(AdspendError::EmptyInput { .. })));
    }

    #[test]
    fn test_median_does_not_mutate_input() {
        let data = [5.0, 1.0, 3.0];
        let _ = median(&data).expect("non-empty");
        assert_eq!(data, [5.0, 1.0, 3.0]);
    }

    #[test]
    fn test_quantile_endpoints() {
        let data = [9.0, 1.0, 5.0, 3.0];
        assert_eq!(quantile(&data, 0.0).expect("valid"), 1.0);
        assert_eq!(quantile(&data, 1.0).expect("valid"), 9.0);
    }

    #[test]
    fn test_quantile_interpolates() {
        // sorted: 1, 3, 5, 9; h = 3 * 0.25 = 0.75 -> 1 + 0.75 * 2
        let q1 = quantile(&[9.0, 1.0, 5.0, 3.0], 0.25).expect("valid");
        assert!((q1 - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_quantile_median_agrees_with_median() {
        let data = [10.0, 2.0, 8.0, 4.0, 6.0, 12.0];
        let q = quantile(&data, 0.5).expect("valid");
        let m = median(&data).expect("valid");
        assert!((q - m).abs() < 1e-6);
    }

    #[test]
    fn test_quantile_invalid_q() {
        assert!(quantile(&[1.0], 1.5).is_err());
        assert!(quantile(&[1.0], -0.1).is_err());
        assert!(quantile(&[], 0.5).is_err());
    }
}
