//! Model selection: train/test splitting, K-fold cross-validation and the
//! exhaustive forest hyperparameter search.

mod grid;

pub use grid::{ForestGridSearch, ForestParamGrid, ForestParams, GridCandidate, GridSearchResult};

use crate::error::{AdspendError, Result};
use crate::primitives::{Matrix, Vector};
use crate::traits::Estimator;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

/// Per-fold scores from cross-validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossValidationResult {
    /// Score for each fold
    pub scores: Vec<f32>,
}

impl CrossValidationResult {
    /// Mean score across folds (0.0 when there are none).
    #[must_use]
    pub fn mean(&self) -> f32 {
        if self.scores.is_empty() {
            return 0.0;
        }
        self.scores.iter().sum::<f32>() / self.scores.len() as f32
    }

    /// Population standard deviation of the fold scores.
    #[must_use]
    pub fn std(&self) -> f32 {
        if self.scores.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        let variance = self
            .scores
            .iter()
            .map(|&score| (score - mean).powi(2))
            .sum::<f32>()
            / self.scores.len() as f32;
        variance.sqrt()
    }

    /// Lowest fold score.
    #[must_use]
    pub fn min(&self) -> f32 {
        self.scores.iter().copied().fold(f32::INFINITY, f32::min)
    }

    /// Highest fold score.
    #[must_use]
    pub fn max(&self) -> f32 {
        self.scores
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max)
    }
}

/// K-Fold cross-validator.
///
/// Splits rows into K consecutive folds, the first `n % K` folds one row
/// larger. Rows keep their order unless a shuffle seed is given.
///
/// # Example
///
/// ```rust
/// use adspend::model_selection::KFold;
///
/// let folds = KFold::new(5).split(10).expect("10 rows fit 5 folds");
/// assert_eq!(folds.len(), 5);
/// assert_eq!(folds[0].1, vec![0, 1]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KFold {
    n_splits: usize,
    shuffle_seed: Option<u64>,
}

impl KFold {
    /// Creates an unshuffled K-Fold cross-validator.
    #[must_use]
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle_seed: None,
        }
    }

    /// Shuffles rows with the given seed before cutting folds.
    #[must_use]
    pub fn with_shuffle(mut self, random_state: u64) -> Self {
        self.shuffle_seed = Some(random_state);
        self
    }

    /// Number of folds.
    #[must_use]
    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Generates `(train_indices, test_indices)` for each fold.
    ///
    /// # Errors
    ///
    /// Returns an error if `n_splits < 2` or exceeds `n_samples`.
    pub fn split(&self, n_samples: usize) -> Result<Vec<(Vec<usize>, Vec<usize>)>> {
        if self.n_splits < 2 {
            return Err(AdspendError::invalid_hyperparameter(
                "n_splits",
                self.n_splits,
                ">= 2",
            ));
        }
        if self.n_splits > n_samples {
            return Err(AdspendError::invalid_hyperparameter(
                "n_splits",
                self.n_splits,
                &format!("<= n_samples ({n_samples})"),
            ));
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();
        if let Some(seed) = self.shuffle_seed {
            indices.shuffle(&mut StdRng::seed_from_u64(seed));
        }

        let fold_size = n_samples / self.n_splits;
        let remainder = n_samples % self.n_splits;

        let mut result = Vec::with_capacity(self.n_splits);
        let mut start = 0;
        for i in 0..self.n_splits {
            let end = start + fold_size + usize::from(i < remainder);

            let test_indices = indices[start..end].to_vec();
            let mut train_indices = Vec::with_capacity(n_samples - test_indices.len());
            train_indices.extend_from_slice(&indices[..start]);
            train_indices.extend_from_slice(&indices[end..]);

            result.push((train_indices, test_indices));
            start = end;
        }

        Ok(result)
    }
}

/// Cross-validates a clone of `estimator` on each fold, scoring by R².
///
/// The caller's estimator is never fitted.
///
/// # Errors
///
/// Returns an error if the folds are invalid or any fold fails to fit.
///
/// # Example
///
/// ```rust
/// use adspend::prelude::*;
/// use adspend::model_selection::{cross_validate, KFold};
///
/// let x = Matrix::from_vec(20, 1, (0..20).map(|i| i as f32).collect()).unwrap();
/// let y = Vector::from_vec((0..20).map(|i| 3.0 * i as f32 - 1.0).collect());
///
/// let results = cross_validate(&LinearRegression::new(), &x, &y, &KFold::new(5)).unwrap();
/// assert_eq!(results.scores.len(), 5);
/// ```
pub fn cross_validate<E>(
    estimator: &E,
    x: &Matrix<f32>,
    y: &Vector<f32>,
    cv: &KFold,
) -> Result<CrossValidationResult>
where
    E: Estimator + Clone,
{
    if x.n_rows() != y.len() {
        return Err(AdspendError::dimension_mismatch(
            "target length",
            x.n_rows(),
            y.len(),
        ));
    }

    let splits = cv.split(x.n_rows())?;
    let mut scores = Vec::with_capacity(splits.len());
    for (train_idx, test_idx) in splits {
        let (x_train, y_train) = extract_samples(x, y, &train_idx);
        let (x_test, y_test) = extract_samples(x, y, &test_idx);

        let mut fold_model = estimator.clone();
        fold_model.fit(&x_train, &y_train)?;
        scores.push(fold_model.score(&x_test, &y_test)?);
    }

    Ok(CrossValidationResult { scores })
}

fn extract_samples(x: &Matrix<f32>, y: &Vector<f32>, indices: &[usize]) -> (Matrix<f32>, Vector<f32>) {
    (x.select_rows(indices), y.select(indices))
}

/// Train/test partitions returned by [`train_test_split`].
pub type SplitParts = (Matrix<f32>, Matrix<f32>, Vector<f32>, Vector<f32>);

/// Shuffles rows with `random_state` and splits them into
/// `(x_train, x_test, y_train, y_test)`.
///
/// The training partition holds `ceil((1 - test_size) * n)` rows. Equal
/// inputs and seeds always give equal partitions.
///
/// # Errors
///
/// Returns an error for zero rows, mismatched row counts, `test_size`
/// outside (0, 1), or a split that would leave either side empty.
///
/// # Example
///
/// ```rust
/// use adspend::model_selection::train_test_split;
/// use adspend::primitives::{Matrix, Vector};
///
/// let x = Matrix::from_vec(10, 2, (0..20).map(|i| i as f32).collect()).unwrap();
/// let y = Vector::from_vec((0..10).map(|i| i as f32).collect());
///
/// let (x_train, x_test, y_train, y_test) = train_test_split(&x, &y, 0.2, 42).unwrap();
/// assert_eq!(x_train.n_rows(), 8);
/// assert_eq!(x_test.n_rows(), 2);
/// assert_eq!(y_train.len() + y_test.len(), 10);
/// ```
pub fn train_test_split(
    x: &Matrix<f32>,
    y: &Vector<f32>,
    test_size: f32,
    random_state: u64,
) -> Result<SplitParts> {
    let n_train = train_size(x, y, test_size)?;

    let mut indices: Vec<usize> = (0..x.n_rows()).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(random_state));
    let (train_indices, test_indices) = indices.split_at(n_train);

    let (x_train, y_train) = extract_samples(x, y, train_indices);
    let (x_test, y_test) = extract_samples(x, y, test_indices);
    Ok((x_train, x_test, y_train, y_test))
}

fn train_size(x: &Matrix<f32>, y: &Vector<f32>, test_size: f32) -> Result<usize> {
    let n_samples = x.n_rows();
    if n_samples == 0 {
        return Err(AdspendError::empty_input("cannot split zero rows"));
    }
    if n_samples != y.len() {
        return Err(AdspendError::dimension_mismatch(
            "target length",
            n_samples,
            y.len(),
        ));
    }
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(AdspendError::invalid_hyperparameter(
            "test_size",
            test_size,
            "a proportion strictly between 0 and 1",
        ));
    }

    // Nudge below the integer so f32 rounding of test_size cannot add a row.
    let exact = (1.0 - f64::from(test_size)) * n_samples as f64;
    let n_train = (exact - 1e-6).ceil().max(0.0) as usize;
    if n_train == 0 || n_train >= n_samples {
        return Err(format!(
            "split would leave an empty partition (n_train={n_train}, n_test={})",
            n_samples.saturating_sub(n_train)
        )
        .into());
    }
    Ok(n_train)
}


#[cfg(test)]
#[path = "tests_kfold_contract.rs"]
mod tests_kfold_contract;
