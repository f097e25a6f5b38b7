//! Exact interventional Shapley values.

use super::Explainer;
use crate::error::{AdspendError, Result};
use crate::primitives::{Matrix, Vector};
use crate::traits::Estimator;
use serde::Serialize;

/// Coalition enumeration is `2^n` model evaluations per background row.
const MAX_EXACT_FEATURES: usize = 12;

/// SHAP explainer that enumerates every feature coalition.
///
/// The value of a coalition `S` is the model output averaged over the
/// background rows with the features in `S` replaced by the explained
/// sample's values. Shapley values weight each marginal contribution by
/// `|S|! (n - |S| - 1)! / n!`, so they satisfy local accuracy exactly:
/// `expected_value + sum(shap_values) = prediction`.
///
/// # Properties
///
/// 1. **Local accuracy**: attributions sum to `prediction - expected_value`
/// 2. **Missingness**: a feature the model ignores gets zero attribution
/// 3. **Symmetry**: interchangeable features get equal attribution
#[derive(Debug)]
pub struct ShapExplainer<'a, E: Estimator + ?Sized> {
    model: &'a E,
    background: Matrix<f32>,
    expected_value: f32,
    /// `|S|! (n - |S| - 1)! / n!` indexed by `|S|`
    weights: Vec<f64>,
}

impl<'a, E: Estimator + ?Sized> ShapExplainer<'a, E> {
    /// Creates an explainer over the first `max_background` rows of
    /// `background`.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty background, zero `max_background`, more
    /// than 12 features, or a model that cannot predict the background.
    pub fn new(model: &'a E, background: &Matrix<f32>, max_background: usize) -> Result<Self> {
        if background.n_rows() == 0 || background.n_cols() == 0 {
            return Err(AdspendError::empty_input("SHAP background data"));
        }
        if max_background == 0 {
            return Err(AdspendError::invalid_hyperparameter(
                "max_background",
                0,
                ">= 1",
            ));
        }
        let n_features = background.n_cols();
        if n_features > MAX_EXACT_FEATURES {
            return Err(AdspendError::invalid_hyperparameter(
                "n_features",
                n_features,
                &format!("<= {MAX_EXACT_FEATURES} for exact Shapley values"),
            ));
        }

        let n_rows = background.n_rows().min(max_background);
        let rows: Vec<usize> = (0..n_rows).collect();
        let background = background.select_rows(&rows);
        let expected_value = model.predict(&background)?.mean();

        Ok(Self {
            model,
            background,
            expected_value,
            weights: coalition_weights(n_features),
        })
    }

    /// Number of features explained.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.background.n_cols()
    }

    /// Number of background rows actually used.
    #[must_use]
    pub fn background_size(&self) -> usize {
        self.background.n_rows()
    }

    /// Attributions for one sample.
    ///
    /// # Errors
    ///
    /// Returns an error if the sample width differs from the background.
    pub fn explain_row(&self, sample: &[f32]) -> Result<Vec<f32>> {
        let n = self.n_features();
        if sample.len() != n {
            return Err(AdspendError::dimension_mismatch("features", n, sample.len()));
        }

        let coalition_values = self.coalition_values(sample)?;
        let mut shap = vec![0.0_f64; n];
        for (feature, phi) in shap.iter_mut().enumerate() {
            let bit = 1_usize << feature;
            for mask in (0..coalition_values.len()).filter(|m| m & bit == 0) {
                let size = mask.count_ones() as usize;
                *phi += self.weights[size] * (coalition_values[mask | bit] - coalition_values[mask]);
            }
        }
        Ok(shap.into_iter().map(|v| v as f32).collect())
    }

    /// Attributions for every row of `x`.
    ///
    /// # Errors
    ///
    /// Returns an error if the width of `x` differs from the background.
    pub fn explain_matrix(&self, x: &Matrix<f32>) -> Result<ShapValues> {
        let n = self.n_features();
        if x.n_cols() != n {
            return Err(AdspendError::dimension_mismatch("features", n, x.n_cols()));
        }
        let mut data = Vec::with_capacity(x.n_rows() * n);
        for i in 0..x.n_rows() {
            data.extend(self.explain_row(x.row_slice(i))?);
        }
        let values = Matrix::from_vec(x.n_rows(), n, data)?;
        Ok(ShapValues {
            values,
            expected_value: self.expected_value,
        })
    }

    /// Mean model output for every coalition mask, as f64.
    fn coalition_values(&self, sample: &[f32]) -> Result<Vec<f64>> {
        let n = self.n_features();
        let n_bg = self.background.n_rows();
        let n_masks = 1_usize << n;

        let mut data = Vec::with_capacity(n_masks * n_bg * n);
        for mask in 0..n_masks {
            for b in 0..n_bg {
                let bg_row = self.background.row_slice(b);
                data.extend((0..n).map(|j| {
                    if mask & (1 << j) != 0 {
                        sample[j]
                    } else {
                        bg_row[j]
                    }
                }));
            }
        }
        let hybrid = Matrix::from_vec(n_masks * n_bg, n, data)?;
        let predictions = self.model.predict(&hybrid)?;

        Ok(predictions
            .as_slice()
            .chunks(n_bg)
            .map(|chunk| chunk.iter().map(|&p| f64::from(p)).sum::<f64>() / n_bg as f64)
            .collect())
    }
}

impl<E: Estimator + ?Sized> Explainer for ShapExplainer<'_, E> {
    fn explain(&self, sample: &Vector<f32>) -> Result<Vector<f32>> {
        self.explain_row(sample.as_slice()).map(Vector::from_vec)
    }

    fn expected_value(&self) -> f32 {
        self.expected_value
    }
}

fn coalition_weights(n: usize) -> Vec<f64> {
    let factorial = |k: usize| (1..=k).map(|v| v as f64).product::<f64>();
    let n_fact = factorial(n);
    (0..n)
        .map(|s| factorial(s) * factorial(n - s - 1) / n_fact)
        .collect()
}

/// Per-row, per-feature attributions (summary-plot data).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapValues {
    /// `n_samples x n_features` attributions
    pub values: Matrix<f32>,
    /// Baseline shared by every row
    pub expected_value: f32,
}

impl ShapValues {
    /// Mean absolute attribution per feature (global importance).
    #[must_use]
    pub fn mean_abs(&self) -> Vec<f32> {
        let (n_rows, n_cols) = self.values.shape();
        if n_rows == 0 {
            return vec![0.0; n_cols];
        }
        (0..n_cols)
            .map(|j| {
                (0..n_rows).map(|i| self.values.get(i, j).abs()).sum::<f32>() / n_rows as f32
            })
            .collect()
    }

    /// Reconstructed prediction `expected_value + sum(row)` for row `i`.
    #[must_use]
    pub fn reconstruct(&self, i: usize) -> f32 {
        self.expected_value + self.values.row_slice(i).iter().sum::<f32>()
    }
}
