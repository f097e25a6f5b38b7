//! Tabular containers: the dense `DataFrame`, the nullable `RawFrame` that
//! sits between the loader and the cleaner, and delimited-file I/O.
//!
//! Heavy data wrangling is out of scope; these types carry exactly what the
//! advertising pipeline needs.

pub mod io;
mod raw;

pub use io::{read_csv, write_csv, LabelColumn};
pub use raw::{CleaningSummary, RawFrame};

use crate::error::{AdspendError, Result};
use crate::primitives::{Matrix, Vector};
use serde::Serialize;

/// A minimal `DataFrame` with named, dense `f32` columns.
///
/// # Examples
///
/// ```
/// use adspend::data::DataFrame;
/// use adspend::primitives::Vector;
///
/// let columns = vec![
///     ("TV".to_string(), Vector::from_slice(&[230.1, 44.5, 17.2])),
///     ("Sales".to_string(), Vector::from_slice(&[22.1, 10.4, 9.3])),
/// ];
/// let df = DataFrame::new(columns).expect("DataFrame creation should succeed with valid columns");
/// assert_eq!(df.shape(), (3, 2));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
    columns: Vec<(String, Vector<f32>)>,
    n_rows: usize,
}

impl DataFrame {
    /// Creates a new `DataFrame` from named columns.
    ///
    /// # Errors
    ///
    /// Returns an error if columns have different lengths, names are empty or
    /// duplicated, or no column is given.
    pub fn new(columns: Vec<(String, Vector<f32>)>) -> Result<Self> {
        if columns.is_empty() {
            return Err(AdspendError::empty_input("DataFrame must have at least one column"));
        }

        let n_rows = columns[0].1.len();

        for (name, col) in &columns {
            if col.len() != n_rows {
                return Err(AdspendError::dimension_mismatch(
                    &format!("rows in column '{name}'"),
                    n_rows,
                    col.len(),
                ));
            }
            if name.is_empty() {
                return Err("Column names cannot be empty".into());
            }
        }

        let mut names: Vec<&str> = columns.iter().map(|(n, _)| n.as_str()).collect();
        names.sort_unstable();
        if names.windows(2).any(|w| w[0] == w[1]) {
            return Err("Duplicate column names not allowed".into());
        }

        Ok(Self { columns, n_rows })
    }

    /// Returns the shape as (`n_rows`, `n_cols`).
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.columns.len())
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Returns the column names.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Returns a reference to a column by name.
    ///
    /// # Errors
    ///
    /// Returns `MissingColumn` if the column doesn't exist.
    pub fn column(&self, name: &str) -> Result<&Vector<f32>> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
            .ok_or_else(|| AdspendError::MissingColumn {
                name: name.to_string(),
            })
    }

    /// Selects multiple columns by name, in the given order.
    ///
    /// # Errors
    ///
    /// Returns an error if any column doesn't exist.
    pub fn select(&self, names: &[&str]) -> Result<Self> {
        if names.is_empty() {
            return Err(AdspendError::empty_input("must select at least one column"));
        }

        let mut selected = Vec::with_capacity(names.len());
        for &name in names {
            selected.push((name.to_string(), self.column(name)?.clone()));
        }

        Self::new(selected)
    }

    /// Returns a row as a Vector, in column order.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of bounds.
    pub fn row(&self, idx: usize) -> Result<Vector<f32>> {
        if idx >= self.n_rows {
            return Err(format!("row index {idx} out of bounds (len={})", self.n_rows).into());
        }

        Ok(Vector::from_vec(
            self.columns.iter().map(|(_, col)| col[idx]).collect(),
        ))
    }

    /// Converts the `DataFrame` to a row-major Matrix of shape (`n_rows`, `n_cols`).
    ///
    /// # Errors
    ///
    /// Only fails if the internal column lengths are inconsistent.
    pub fn to_matrix(&self) -> Result<Matrix<f32>> {
        let mut data = Vec::with_capacity(self.n_rows * self.columns.len());

        for row_idx in 0..self.n_rows {
            for (_, col) in &self.columns {
                data.push(col[row_idx]);
            }
        }

        Matrix::from_vec(self.n_rows, self.columns.len(), data).map_err(Into::into)
    }

    /// Returns an iterator over columns as (name, vector) pairs.
    pub fn iter_columns(&self) -> impl Iterator<Item = (&str, &Vector<f32>)> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Returns a new frame holding only the given rows, in the given order.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of bounds.
    #[must_use]
    pub fn take_rows(&self, indices: &[usize]) -> Self {
        Self {
            columns: self
                .columns
                .iter()
                .map(|(n, v)| (n.clone(), v.select(indices)))
                .collect(),
            n_rows: indices.len(),
        }
    }

    /// Adds a new column to the `DataFrame`.
    ///
    /// # Errors
    ///
    /// Returns an error if column length doesn't match or name already exists.
    pub fn add_column(&mut self, name: String, data: Vector<f32>) -> Result<()> {
        if data.len() != self.n_rows {
            return Err(AdspendError::dimension_mismatch(
                "column length",
                self.n_rows,
                data.len(),
            ));
        }

        if self.columns.iter().any(|(n, _)| n == &name) {
            return Err(format!("Column '{name}' already exists").into());
        }

        if name.is_empty() {
            return Err("Column name cannot be empty".into());
        }

        self.columns.push((name, data));
        Ok(())
    }

    /// Returns descriptive statistics for all columns.
    #[must_use]
    pub fn describe(&self) -> Vec<ColumnStats> {
        self.columns
            .iter()
            .map(|(name, col)| {
                let values = col.as_slice();
                let min = values.iter().copied().fold(f32::INFINITY, f32::min);
                let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);

                ColumnStats {
                    name: name.clone(),
                    count: col.len(),
                    mean: col.mean(),
                    std: col.variance().sqrt(),
                    min: if values.is_empty() { 0.0 } else { min },
                    median: crate::stats::median(values).unwrap_or(0.0),
                    max: if values.is_empty() { 0.0 } else { max },
                }
            })
            .collect()
    }
}

/// Descriptive statistics for a column.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnStats {
    /// Column name.
    pub name: String,
    /// Number of elements.
    pub count: usize,
    /// Mean value.
    pub mean: f32,
    /// Population standard deviation.
    pub std: f32,
    /// Minimum value.
    pub min: f32,
    /// Median value.
    pub median: f32,
    /// Maximum value.
    pub max: f32,
}

#[cfg(test)]
#[path = "data_tests.rs"]
mod tests;
