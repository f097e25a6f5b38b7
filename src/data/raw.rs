//! Nullable table produced by the loader and consumed by the cleaner.

use super::DataFrame;
use crate::error::{AdspendError, Result};
use crate::primitives::Vector;
use serde::Serialize;
use std::collections::HashSet;

/// A table whose cells may be missing.
///
/// Cleaning is expressed as pure transformations returning new frames, so a
/// caller always holds an immutable snapshot of each stage.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame {
    columns: Vec<(String, Vec<Option<f32>>)>,
    n_rows: usize,
}

/// Row counts observed while cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CleaningSummary {
    /// Rows in the input frame.
    pub rows_in: usize,
    /// Exact-duplicate rows dropped (first occurrence kept).
    pub duplicates_removed: usize,
    /// Rows dropped because at least one cell was missing.
    pub incomplete_removed: usize,
}

impl CleaningSummary {
    /// Rows surviving both cleaning passes.
    #[must_use]
    pub fn rows_out(&self) -> usize {
        self.rows_in - self.duplicates_removed - self.incomplete_removed
    }
}

impl RawFrame {
    /// Creates a frame from named nullable columns.
    ///
    /// # Errors
    ///
    /// Returns an error on zero columns, ragged columns, or empty/duplicate names.
    pub fn new(columns: Vec<(String, Vec<Option<f32>>)>) -> Result<Self> {
        if columns.is_empty() {
            return Err(AdspendError::empty_input("frame must have at least one column"));
        }
        let n_rows = columns[0].1.len();
        let mut seen = HashSet::new();
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
            if !seen.insert(name.as_str()) {
                return Err(format!("Duplicate column name '{name}'").into());
            }
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

    /// Returns the column names in file order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Returns a column by name.
    ///
    /// # Errors
    ///
    /// Returns `MissingColumn` if absent.
    pub fn column(&self, name: &str) -> Result<&[Option<f32>]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c.as_slice())
            .ok_or_else(|| AdspendError::MissingColumn {
                name: name.to_string(),
            })
    }

    /// Fails fast unless every named column is present.
    ///
    /// # Errors
    ///
    /// Returns `MissingColumn` for the first absent name.
    pub fn require_columns(&self, names: &[&str]) -> Result<()> {
        for name in names {
            self.column(name)?;
        }
        Ok(())
    }

    /// Number of missing cells across the whole frame.
    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.columns
            .iter()
            .map(|(_, c)| c.iter().filter(|v| v.is_none()).count())
            .sum()
    }

    // -0.0 and 0.0 compare equal, so they must hash equal too.
    fn row_key(&self, row: usize) -> Vec<Option<u32>> {
        self.columns
            .iter()
            .map(|(_, c)| c[row].map(|v| (v + 0.0).to_bits()))
            .collect()
    }

    fn take_rows(&self, keep: &[usize]) -> Self {
        Self {
            columns: self
                .columns
                .iter()
                .map(|(n, c)| (n.clone(), keep.iter().map(|&i| c[i]).collect()))
                .collect(),
            n_rows: keep.len(),
        }
    }

    /// Drops rows identical (across every column) to an earlier row.
    ///
    /// Missing cells compare equal to each other. Row order is preserved.
    #[must_use]
    pub fn drop_duplicates(&self) -> Self {
        let mut seen = HashSet::with_capacity(self.n_rows);
        let keep: Vec<usize> = (0..self.n_rows)
            .filter(|&row| seen.insert(self.row_key(row)))
            .collect();
        self.take_rows(&keep)
    }

    /// Drops rows containing at least one missing cell.
    #[must_use]
    pub fn drop_missing(&self) -> Self {
        let keep: Vec<usize> = (0..self.n_rows)
            .filter(|&row| self.columns.iter().all(|(_, c)| c[row].is_some()))
            .collect();
        self.take_rows(&keep)
    }

    /// Removes duplicates, then incomplete rows.
    ///
    /// Cleaning an already clean frame is a no-op.
    ///
    /// # Examples
    ///
    /// ```
    /// use adspend::data::RawFrame;
    ///
    /// let raw = RawFrame::new(vec![
    ///     ("TV".to_string(), vec![Some(1.0), Some(1.0), None]),
    ///     ("Sales".to_string(), vec![Some(2.0), Some(2.0), Some(3.0)]),
    /// ]).unwrap();
    /// let (clean, summary) = raw.clean();
    /// assert_eq!(clean.n_rows(), 1);
    /// assert_eq!(summary.duplicates_removed, 1);
    /// assert_eq!(summary.incomplete_removed, 1);
    /// ```
    #[must_use]
    pub fn clean(&self) -> (Self, CleaningSummary) {
        let deduped = self.drop_duplicates();
        let complete = deduped.drop_missing();
        let summary = CleaningSummary {
            rows_in: self.n_rows,
            duplicates_removed: self.n_rows - deduped.n_rows,
            incomplete_removed: deduped.n_rows - complete.n_rows,
        };
        (complete, summary)
    }

    /// Converts to a dense frame.
    ///
    /// # Errors
    ///
    /// Returns an error if any cell is still missing.
    pub fn into_dataframe(self) -> Result<DataFrame> {
        let mut dense = Vec::with_capacity(self.columns.len());
        for (name, col) in self.columns {
            let values: Option<Vec<f32>> = col.into_iter().collect();
            let values = values.ok_or_else(|| {
                AdspendError::Other(format!(
                    "column '{name}' still has missing values, clean the frame first"
                ))
            })?;
            dense.push((name, Vector::from_vec(values)));
        }
        DataFrame::new(dense)
    }
}

impl From<&DataFrame> for RawFrame {
    fn from(df: &DataFrame) -> Self {
        Self {
            columns: df
                .iter_columns()
                .map(|(n, v)| (n.to_string(), v.iter().copied().map(Some).collect()))
                .collect(),
            n_rows: df.n_rows(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(tv: Vec<Option<f32>>, sales: Vec<Option<f32>>) -> RawFrame {
        RawFrame::new(vec![("TV".to_string(), tv), ("Sales".to_string(), sales)])
            .expect("valid raw frame")
    }

    #[test]
    fn test_new_rejects_ragged_columns() {
        let result = RawFrame::new(vec![
            ("a".to_string(), vec![Some(1.0)]),
            ("b".to_string(), vec![Some(1.0), Some(2.0)]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_new_rejects_duplicate_names() {
        let result = RawFrame::new(vec![
            ("a".to_string(), vec![Some(1.0)]),
            ("a".to_string(), vec![Some(2.0)]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_drop_duplicates_keeps_first_and_order() {
        let raw = frame(
            vec![Some(3.0), Some(1.0), Some(3.0), Some(2.0)],
            vec![Some(30.0), Some(10.0), Some(30.0), Some(20.0)],
        );
        let dedup = raw.drop_duplicates();
        assert_eq!(dedup.n_rows(), 3);
        assert_eq!(
            dedup.column("TV").expect("TV column"),
            &[Some(3.0), Some(1.0), Some(2.0)]
        );
    }

    #[test]
    fn test_missing_cells_compare_equal_for_dedup() {
        let raw = frame(vec![None, None], vec![Some(1.0), Some(1.0)]);
        assert_eq!(raw.drop_duplicates().n_rows(), 1);
    }

    #[test]
    fn test_signed_zero_is_duplicate() {
        let raw = frame(vec![Some(0.0), Some(-0.0)], vec![Some(1.0), Some(1.0)]);
        assert_eq!(raw.drop_duplicates().n_rows(), 1);
    }

    #[test]
    fn test_partial_duplicates_are_kept() {
        let raw = frame(vec![Some(1.0), Some(1.0)], vec![Some(1.0), Some(2.0)]);
        assert_eq!(raw.drop_duplicates().n_rows(), 2);
    }

    #[test]
    fn test_clean_summary_counts() {
        let raw = frame(
            vec![Some(1.0), Some(1.0), None, Some(4.0), None],
            vec![Some(1.0), Some(1.0), Some(2.0), Some(4.0), Some(2.0)],
        );
        let (clean, summary) = raw.clean();
        assert_eq!(summary.rows_in, 5);
        assert_eq!(summary.duplicates_removed, 2);
        assert_eq!(summary.incomplete_removed, 1);
        assert_eq!(summary.rows_out(), 2);
        assert_eq!(clean.n_rows(), 2);
        assert_eq!(clean.missing_count(), 0);
    }

    #[test]
    fn test_clean_is_idempotent() {
        let raw = frame(
            vec![Some(1.0), Some(1.0), None, Some(2.0)],
            vec![Some(5.0), Some(5.0), Some(6.0), None],
        );
        let (once, _) = raw.clean();
        let (twice, summary) = once.clean();
        assert_eq!(once, twice);
        assert_eq!(summary.duplicates_removed, 0);
        assert_eq!(summary.incomplete_removed, 0);
    }

    #[test]
    fn test_into_dataframe_requires_clean_frame() {
        let raw = frame(vec![Some(1.0), None], vec![Some(1.0), Some(2.0)]);
        assert!(raw.clone().into_dataframe().is_err());
        let df = raw.clean().0.into_dataframe().expect("clean frame converts");
        assert_eq!(df.shape(), (1, 2));
    }

    #[test]
    fn test_require_columns() {
        let raw = frame(vec![Some(1.0)], vec![Some(1.0)]);
        assert!(raw.require_columns(&["TV", "Sales"]).is_ok());
        assert!(matches!(
            raw.require_columns(&["TV", "Radio"]),
            Err(AdspendError::MissingColumn { name }) if name == "Radio"
        ));
    }

    #[test]
    fn test_roundtrip_from_dataframe() {
        let raw = frame(vec![Some(1.0), Some(2.0)], vec![Some(3.0), Some(4.0)]);
        let df = raw.clone().into_dataframe().expect("complete frame");
        assert_eq!(RawFrame::from(&df), raw);
    }
}
