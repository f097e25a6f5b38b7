//! Delimited-file loading and persistence.

use super::{DataFrame, RawFrame};
use crate::error::{AdspendError, Result};
use std::io::{Read, Write};
use std::path::Path;

/// Tokens treated as a missing cell (compared case-insensitively); the
/// default NA set of pandas `read_csv`.
const MISSING_TOKENS: &[&str] = &[
    "", "#n/a", "#n/a n/a", "#na", "-1.#ind", "-1.#qnan", "-nan", "1.#ind", "1.#qnan", "<na>",
    "n/a", "na", "nan", "null", "none",
];

/// A string-valued column appended after the numeric columns on write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelColumn {
    /// Header name.
    pub name: String,
    /// One value per row.
    pub values: Vec<String>,
}

/// Reads a comma-separated file with a header row.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or any cell fails to parse.
pub fn read_csv(path: impl AsRef<Path>) -> Result<RawFrame> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let frame = RawFrame::from_reader(file)?;
    tracing::info!(
        path = %path.display(),
        rows = frame.n_rows(),
        columns = frame.shape().1,
        "loaded dataset"
    );
    Ok(frame)
}

fn parse_cell(raw: &str, line: usize, column: &str) -> Result<Option<f32>> {
    if MISSING_TOKENS.iter().any(|t| raw.eq_ignore_ascii_case(t)) {
        return Ok(None);
    }
    match raw.parse::<f32>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(AdspendError::Parse {
            line,
            column: column.to_string(),
            value: raw.to_string(),
        }),
    }
}

impl RawFrame {
    /// Parses comma-separated data with a header row from any reader.
    ///
    /// Cells are trimmed. Empty cells and the pandas default NA markers
    /// (`NA`, `N/A`, `#N/A`, `<NA>`, `NaN`, `-nan`, `1.#IND`, `null`, `None`
    /// and the like) become missing. Infinities and any other non-numeric
    /// text are rejected.
    ///
    /// # Errors
    ///
    /// Returns `Parse` with the 1-based line and column name of the first bad
    /// cell, `Csv` for malformed records, or `EmptyInput` for a missing header.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() || headers.iter().all(String::is_empty) {
            return Err(AdspendError::empty_input("CSV has no header row"));
        }

        let mut columns: Vec<Vec<Option<f32>>> = vec![Vec::new(); headers.len()];
        for record in rdr.records() {
            let record = record?;
            let line = record.position().map_or(0, |p| p.line() as usize);
            for (idx, raw) in record.iter().enumerate() {
                columns[idx].push(parse_cell(raw, line, &headers[idx])?);
            }
        }

        Self::new(headers.into_iter().zip(columns).collect())
    }
}

/// Writes `frame` followed by `labels` to a comma-separated file.
///
/// # Errors
///
/// Returns an error if a label column's length differs from the frame's row
/// count, a label name clashes with a frame column, or the write fails.
pub fn write_csv(path: impl AsRef<Path>, frame: &DataFrame, labels: &[LabelColumn]) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)?;
    write_csv_to(file, frame, labels)?;
    tracing::info!(
        path = %path.display(),
        rows = frame.n_rows(),
        columns = frame.n_cols() + labels.len(),
        "wrote augmented dataset"
    );
    Ok(())
}

/// Writes `frame` followed by `labels` to any writer. No index column is emitted.
///
/// # Errors
///
/// See [`write_csv`].
pub fn write_csv_to<W: Write>(writer: W, frame: &DataFrame, labels: &[LabelColumn]) -> Result<()> {
    let names = frame.column_names();
    for label in labels {
        if label.values.len() != frame.n_rows() {
            return Err(AdspendError::dimension_mismatch(
                &format!("rows in label column '{}'", label.name),
                frame.n_rows(),
                label.values.len(),
            ));
        }
        if names.contains(&label.name.as_str()) {
            return Err(format!("label column '{}' clashes with a data column", label.name).into());
        }
    }

    let mut wtr = csv::Writer::from_writer(writer);
    let header: Vec<&str> = names
        .iter()
        .copied()
        .chain(labels.iter().map(|l| l.name.as_str()))
        .collect();
    wtr.write_record(&header)?;

    let columns: Vec<&[f32]> = frame.iter_columns().map(|(_, v)| v.as_slice()).collect();
    let mut record = Vec::with_capacity(header.len());
    for row in 0..frame.n_rows() {
        record.clear();
        record.extend(columns.iter().map(|col| col[row].to_string()));
        record.extend(labels.iter().map(|l| l.values[row].clone()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}
