//! Exploratory summaries: the data behind the heatmap and regression plots.

use crate::data::{CleaningSummary, ColumnStats, DataFrame, RawFrame};
use crate::error::{AdspendError, Result};
use crate::stats::covariance::pearson;
use serde::Serialize;

/// Pairwise Pearson correlations of every column of a frame.
///
/// A pair involving a constant column is NaN, including its diagonal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub names: Vec<String>,
    /// Row-major, `names.len()` rows of `names.len()` values
    pub values: Vec<Vec<f32>>,
}

impl CorrelationMatrix {
    /// # Errors
    ///
    /// Returns `EmptyInput` for a frame with fewer than two rows.
    pub fn from_frame(frame: &DataFrame) -> Result<Self> {
        if frame.n_rows() < 2 {
            return Err(AdspendError::empty_input(
                "correlation needs at least two rows",
            ));
        }
        let columns: Vec<(&str, &[f32])> = frame
            .iter_columns()
            .map(|(name, values)| (name, values.as_slice()))
            .collect();

        let values = columns
            .iter()
            .map(|(_, a)| {
                columns
                    .iter()
                    .map(|(_, b)| pearson(a, b).unwrap_or(f32::NAN))
                    .collect()
            })
            .collect::<Vec<Vec<f32>>>();

        for (i, (name, _)) in columns.iter().enumerate() {
            if values[i][i].is_nan() {
                tracing::warn!(column = %name, "constant column; correlations are undefined");
            }
        }

        Ok(Self {
            names: columns.iter().map(|(name, _)| (*name).to_string()).collect(),
            values,
        })
    }

    /// Correlation between two named columns.
    #[must_use]
    pub fn get(&self, a: &str, b: &str) -> Option<f32> {
        let i = self.names.iter().position(|n| n == a)?;
        let j = self.names.iter().position(|n| n == b)?;
        Some(self.values[i][j])
    }
}

/// Least-squares line of the target against one channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelTrend {
    pub channel: String,
    pub slope: f32,
    pub intercept: f32,
    pub r_squared: f32,
}

impl ChannelTrend {
    /// Fits `target = slope * channel + intercept`.
    ///
    /// A constant channel gets a flat line through the target mean and an
    /// R² of 0.
    ///
    /// # Errors
    ///
    /// Returns `MissingColumn` for an absent column and `EmptyInput` for an
    /// empty frame.
    pub fn fit(frame: &DataFrame, channel: &str, target: &str) -> Result<Self> {
        let x = frame.column(channel)?.as_slice();
        let y = frame.column(target)?.as_slice();
        if x.is_empty() {
            return Err(AdspendError::empty_input("trend needs at least one row"));
        }

        let n = x.len() as f64;
        let x_mean = x.iter().map(|&v| f64::from(v)).sum::<f64>() / n;
        let y_mean = y.iter().map(|&v| f64::from(v)).sum::<f64>() / n;
        let (sxy, sxx, syy) = x.iter().zip(y).fold((0.0, 0.0, 0.0), |(sxy, sxx, syy), (&xi, &yi)| {
            let dx = f64::from(xi) - x_mean;
            let dy = f64::from(yi) - y_mean;
            (sxy + dx * dy, sxx + dx * dx, syy + dy * dy)
        });

        let (slope, r_squared) = if sxx > 0.0 {
            let slope = sxy / sxx;
            let r2 = if syy > 0.0 { sxy * sxy / (sxx * syy) } else { 0.0 };
            (slope, r2)
        } else {
            (0.0, 0.0)
        };

        Ok(Self {
            channel: channel.to_string(),
            slope: slope as f32,
            intercept: (y_mean - slope * x_mean) as f32,
            r_squared: r_squared as f32,
        })
    }
}

/// Everything the exploratory pass reports about a dataset.
#[derive(Debug, Clone, Serialize)]
pub struct EdaReport {
    pub cleaning: CleaningSummary,
    pub describe: Vec<ColumnStats>,
    pub correlation: CorrelationMatrix,
    pub trends: Vec<ChannelTrend>,
}

impl EdaReport {
    /// Cleans `raw` and summarises the result.
    ///
    /// # Errors
    ///
    /// Returns an error when a channel or the target is missing, or when
    /// cleaning leaves fewer than two rows.
    pub fn from_raw(raw: &RawFrame, channels: &[String], target: &str) -> Result<Self> {
        let mut required: Vec<&str> = channels.iter().map(String::as_str).collect();
        required.push(target);
        raw.require_columns(&required)?;

        let (clean, cleaning) = raw.clean();
        let frame = clean.into_dataframe()?;
        Self::from_frame(&frame, cleaning, channels, target)
    }

    /// Summarises an already-clean frame.
    ///
    /// # Errors
    ///
    /// Returns an error when a channel or the target is missing, or the
    /// frame has fewer than two rows.
    pub fn from_frame(
        frame: &DataFrame,
        cleaning: CleaningSummary,
        channels: &[String],
        target: &str,
    ) -> Result<Self> {
        let correlation = CorrelationMatrix::from_frame(frame)?;
        let trends = channels
            .iter()
            .map(|channel| ChannelTrend::fit(frame, channel, target))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            cleaning,
            describe: frame.describe(),
            correlation,
            trends,
        })
    }
}
