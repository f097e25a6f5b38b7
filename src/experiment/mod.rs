//! Median-split A/B grouping per advertising channel.
//!
//! For every channel the rows are labelled [`AbGroup::A`] when their spend is
//! strictly above that channel's median and [`AbGroup::B`] otherwise, and the
//! target is averaged per group. The summary is descriptive: no significance
//! test is run.
//!
//! # Example
//!
//! ```
//! use adspend::data::DataFrame;
//! use adspend::experiment::{AbGroup, AbSimulator};
//! use adspend::primitives::Vector;
//!
//! let frame = DataFrame::new(vec![
//!     ("TV".to_string(), Vector::from_slice(&[10.0, 20.0, 30.0, 40.0])),
//!     ("Sales".to_string(), Vector::from_slice(&[1.0, 2.0, 3.0, 4.0])),
//! ]).unwrap();
//!
//! let ab = AbSimulator::new(vec!["TV".to_string()], "Sales").run(&frame).unwrap();
//! let tv = ab.get("TV").unwrap();
//! assert_eq!(tv.labels, vec![AbGroup::B, AbGroup::B, AbGroup::A, AbGroup::A]);
//! assert_eq!(tv.a_mean, Some(3.5));
//! ```

use crate::data::{DataFrame, LabelColumn};
use crate::error::{AdspendError, Result};
use crate::stats::median_f64;
use serde::Serialize;
use std::fmt;

/// Suffix of the persisted label column, e.g. `TV_Test_Group`.
pub const LABEL_SUFFIX: &str = "_Test_Group";

/// Test group of one row for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AbGroup {
    /// Spend strictly above the channel median
    A,
    /// Spend at or below the channel median
    B,
}

impl fmt::Display for AbGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::A => "A",
            Self::B => "B",
        })
    }
}

/// Grouped outcome for one channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelAbResult {
    pub channel: String,
    /// Channel median over every row of the frame
    pub median: f64,
    /// One label per row, in frame order
    #[serde(skip)]
    pub labels: Vec<AbGroup>,
    pub a_count: usize,
    pub b_count: usize,
    /// Mean target of group A; `None` when the group is empty
    pub a_mean: Option<f32>,
    /// Mean target of group B; `None` when the group is empty
    pub b_mean: Option<f32>,
}

impl ChannelAbResult {
    /// Name of the persisted label column.
    #[must_use]
    pub fn label_column_name(&self) -> String {
        format!("{}{LABEL_SUFFIX}", self.channel)
    }
}

/// Per-channel A/B summaries over one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbExperiment {
    pub target: String,
    pub results: Vec<ChannelAbResult>,
}

impl AbExperiment {
    #[must_use]
    pub fn get(&self, channel: &str) -> Option<&ChannelAbResult> {
        self.results.iter().find(|r| r.channel == channel)
    }

    /// Label columns in channel order, ready for
    /// [`write_csv`](crate::data::write_csv).
    #[must_use]
    pub fn label_columns(&self) -> Vec<LabelColumn> {
        self.results
            .iter()
            .map(|r| LabelColumn {
                name: r.label_column_name(),
                values: r.labels.iter().map(ToString::to_string).collect(),
            })
            .collect()
    }
}

/// Median-split grouping over a fixed channel list.
#[derive(Debug, Clone)]
pub struct AbSimulator {
    channels: Vec<String>,
    target: String,
}

impl AbSimulator {
    #[must_use]
    pub fn new(channels: Vec<String>, target: impl Into<String>) -> Self {
        Self {
            channels,
            target: target.into(),
        }
    }

    /// Labels every row per channel and averages the target per group.
    ///
    /// # Errors
    ///
    /// Returns `MissingColumn` for an absent channel or target column and
    /// `EmptyInput` for a frame without rows.
    pub fn run(&self, frame: &DataFrame) -> Result<AbExperiment> {
        if frame.n_rows() == 0 {
            return Err(AdspendError::empty_input("A/B split needs at least one row"));
        }
        let target = frame.column(&self.target)?.as_slice();

        let mut results = Vec::with_capacity(self.channels.len());
        for channel in &self.channels {
            let spend = frame.column(channel)?.as_slice();
            let median = median_f64(spend)?;
            let labels: Vec<AbGroup> = spend
                .iter()
                .map(|&v| if f64::from(v) > median { AbGroup::A } else { AbGroup::B })
                .collect();

            let (a_count, a_mean) = group_mean(&labels, target, AbGroup::A);
            let (b_count, b_mean) = group_mean(&labels, target, AbGroup::B);
            tracing::debug!(%channel, median, a_count, b_count, "A/B split");

            results.push(ChannelAbResult {
                channel: channel.clone(),
                median,
                labels,
                a_count,
                b_count,
                a_mean,
                b_mean,
            });
        }

        Ok(AbExperiment {
            target: self.target.clone(),
            results,
        })
    }
}

fn group_mean(labels: &[AbGroup], target: &[f32], group: AbGroup) -> (usize, Option<f32>) {
    let (count, sum) = labels
        .iter()
        .zip(target)
        .filter(|(label, _)| **label == group)
        .fold((0_usize, 0.0_f64), |(n, s), (_, &y)| (n + 1, s + f64::from(y)));
    let mean = (count > 0).then(|| (sum / count as f64) as f32);
    (count, mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Vector;

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            ("TV".into(), Vector::from_slice(&[5.0, 1.0, 3.0, 3.0, 9.0])),
            ("Radio".into(), Vector::from_slice(&[2.0, 2.0, 2.0, 2.0, 2.0])),
            ("Sales".into(), Vector::from_slice(&[10.0, 2.0, 6.0, 7.0, 20.0])),
        ])
        .expect("valid")
    }

    fn sim() -> AbSimulator {
        AbSimulator::new(vec!["TV".into(), "Radio".into()], "Sales")
    }

    #[test]
    fn test_strictly_greater_than_median_is_a() {
        let ab = sim().run(&frame()).expect("run");
        let tv = ab.get("TV").expect("tv");
        assert_eq!(tv.median, 3.0);
        // ties with the median land in B
        assert_eq!(
            tv.labels,
            vec![AbGroup::A, AbGroup::B, AbGroup::B, AbGroup::B, AbGroup::A]
        );
        assert_eq!((tv.a_count, tv.b_count), (2, 3));
        assert_eq!(tv.a_mean, Some(15.0));
        assert_eq!(tv.b_mean, Some(5.0));
    }

    #[test]
    fn test_constant_channel_has_empty_a_group() {
        let ab = sim().run(&frame()).expect("run");
        let radio = ab.get("Radio").expect("radio");
        assert_eq!(radio.a_count, 0);
        assert_eq!(radio.a_mean, None);
        assert_eq!(radio.b_mean, Some(9.0));
    }

    #[test]
    fn test_even_count_uses_midpoint_median() {
        let df = DataFrame::new(vec![
            ("TV".into(), Vector::from_slice(&[1.0, 2.0, 4.0, 8.0])),
            ("Sales".into(), Vector::from_slice(&[1.0, 1.0, 3.0, 5.0])),
        ])
        .expect("valid");
        let ab = AbSimulator::new(vec!["TV".into()], "Sales").run(&df).expect("run");
        let tv = ab.get("TV").expect("tv");
        assert_eq!(tv.median, 3.0);
        assert_eq!(tv.a_mean, Some(4.0));
        assert_eq!(tv.b_mean, Some(1.0));
    }

    #[test]
    fn test_label_columns() {
        let ab = sim().run(&frame()).expect("run");
        let cols = ab.label_columns();
        assert_eq!(cols.len(), 2);
        assert_eq!(cols[0].name, "TV_Test_Group");
        assert_eq!(cols[0].values, vec!["A", "B", "B", "B", "A"]);
        assert_eq!(cols[1].name, "Radio_Test_Group");
        assert!(cols[1].values.iter().all(|v| v == "B"));
    }

    #[test]
    fn test_missing_columns_fail() {
        let err = AbSimulator::new(vec!["Billboard".into()], "Sales")
            .run(&frame())
            .unwrap_err();
        assert!(matches!(err, AdspendError::MissingColumn { .. }));
        assert!(AbSimulator::new(vec!["TV".into()], "Revenue")
            .run(&frame())
            .is_err());
    }
}
