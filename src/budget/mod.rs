//! Budget allocation across advertising channels.
//!
//! [`BudgetOptimizer`] turns normalised feature importances into a
//! reallocation of a fixed total budget, and [`SalesPredictor`] scores any
//! allocation through the fitted scaler and model.
//!
//! # Example
//!
//! ```
//! use adspend::budget::BudgetOptimizer;
//! use adspend::interpret::FeatureImportances;
//!
//! let names: Vec<String> = ["TV", "Radio", "Newspaper"].iter().map(|s| s.to_string()).collect();
//! let importances = FeatureImportances::from_scores(&names, &[0.6, 0.3, 0.1]).unwrap();
//!
//! let optimized = BudgetOptimizer::new(100_000.0).optimize(&importances).unwrap();
//! assert!((optimized.allocation.total() - 100_000.0).abs() < 1e-6);
//! assert!((optimized.allocation.get("TV").unwrap() - 78_260.87).abs() < 0.01);
//! ```

mod predictor;

pub use predictor::{BudgetComparison, SalesPredictor};

use crate::error::{AdspendError, Result};
use crate::interpret::FeatureImportances;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

/// Spend per channel, in channel order.
///
/// Channel names are unique and amounts are finite and non-negative.
/// Serialises as a JSON object whose keys keep that order.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetAllocation {
    entries: Vec<(String, f64)>,
}

impl BudgetAllocation {
    /// Builds an allocation from `(channel, amount)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateChannel` for a repeated name, or an error for a
    /// negative or non-finite amount.
    pub fn new<S: Into<String>>(entries: impl IntoIterator<Item = (S, f64)>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut checked = Vec::new();
        for (channel, amount) in entries {
            let channel = channel.into();
            if !seen.insert(channel.clone()) {
                return Err(AdspendError::DuplicateChannel { channel });
            }
            if !amount.is_finite() || amount < 0.0 {
                return Err(format!(
                    "channel '{channel}' has invalid amount {amount}; amounts must be finite and >= 0"
                )
                .into());
            }
            checked.push((channel, amount));
        }
        Ok(Self { entries: checked })
    }

    /// Splits `total` evenly over `channels`.
    ///
    /// # Errors
    ///
    /// Returns an error for no channels, duplicates, or an invalid total.
    pub fn equal_split(channels: &[String], total: f64) -> Result<Self> {
        if channels.is_empty() {
            return Err(AdspendError::empty_input("cannot split a budget over zero channels"));
        }
        let share = total / channels.len() as f64;
        Self::new(channels.iter().map(|c| (c.clone(), share)))
    }

    /// Amount for `channel`.
    #[must_use]
    pub fn get(&self, channel: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(name, _)| name == channel)
            .map(|&(_, amount)| amount)
    }

    /// Sum over all channels.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, amount)| amount).sum()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(name, amount)| (name.as_str(), *amount))
    }
}

impl Serialize for BudgetAllocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (channel, amount) in &self.entries {
            map.serialize_entry(channel, amount)?;
        }
        map.end()
    }
}

impl fmt::Display for BudgetAllocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|(channel, amount)| format!("{channel}: {amount:.2}"))
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

/// Numeric degeneracy met while optimising; the optimizer recovers from
/// each one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BudgetDiagnostic {
    /// A raw score was NaN or infinite and was replaced by 0.
    InvalidScore { channel: String },
    /// Every raw score was 0, so the budget was split evenly.
    ZeroSumFallback,
}

impl fmt::Display for BudgetDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidScore { channel } => {
                write!(f, "invalid value encountered for {channel}; setting it to 0")
            }
            Self::ZeroSumFallback => {
                f.write_str("total optimized budget is zero; defaulting to equal distribution")
            }
        }
    }
}

/// Output of [`BudgetOptimizer::optimize`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizedBudget {
    /// Final allocation, summing to the total budget
    pub allocation: BudgetAllocation,
    /// `total * w²` per channel after invalid values were zeroed
    pub raw_scores: Vec<f64>,
    pub diagnostics: Vec<BudgetDiagnostic>,
}

/// Reallocates a fixed budget in proportion to squared importance.
///
/// Each channel scores `total * w²`; NaN or infinite scores become 0.
/// Scores are then rescaled to sum to `total`, or split evenly when they
/// are all 0. Squaring favours the dominant channel over a linear split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetOptimizer {
    total_budget: f64,
}

impl BudgetOptimizer {
    #[must_use]
    pub fn new(total_budget: f64) -> Self {
        Self { total_budget }
    }

    #[must_use]
    pub fn total_budget(&self) -> f64 {
        self.total_budget
    }

    /// Allocates the budget using normalised importances.
    ///
    /// # Errors
    ///
    /// Returns an error for a negative or non-finite total.
    pub fn optimize(&self, importances: &FeatureImportances) -> Result<OptimizedBudget> {
        let weights: Vec<f64> = importances.values().iter().map(|&w| f64::from(w)).collect();
        self.optimize_weights(importances.names(), &weights)
    }

    /// Allocates the budget over `channels` given one weight each.
    ///
    /// # Errors
    ///
    /// Returns an error for mismatched lengths, no channels, duplicate
    /// channels, or a negative or non-finite total.
    pub fn optimize_weights(&self, channels: &[String], weights: &[f64]) -> Result<OptimizedBudget> {
        if channels.len() != weights.len() {
            return Err(AdspendError::dimension_mismatch(
                "channel weights",
                channels.len(),
                weights.len(),
            ));
        }
        if channels.is_empty() {
            return Err(AdspendError::empty_input("no channels to allocate"));
        }
        if !self.total_budget.is_finite() || self.total_budget < 0.0 {
            return Err(AdspendError::invalid_hyperparameter(
                "total_budget",
                self.total_budget,
                "a finite amount >= 0",
            ));
        }

        let mut diagnostics = Vec::new();
        let raw_scores: Vec<f64> = channels
            .iter()
            .zip(weights)
            .map(|(channel, &w)| {
                let raw = self.total_budget * w.powi(2);
                if raw.is_finite() {
                    raw
                } else {
                    tracing::warn!(%channel, "invalid raw budget score; setting it to 0");
                    diagnostics.push(BudgetDiagnostic::InvalidScore {
                        channel: channel.clone(),
                    });
                    0.0
                }
            })
            .collect();

        let raw_total: f64 = raw_scores.iter().sum();
        let allocation = if raw_total == 0.0 {
            tracing::warn!("raw budget scores sum to zero; splitting the budget evenly");
            diagnostics.push(BudgetDiagnostic::ZeroSumFallback);
            BudgetAllocation::equal_split(channels, self.total_budget)?
        } else {
            BudgetAllocation::new(
                channels
                    .iter()
                    .zip(&raw_scores)
                    .map(|(channel, &raw)| (channel.clone(), raw / raw_total * self.total_budget)),
            )?
        };

        Ok(OptimizedBudget {
            allocation,
            raw_scores,
            diagnostics,
        })
    }
}
