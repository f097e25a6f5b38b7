//! Scores budget allocations through a fitted scaler and model.

use super::BudgetAllocation;
use crate::error::{AdspendError, Result};
use crate::preprocessing::StandardScaler;
use crate::primitives::Matrix;
use crate::traits::{Estimator, Transformer};
use serde::Serialize;

/// Predicted sales under two allocations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetComparison {
    pub current: f32,
    pub optimized: f32,
    /// `optimized - current`
    pub uplift: f32,
}

/// Predicts sales for a named budget.
///
/// The allocation is laid out in `channels` order (the order the scaler was
/// fitted on), scaled, then passed to the model. Names must match exactly.
#[derive(Debug, Clone)]
pub struct SalesPredictor<M> {
    channels: Vec<String>,
    scaler: StandardScaler,
    model: M,
}

impl<M: Estimator> SalesPredictor<M> {
    /// # Errors
    ///
    /// Returns `NotFitted` for an unfitted scaler and `DimensionMismatch`
    /// when the scaler width differs from the channel count.
    pub fn new(channels: Vec<String>, scaler: StandardScaler, model: M) -> Result<Self> {
        let n_features = scaler.n_features().ok_or(AdspendError::NotFitted {
            component: "StandardScaler",
        })?;
        if n_features != channels.len() {
            return Err(AdspendError::dimension_mismatch(
                "scaler features",
                channels.len(),
                n_features,
            ));
        }
        Ok(Self {
            channels,
            scaler,
            model,
        })
    }

    #[must_use]
    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    #[must_use]
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Predicted sales for one allocation.
    ///
    /// # Errors
    ///
    /// Returns `UnknownChannel` for a name outside the channel list,
    /// `MissingChannel` when a channel has no amount, and propagates
    /// scaler or model failures.
    pub fn predict(&self, budget: &BudgetAllocation) -> Result<f32> {
        if let Some(unknown) = budget
            .channels()
            .find(|name| !self.channels.iter().any(|c| c == name))
        {
            return Err(AdspendError::UnknownChannel {
                channel: unknown.to_string(),
                expected: self.channels.clone(),
            });
        }

        let row = self
            .channels
            .iter()
            .map(|channel| {
                budget
                    .get(channel)
                    .map(|amount| amount as f32)
                    .ok_or_else(|| AdspendError::MissingChannel {
                        channel: channel.clone(),
                    })
            })
            .collect::<Result<Vec<f32>>>()?;

        let features = Matrix::from_vec(1, row.len(), row)?;
        let scaled = self.scaler.transform(&features)?;
        let prediction = self.model.predict(&scaled)?;
        Ok(prediction[0])
    }

    /// Predicts both allocations and reports the difference.
    ///
    /// # Errors
    ///
    /// Propagates any [`predict`](Self::predict) failure.
    pub fn compare(
        &self,
        current: &BudgetAllocation,
        optimized: &BudgetAllocation,
    ) -> Result<BudgetComparison> {
        let current = self.predict(current)?;
        let optimized = self.predict(optimized)?;
        Ok(BudgetComparison {
            current,
            optimized,
            uplift: optimized - current,
        })
    }
}
