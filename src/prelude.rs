//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use adspend::prelude::*;
//! ```

pub use crate::budget::{BudgetAllocation, BudgetOptimizer, SalesPredictor};
pub use crate::data::{DataFrame, RawFrame};
pub use crate::error::AdspendError;
pub use crate::linear_model::LinearRegression;
pub use crate::metrics::{evaluate, mae, mse, r_squared, rmse, RegressionMetrics};
pub use crate::preprocessing::StandardScaler;
pub use crate::primitives::{Matrix, Vector};
pub use crate::traits::{Estimator, Transformer};
pub use crate::tree::{MaxFeatures, RandomForestRegressor};
