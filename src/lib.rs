//! Adspend: advertising-spend modelling in pure Rust.
//!
//! Cleans a channel-spend dataset, compares an OLS baseline with a random
//! forest, tunes the forest by cross-validated grid search, explains it with
//! feature importances and Shapley values, reallocates a fixed budget from
//! those importances and summarises median-split A/B groups.
//!
//! # Quick Start
//!
//! ```
//! use adspend::prelude::*;
//!
//! // Create training data (sales = 0.05 * tv + 3)
//! let x = Matrix::from_vec(4, 1, vec![
//!     100.0,
//!     200.0,
//!     300.0,
//!     400.0,
//! ]).unwrap();
//! let y = Vector::from_slice(&[8.0, 13.0, 18.0, 23.0]);
//!
//! // Train linear regression
//! let mut model = LinearRegression::new();
//! model.fit(&x, &y).unwrap();
//!
//! // Make predictions
//! let predictions = model.predict(&x).unwrap();
//! let r2 = model.score(&x, &y).unwrap();
//! assert_eq!(predictions.len(), 4);
//! assert!(r2 > 0.99);
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Core Vector and Matrix types
//! - [`data`]: DataFrame, nullable raw frame, cleaning and CSV I/O
//! - [`stats`]: Median, quantiles, covariance and correlation
//! - [`eda`]: Correlation matrix and per-channel trend lines
//! - [`preprocessing`]: Standard scaling
//! - [`linear_model`]: Ordinary least squares
//! - [`tree`]: Regression trees and the random forest
//! - [`metrics`]: R², MAE, RMSE and single-pass evaluation
//! - [`model_selection`]: Train/test split, K-fold CV and forest grid search
//! - [`interpret`]: Feature importances and SHAP values
//! - [`budget`]: Budget optimisation and sales prediction
//! - [`experiment`]: Median-split A/B summaries
//! - [`pipeline`]: Configuration and end-to-end orchestration

pub mod budget;
pub mod data;
pub mod eda;
pub mod error;
pub mod experiment;
pub mod interpret;
pub mod linear_model;
pub mod metrics;
pub mod model_selection;
pub mod pipeline;
pub mod prelude;
pub mod preprocessing;
pub mod primitives;
pub mod stats;
pub mod traits;
pub mod tree;

pub use error::{AdspendError, Result};
pub use primitives::{Matrix, Vector};
pub use traits::{Estimator, Transformer};
