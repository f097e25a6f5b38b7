//! Core compute primitives (Vector, Matrix).
//!
//! These types carry every numeric table through the pipeline: feature
//! matrices, target vectors, predictions and attribution values.

mod matrix;
mod vector;

pub use matrix::Matrix;
pub use vector::Vector;
