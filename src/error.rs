//! Error types for adspend operations.
//!
//! Shape and contract violations surface here as hard failures. Numeric
//! degeneracies (zero variance, zero-sum weights) are reported as diagnostics
//! by the stage that meets them and never become an `AdspendError`.

use thiserror::Error;

/// Main error type for adspend operations.
///
/// # Examples
///
/// ```
/// use adspend::error::AdspendError;
///
/// let err = AdspendError::DimensionMismatch {
///     expected: "100x3".to_string(),
///     actual: "100x2".to_string(),
/// };
/// assert!(err.to_string().contains("dimension mismatch"));
/// ```
#[derive(Debug, Error)]
pub enum AdspendError {
    /// Matrix/vector dimensions don't match for the operation.
    #[error("Matrix dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// An operation received no rows (or no columns) to work on.
    #[error("empty input: {context}")]
    EmptyInput {
        /// What was empty
        context: String,
    },

    /// A required column is absent from a table.
    #[error("missing required column '{name}'")]
    MissingColumn {
        /// Column name
        name: String,
    },

    /// A budget allocation lacks one of the model's channels.
    #[error("budget allocation is missing channel '{channel}'")]
    MissingChannel {
        /// Channel name
        channel: String,
    },

    /// A budget allocation names a channel the model was not trained on.
    #[error("unknown channel '{channel}' (expected one of {expected:?})")]
    UnknownChannel {
        /// Channel name supplied by the caller
        channel: String,
        /// Channels the model knows about, in column order
        expected: Vec<String>,
    },

    /// The same channel appears twice in an allocation.
    #[error("channel '{channel}' appears more than once")]
    DuplicateChannel {
        /// Channel name
        channel: String,
    },

    /// Invalid hyperparameter value provided.
    #[error("Invalid hyperparameter: {param} = {value}, expected {constraint}")]
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// A model or transformer was used before `fit`.
    #[error("{component} is not fitted, call fit() first")]
    NotFitted {
        /// Component name
        component: &'static str,
    },

    /// Matrix is singular (non-invertible).
    #[error("Singular matrix detected, cannot solve normal equations")]
    SingularMatrix,

    /// A delimited-file cell could not be parsed as a number.
    #[error("line {line}, column '{column}': cannot parse {value:?} as a number")]
    Parse {
        /// 1-based line number (header is line 1)
        line: usize,
        /// Column name
        column: String,
        /// Raw cell content
        value: String,
    },

    /// Delimited-file reader/writer error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with string message.
    #[error("{0}")]
    Other(String),
}

impl From<&str> for AdspendError {
    fn from(msg: &str) -> Self {
        AdspendError::Other(msg.to_string())
    }
}

impl From<String> for AdspendError {
    fn from(msg: String) -> Self {
        AdspendError::Other(msg)
    }
}

impl AdspendError {
    /// Create a dimension mismatch error with descriptive context
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    /// Create an empty input error
    #[must_use]
    pub fn empty_input(context: &str) -> Self {
        Self::EmptyInput {
            context: context.to_string(),
        }
    }

    /// Create an invalid hyperparameter error
    #[must_use]
    pub fn invalid_hyperparameter(
        param: &str,
        value: impl std::fmt::Display,
        constraint: &str,
    ) -> Self {
        Self::InvalidHyperparameter {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, AdspendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_display() {
        let err = AdspendError::dimension_mismatch("rows", 10, 8);
        let msg = err.to_string();
        assert!(msg.contains("rows=10"));
        assert!(msg.contains('8'));
    }

    #[test]
    fn test_unknown_channel_lists_expected() {
        let err = AdspendError::UnknownChannel {
            channel: "Radioo".to_string(),
            expected: vec!["TV".to_string(), "Radio".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("Radioo"));
        assert!(msg.contains("\"TV\""));
    }

    #[test]
    fn test_from_str_and_string() {
        let a: AdspendError = "boom".into();
        let b: AdspendError = String::from("boom").into();
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn test_io_error_source() {
        use std::error::Error as _;
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = AdspendError::from(io);
        assert!(err.source().is_some());
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_parse_error_display() {
        let err = AdspendError::Parse {
            line: 4,
            column: "TV".to_string(),
            value: "abc".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "line 4, column 'TV': cannot parse \"abc\" as a number"
        );
    }
}
