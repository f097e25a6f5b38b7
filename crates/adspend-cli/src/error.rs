//! Error types for the adspend CLI

use adspend::AdspendError;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// Result type alias for CLI operations
pub(crate) type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub(crate) enum CliError {
    /// Input file not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// The dataset could not be parsed or lacks required columns
    #[error("Invalid dataset: {0}")]
    InvalidData(String),

    /// Config file or flag values rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Any failure inside the analysis itself
    #[error("Analysis failed: {0}")]
    Analysis(String),
}

impl CliError {
    /// Numeric process status for this error
    pub(crate) fn code(&self) -> u8 {
        match self {
            Self::FileNotFound(_) => 3,
            Self::InvalidData(_) => 4,
            Self::InvalidConfig(_) => 5,
            Self::Io(_) => 7,
            Self::Json(_) => 8,
            Self::Analysis(_) => 1,
        }
    }

    /// Get exit code for this error
    pub(crate) fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }
}

impl From<AdspendError> for CliError {
    fn from(e: AdspendError) -> Self {
        match e {
            AdspendError::Io(io) => Self::Io(io),
            AdspendError::Json(json) => Self::InvalidConfig(json.to_string()),
            AdspendError::InvalidHyperparameter { .. } | AdspendError::DuplicateChannel { .. } => {
                Self::InvalidConfig(e.to_string())
            }
            AdspendError::Csv(_)
            | AdspendError::Parse { .. }
            | AdspendError::MissingColumn { .. }
            | AdspendError::EmptyInput { .. } => Self::InvalidData(e.to_string()),
            other => Self::Analysis(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_is_invalid_data() {
        let err: CliError = AdspendError::MissingColumn {
            name: "TV".into(),
        }
        .into();
        assert!(matches!(err, CliError::InvalidData(_)));
        assert_eq!(err.code(), 4);
    }

    #[test]
    fn test_hyperparameter_is_invalid_config() {
        let err: CliError = AdspendError::invalid_hyperparameter("cv_folds", 1, ">= 2").into();
        assert!(matches!(err, CliError::InvalidConfig(_)));
        assert!(err.to_string().contains("cv_folds"));
    }

    #[test]
    fn test_io_error_keeps_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: CliError = AdspendError::Io(io).into();
        assert!(matches!(err, CliError::Io(ref e) if e.kind() == std::io::ErrorKind::PermissionDenied));
    }

    #[test]
    fn test_singular_matrix_is_analysis_failure() {
        let err: CliError = AdspendError::SingularMatrix.into();
        assert_eq!(err.code(), 1);
    }
}
