//! Error types for fitlab

use thiserror::Error;

/// Result type alias for fitlab operations
pub type Result<T> = std::result::Result<T, FitLabError>;

/// Main error type for fitlab
#[derive(Error, Debug)]
pub enum FitLabError {
    /// Schema or row-count violation caught before training
    #[error("Invalid data: {0}")]
    DataInvalid(String),

    /// The decision tree could not be fitted
    #[error("Training error: {0}")]
    Training(String),

    /// Nothing usable in the comparison cache; recompute
    #[error("Comparison cache miss")]
    CacheMiss,

    /// No stored model for the prediction path
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Invalid choice: {0}")]
    InvalidChoice(String),

    #[error("Cannot {action} from step {from}")]
    InvalidTransition { from: String, action: String },

    #[error("Data error: {0}")]
    Data(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    Shape { expected: String, actual: String },

    #[error("Model not fitted")]
    ModelNotFitted,
}

impl From<polars::error::PolarsError> for FitLabError {
    fn from(err: polars::error::PolarsError) -> Self {
        FitLabError::Data(err.to_string())
    }
}

impl From<serde_json::Error> for FitLabError {
    fn from(err: serde_json::Error) -> Self {
        FitLabError::Serialization(err.to_string())
    }
}

impl From<ndarray::ShapeError> for FitLabError {
    fn from(err: ndarray::ShapeError) -> Self {
        FitLabError::Shape {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for FitLabError {
    fn from(err: reqwest::Error) -> Self {
        FitLabError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FitLabError::DataInvalid("only 12 rows".to_string());
        assert_eq!(err.to_string(), "Invalid data: only 12 rows");

        let err = FitLabError::InvalidTransition {
            from: "Start".to_string(),
            action: "retreat".to_string(),
        };
        assert_eq!(err.to_string(), "Cannot retreat from step Start");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FitLabError = io_err.into();
        assert!(matches!(err, FitLabError::Io(_)));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: FitLabError = json_err.into();
        assert!(matches!(err, FitLabError::Serialization(_)));
    }
}
