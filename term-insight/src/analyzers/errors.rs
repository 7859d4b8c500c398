//! Error types for the analyzer framework.

use thiserror::Error;

/// Result type for analyzer operations.
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// Errors that can occur while building a dataset or running an analysis.
///
/// Only structural problems with the input abort a run. Insufficient data and
/// numeric degeneracies are absorbed by the individual analyzers and never
/// surface here.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// The dataset has no columns.
    #[error("Dataset has no columns")]
    EmptyDataset,

    /// The dataset has columns but no rows.
    #[error("Dataset has no rows")]
    NoRows,

    /// A column's length differs from the first column's length.
    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Two columns share the same name.
    #[error("Duplicate column name '{0}'")]
    DuplicateColumn(String),

    /// The configured temporal column does not exist.
    #[error("Temporal column '{0}' not found in dataset")]
    TemporalColumnNotFound(String),

    /// The configured temporal column did not classify as temporal.
    #[error("Column '{0}' is not a temporal column")]
    NotTemporal(String),

    /// Invalid configuration or parameters.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Arrow conversion error while ingesting a record batch.
    #[error("Arrow conversion failed: {0}")]
    ArrowConversion(#[from] arrow::error::ArrowError),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A background analysis task failed to complete.
    #[error("Execution error: {0}")]
    Execution(String),
}

impl AnalyzerError {
    /// Creates an invalid configuration error with the given message.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Creates an execution error with the given message.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Returns true for errors caused by the structure of the input dataset.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyDataset
                | Self::NoRows
                | Self::ColumnLengthMismatch { .. }
                | Self::DuplicateColumn(_)
                | Self::TemporalColumnNotFound(_)
                | Self::NotTemporal(_)
        )
    }
}

/// Converts serde_json errors to AnalyzerError.
impl From<serde_json::Error> for AnalyzerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_classification() {
        assert!(AnalyzerError::EmptyDataset.is_input_error());
        assert!(AnalyzerError::NoRows.is_input_error());
        assert!(AnalyzerError::TemporalColumnNotFound("ts".into()).is_input_error());
        assert!(AnalyzerError::NotTemporal("ts".into()).is_input_error());
        assert!(!AnalyzerError::invalid_config("bad").is_input_error());
        assert!(!AnalyzerError::execution("join").is_input_error());
    }

    #[test]
    fn test_error_messages() {
        let err = AnalyzerError::ColumnLengthMismatch {
            column: "price".to_string(),
            expected: 3,
            actual: 2,
        };
        assert_eq!(err.to_string(), "Column 'price' has 2 rows, expected 3");
        assert_eq!(
            AnalyzerError::DuplicateColumn("id".into()).to_string(),
            "Duplicate column name 'id'"
        );
    }

    #[test]
    fn test_from_serde_json() {
        let err = serde_json::from_str::<u32>("not json").unwrap_err();
        let converted: AnalyzerError = err.into();
        assert!(matches!(converted, AnalyzerError::Serialization(_)));
    }
}
