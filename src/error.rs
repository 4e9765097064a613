//! Error handling module
//!
//! Provides unified error types for the load, annotate and analyze stages.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Input file not found or unreadable: {}", path.display())]
    InputNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed row in {} at line {line}: {reason}", path.display())]
    MalformedRow {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("Missing required column '{column}' in {}", path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("Table {table} holds {actual} rows after load, source had {expected}")]
    RowCountMismatch {
        table: String,
        expected: usize,
        actual: i64,
    },

    #[error("Schema conflict: {0}")]
    SchemaConflict(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Short machine-readable code, used in the final log line
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InputNotFound { .. } => "INPUT_NOT_FOUND",
            AppError::MalformedRow { .. } => "MALFORMED_ROW",
            AppError::MissingColumn { .. } => "MISSING_COLUMN",
            AppError::RowCountMismatch { .. } => "ROW_COUNT_MISMATCH",
            AppError::SchemaConflict(_) => "SCHEMA_CONFLICT",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Csv(_) => "CSV_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Log the error with its code before it is propagated out of `main`
    pub fn log(&self) {
        error!(code = self.code(), "{}", self);
    }
}

/// Result type alias for pipeline stages
pub type AppResult<T> = Result<T, AppError>;

/// Helper function to create a malformed row error
pub fn malformed_row(path: &Path, line: u64, reason: impl Into<String>) -> AppError {
    AppError::MalformedRow {
        path: path.to_path_buf(),
        line,
        reason: reason.into(),
    }
}

/// Helper function to create a schema conflict error
pub fn schema_conflict(msg: impl Into<String>) -> AppError {
    AppError::SchemaConflict(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_row_message_names_file_and_line() {
        let err = malformed_row(Path::new("results.csv"), 7, "bad date '1900-13-01'");
        assert_eq!(err.code(), "MALFORMED_ROW");
        assert_eq!(
            err.to_string(),
            "Malformed row in results.csv at line 7: bad date '1900-13-01'"
        );
    }

    #[test]
    fn test_row_count_mismatch_message() {
        let err = AppError::RowCountMismatch {
            table: "goalscorers".to_string(),
            expected: 3,
            actual: 2,
        };
        assert_eq!(err.code(), "ROW_COUNT_MISMATCH");
        assert_eq!(
            err.to_string(),
            "Table goalscorers holds 2 rows after load, source had 3"
        );
    }

    #[test]
    fn test_schema_conflict_code() {
        let err = schema_conflict("column match_key already exists on shootouts");
        assert_eq!(err.code(), "SCHEMA_CONFLICT");
        assert!(err.to_string().contains("match_key"));
    }
}
