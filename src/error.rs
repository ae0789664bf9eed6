//! Error types for loading and aggregating vacancy data.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading the source file or building posting records.
#[derive(Debug, Error)]
pub enum StatsError {
    /// Input file does not exist.
    #[error("source file not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// Input file exists but could not be opened or parsed as CSV.
    #[error("failed to read {path}: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Header lacks a column every record needs.
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: &'static str, path: PathBuf },

    /// Currency code missing from the conversion table.
    #[error("unknown currency code '{code}'")]
    UnknownCurrency { code: String },

    /// Salary bound that is not a number.
    #[error("malformed salary bound '{value}'")]
    MalformedSalary { value: String },

    /// Publication timestamp that does not parse.
    #[error("malformed timestamp '{value}'")]
    MalformedTimestamp { value: String },

    /// A column needed to build a record is absent from the row.
    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },
}

impl StatsError {
    /// Returns `true` for failures tied to a single row's content rather than the source as a whole.
    pub fn is_row_error(&self) -> bool {
        matches!(
            self,
            StatsError::UnknownCurrency { .. }
                | StatsError::MalformedSalary { .. }
                | StatsError::MalformedTimestamp { .. }
                | StatsError::MissingField { .. }
        )
    }
}

/// Result type for dataset operations.
pub type Result<T> = std::result::Result<T, StatsError>;
