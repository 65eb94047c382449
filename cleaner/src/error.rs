//! Error types for the Arachnid cleaning pipeline.
//!
//! One error type per layer:
//!
//! - [`CsvError`] - reading and decoding the export file
//! - [`MappingError`] - building or loading a field mapping
//! - [`TransformError`] - cleaning a single raw record
//! - [`PipelineError`] - top-level orchestration
//!
//! Conversions are provided via `From` so `?` works across layer boundaries.

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// CSV Reading Errors
// =============================================================================

/// Errors while reading a CSV export.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV content.
    #[error("Line {line}: {message}")]
    Parse { line: u64, message: String },

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// The csv reader only accepts single-byte delimiters.
    #[error("Delimiter '{0}' is not a single-byte character")]
    InvalidDelimiter(char),

    /// Header line present but without any column name.
    #[error("No headers found in CSV")]
    NoHeaders,

    /// The file ended inside the preamble block.
    #[error("Expected {expected} preamble rows after the header, found {found}")]
    TruncatedPreamble { expected: usize, found: usize },
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        CsvError::Parse {
            line,
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Mapping Errors
// =============================================================================

/// Errors in a field mapping configuration.
#[derive(Debug, Error)]
pub enum MappingError {
    /// Canonical name unknown for the declared kind.
    #[error("Unknown {kind} target '{target}' for column '{source_column}'")]
    UnknownTarget {
        source_column: String,
        target: String,
        kind: &'static str,
    },

    /// Two columns write the same canonical field.
    #[error("Canonical field '{0}' is mapped more than once")]
    DuplicateTarget(String),

    /// `name` falls back to `label`, so `label` must be computed first.
    #[error("Column mapped to 'name' ('{name_source}') comes before the one mapped to 'label'")]
    NameBeforeLabel { name_source: String },

    /// Mapping file could not be read.
    #[error("Failed to read mapping file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Mapping JSON is malformed.
    #[error("Invalid mapping JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Transform Errors
// =============================================================================

/// Errors while cleaning one raw record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// A mapped source column is absent from the raw record.
    #[error("Missing source column: {0}")]
    MissingField(String),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// Returned by [`crate::pipeline::clean_file`] and friends.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV reading error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Mapping configuration error.
    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// A row failed under the abort policy.
    #[error("Row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: TransformError,
    },

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Output serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Output IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for mapping operations.
pub type MappingResult<T> = Result<T, MappingError>;

/// Result type for transform operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let csv_err = CsvError::EmptyFile;
        let pipeline_err: PipelineError = csv_err.into();
        assert!(pipeline_err.to_string().contains("empty"));

        let mapping_err = MappingError::DuplicateTarget("genus".into());
        let pipeline_err: PipelineError = mapping_err.into();
        assert!(pipeline_err.to_string().contains("genus"));
    }

    #[test]
    fn test_row_error_format() {
        let err = PipelineError::Row {
            row: 7,
            source: TransformError::MissingField("URI".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("Row 7"));
        assert!(msg.contains("URI"));
    }

    #[test]
    fn test_unknown_target_format() {
        let err = MappingError::UnknownTarget {
            source_column: "species_label".into(),
            target: "species".into(),
            kind: "classification",
        };
        let msg = err.to_string();
        assert!(msg.contains("species_label"));
        assert!(msg.contains("classification"));
    }
}
