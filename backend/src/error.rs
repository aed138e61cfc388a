//! Error types for the lead conversion pipeline.
//!
//! - [`CsvError`] - Reading and writing CSV data
//! - [`ConvertError`] - Fatal failures of the row transformer
//! - [`PipelineError`] - Top-level orchestration errors
//! - [`ServerError`] - HTTP layer errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while reading the uploaded CSV or writing the converted one.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read or write a file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Unknown or unsupported encoding label.
    #[error("Unsupported encoding: {0}")]
    EncodingError(String),

    /// Malformed CSV content.
    #[error("Invalid CSV format: {0}")]
    ParseError(String),

    /// Failed to serialize the converted table.
    #[error("Failed to write CSV: {0}")]
    WriteError(String),

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        CsvError::ParseError(err.to_string())
    }
}

// =============================================================================
// Conversion Errors
// =============================================================================

/// Fatal errors raised by the table transformer.
///
/// Schema and row failures abort the whole file: no partial output is ever produced.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConvertError {
    /// One or more required source columns are absent after header trimming.
    #[error("The uploaded file does not contain the required columns: {}", .missing.join(", "))]
    SchemaValidation { missing: Vec<String> },

    /// A row could not be coerced to text.
    #[error("Row {row}{}: {cause}", column_suffix(.column))]
    RowProcessing {
        /// Zero-based data row index (header excluded).
        row: usize,
        column: Option<String>,
        cause: String,
    },

    /// The transformer was finished before its rows were derived.
    #[error("Conversion has not run (transformer is {stage})")]
    NotRun { stage: &'static str },
}

fn column_suffix(column: &Option<String>) -> String {
    column
        .as_ref()
        .map(|c| format!(", column '{}'", c))
        .unwrap_or_default()
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// This is the error type returned by [`crate::transform::pipeline::convert_bytes`]
/// and friends.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV read/write error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Validation or row processing failure.
    #[error("Conversion error: {0}")]
    Convert(#[from] ConvertError),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for transformer operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
