//! # Leadmap - Real Intent lead exports to CRM import files
//!
//! Leadmap converts contact-export CSV files from Real Intent into the column
//! layout expected by CRM importers (Rechat, Realty Juggler). Each conversion
//! is a single, stateless, row-wise remap driven by a declarative
//! [`MappingConfig`].
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Lead CSV   │────▶│   Parser    │────▶│  Validator  │────▶│ Transformer │────▶ CRM CSV
//! │  (upload)   │     │ (trim hdrs) │     │ (req / opt) │     │ (per row)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use leadmap::{convert_bytes, ConvertOptions, MappingPreset};
//!
//! let options = ConvertOptions { preset: MappingPreset::Rechat, ..Default::default() };
//! let conversion = convert_bytes(&std::fs::read("leads.csv")?, &options)?;
//! std::fs::write("converted_file.csv", conversion.to_csv_bytes()?)?;
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`models`] - Source and target tables
//! - [`parser`] - CSV reading/writing with encoding detection
//! - [`validation`] - Required/optional column checks
//! - [`transform`] - Mapping presets, field derivation and pipeline
//! - [`api`] - HTTP API server and message stream

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Validation
pub mod validation;

// Transformation
pub mod transform;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{ConvertError, CsvError, PipelineError, ServerError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{SourceRow, SourceTable, TargetRow, TargetTable};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    detect_delimiter, detect_encoding, read_csv_bytes, read_csv_file, write_csv, InputEncoding,
    ParsedCsv,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{is_valid, validate_columns, OptionalColumnWarning, ValidationReport};

// =============================================================================
// Re-exports - Mapping and derivation
// =============================================================================

pub use transform::{
    derive_row, FieldRule, MappingConfig, MappingPreset, NoteField, TargetColumn,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    convert_bytes, convert_file, convert_table, derive_table, Conversion, ConvertOptions, CsvInfo,
    Stage, TableTransformer, OUTPUT_FILE_NAME, OUTPUT_MIME,
};

// Server
pub mod server {
    pub use crate::api::server::{router, start_server, DEFAULT_PORT};
}
