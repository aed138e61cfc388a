//! Table transformer and high-level conversion API.
//!
//! [`TableTransformer`] runs the two phases of a conversion over one source
//! table and records where it stands:
//!
//! ```text
//! Idle ──validate──▶ Validated ──transform──▶ Transformed
//!   │                    │
//!   └────────────────────┴──────────▶ Failed
//! ```
//!
//! Both `Transformed` and `Failed` are terminal. A failed transformer never
//! exposes partial output.
//!
//! # Example
//!
//! ```rust,ignore
//! use leadmap::{convert_bytes, ConvertOptions};
//!
//! let conversion = convert_bytes(&std::fs::read("leads.csv")?, &ConvertOptions::default())?;
//! std::fs::write("converted_file.csv", conversion.to_csv_bytes()?)?;
//! ```

use serde::Serialize;
use std::path::Path;

use crate::api::logs::{log_error, log_info, log_info_indent, log_success, log_warning};
use crate::error::{ConvertError, ConvertResult, CsvResult, PipelineResult};
use crate::models::{SourceTable, TargetTable};
use crate::parser::{read_csv_bytes, read_csv_file, InputEncoding, ParsedCsv};
use crate::validation::{validate_columns, ValidationReport};

use super::derive::derive_row;
use super::mapping::{MappingConfig, MappingPreset};

/// File name offered for the converted CSV
pub const OUTPUT_FILE_NAME: &str = "converted_file.csv";

/// MIME type of the converted CSV
pub const OUTPUT_MIME: &str = "text/csv";

/// Shown before a file is processed
pub const INTRO_MESSAGE: &str = "Upload a CSV file. The app will convert your Real Intent CSV into a format that can be imported into your CRM.";

/// Where a [`TableTransformer`] stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Idle,
    Validated,
    Transformed,
    Failed,
}

#[derive(Debug)]
enum State {
    Idle,
    Validated(ValidationReport),
    Transformed(ValidationReport, TargetTable),
    Failed(ConvertError),
}

/// Validates and converts one source table with one mapping configuration.
///
/// The same `source` must be passed to [`validate`](Self::validate) and
/// [`transform`](Self::transform).
#[derive(Debug)]
pub struct TableTransformer<'c> {
    config: &'c MappingConfig,
    state: State,
}

impl<'c> TableTransformer<'c> {
    pub fn new(config: &'c MappingConfig) -> Self {
        Self {
            config,
            state: State::Idle,
        }
    }

    pub fn stage(&self) -> Stage {
        match self.state {
            State::Idle => Stage::Idle,
            State::Validated(_) => Stage::Validated,
            State::Transformed(..) => Stage::Transformed,
            State::Failed(_) => Stage::Failed,
        }
    }

    /// Run the column validator (`Idle → Validated | Failed`).
    ///
    /// Calling it again returns the recorded outcome.
    pub fn validate(&mut self, source: &SourceTable) -> ConvertResult<&ValidationReport> {
        if let State::Idle = self.state {
            self.state = match validate_columns(source, self.config) {
                Ok(report) => State::Validated(report),
                Err(e) => State::Failed(e),
            };
        }

        match &self.state {
            State::Validated(report) | State::Transformed(report, _) => Ok(report),
            State::Failed(e) => Err(e.clone()),
            State::Idle => unreachable!("validation always leaves Idle"),
        }
    }

    /// Derive every row (`Validated → Transformed | Failed`).
    ///
    /// Validates first when still `Idle`. The first row that cannot be coerced
    /// to text fails the whole table.
    pub fn transform(&mut self, source: &SourceTable) -> ConvertResult<&TargetTable> {
        self.validate(source)?;

        let state = std::mem::replace(&mut self.state, State::Idle);
        self.state = match state {
            State::Validated(report) => match derive_table(source, self.config) {
                Ok(table) => State::Transformed(report, table),
                Err(e) => State::Failed(e),
            },
            other => other,
        };

        match &self.state {
            State::Transformed(_, table) => Ok(table),
            State::Failed(e) => Err(e.clone()),
            State::Idle | State::Validated(_) => unreachable!("transform always reaches a terminal stage"),
        }
    }

    pub fn report(&self) -> Option<&ValidationReport> {
        match &self.state {
            State::Validated(report) | State::Transformed(report, _) => Some(report),
            _ => None,
        }
    }

    /// The converted table, only once `Transformed`
    pub fn output(&self) -> Option<&TargetTable> {
        match &self.state {
            State::Transformed(_, table) => Some(table),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ConvertError> {
        match &self.state {
            State::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Consume a finished transformer
    pub fn finish(self) -> ConvertResult<(ValidationReport, TargetTable)> {
        match self.state {
            State::Transformed(report, table) => Ok((report, table)),
            State::Failed(e) => Err(e),
            State::Idle => Err(ConvertError::NotRun { stage: "idle" }),
            State::Validated(_) => Err(ConvertError::NotRun { stage: "validated" }),
        }
    }
}

/// Apply the derivation engine to every row, in source order
pub fn derive_table(source: &SourceTable, config: &MappingConfig) -> ConvertResult<TargetTable> {
    let mut rows = Vec::with_capacity(source.len());
    for idx in 0..source.len() {
        let row = source.row(idx)?;
        rows.push(derive_row(&row, config));
    }

    Ok(TargetTable {
        header: config.target_header().into_iter().map(str::to_string).collect(),
        rows,
    })
}

/// Validate and convert in one call
pub fn convert_table(
    source: &SourceTable,
    config: &MappingConfig,
) -> ConvertResult<(ValidationReport, TargetTable)> {
    let mut transformer = TableTransformer::new(config);
    transformer.transform(source)?;
    transformer.finish()
}

/// Options for a file conversion
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub preset: MappingPreset,
    pub encoding: InputEncoding,
    /// Rows shown in the success preview
    pub preview_rows: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            preset: MappingPreset::default(),
            encoding: InputEncoding::Utf8,
            preview_rows: 5,
        }
    }
}

/// Input file information
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// A successful conversion
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Mapping preset identifier
    pub mapping: String,
    pub table: TargetTable,
    pub report: ValidationReport,
    pub csv_info: CsvInfo,
}

impl Conversion {
    /// Download-ready CSV bytes
    pub fn to_csv_bytes(&self) -> CsvResult<Vec<u8>> {
        self.table.to_csv_bytes()
    }

    pub fn preview(&self, rows: usize) -> Vec<Vec<String>> {
        self.table.preview(rows)
    }
}

/// Convert CSV bytes with the chosen preset.
pub fn convert_bytes(bytes: &[u8], options: &ConvertOptions) -> PipelineResult<Conversion> {
    log_info(INTRO_MESSAGE);
    log_info("📖 Reading CSV file...");
    let parsed = read_csv_bytes(bytes, &options.encoding).map_err(|e| {
        log_error(e.to_string());
        e
    })?;
    convert_parsed(parsed, options)
}

/// Convert a CSV file on disk and write the result to `output`.
pub fn convert_file(
    input: &Path,
    output: &Path,
    options: &ConvertOptions,
) -> PipelineResult<Conversion> {
    log_info(INTRO_MESSAGE);
    log_info(format!("📖 Reading {}...", input.display()));
    let parsed = read_csv_file(input, &options.encoding).map_err(|e| {
        log_error(e.to_string());
        e
    })?;
    let conversion = convert_parsed(parsed, options)?;

    std::fs::write(output, conversion.to_csv_bytes()?).map_err(crate::error::CsvError::from)?;
    log_success(format!("💾 Output written to: {}", output.display()));
    Ok(conversion)
}

fn convert_parsed(parsed: ParsedCsv, options: &ConvertOptions) -> PipelineResult<Conversion> {
    let ParsedCsv {
        table,
        encoding,
        delimiter,
    } = parsed;

    log_success(format!("Encoding: {}", encoding));
    log_success(format!("Separator: '{}'", format_delimiter(delimiter)));
    log_success(format!("Read {} rows, {} columns", table.len(), table.headers().len()));

    let csv_info = CsvInfo {
        encoding,
        delimiter,
        headers: table.headers().to_vec(),
        row_count: table.len(),
    };

    let config = options.preset.config();
    log_info(format!("🗺️  Mapping: {} ({})", config.name, config.description));

    let mut transformer = TableTransformer::new(&config);

    match transformer.validate(&table) {
        Ok(report) => {
            if let Some(msg) = report.renamed_message() {
                log_info(msg);
            }
            if let Some(ref warning) = report.warning {
                log_warning(warning.to_string());
            }
        }
        Err(e) => {
            log_error(e.to_string());
            return Err(e.into());
        }
    }

    log_info("⚙️  Converting rows...");
    if let Err(e) = transformer.transform(&table) {
        log_error(format!("Unexpected error while processing the file: {}", e));
        return Err(e.into());
    }

    let (report, target) = transformer.finish()?;
    // The broadcaster is shared by every SSE client, so only counts go out.
    // Row previews travel through `Conversion::preview`.
    log_success(format!("Converted {} rows", target.len()));
    log_info_indent(
        format!(
            "{} target columns, {} preview rows",
            target.header.len(),
            target.len().min(options.preview_rows)
        ),
        1,
    );

    Ok(Conversion {
        mapping: config.name.clone(),
        table: target,
        report,
        csv_info,
    })
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "TAB".to_string(),
        c => c.to_string(),
    }
}
