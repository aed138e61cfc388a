//! Field derivation engine
//!
//! Turns one [`SourceRow`] into one [`TargetRow`] according to a
//! [`MappingConfig`]. Derivation is pure and total: every declared target
//! column gets a value, defaulting to the empty string.

use crate::models::{SourceRow, TargetRow};

use super::mapping::{FieldRule, MappingConfig, NoteField};
use super::text::{build_address, loosely_equals, strip_float_suffix};

/// Separator between note segments
pub const NOTE_SEPARATOR: &str = " | ";

/// Separator between matched marker column names
pub const MARKER_SEPARATOR: &str = ", ";

/// Derive a complete target row, in declared column order
pub fn derive_row(row: &SourceRow<'_>, config: &MappingConfig) -> TargetRow {
    let mut target = TargetRow::with_capacity(config.columns.len());
    for column in &config.columns {
        target.push(column.name.as_str(), derive_value(&column.rule, row, config));
    }
    target
}

/// Derive the value of a single target column
pub fn derive_value(rule: &FieldRule, row: &SourceRow<'_>, config: &MappingConfig) -> String {
    match rule {
        FieldRule::Copy { source } => cell(row, config, source).unwrap_or_default(),

        FieldRule::Concat { sources, separator } => sources
            .iter()
            .filter_map(|s| trimmed_cell(row, config, s))
            .collect::<Vec<_>>()
            .join(separator),

        FieldRule::Address {
            street,
            city,
            state,
            zip,
        } => {
            let part = |c: &str| trimmed_cell(row, config, c).unwrap_or_default();
            build_address(&part(street), &part(city), &part(state), &part(zip))
        }

        FieldRule::StatusTag {
            column,
            equals,
            label,
        } => match row.value(column) {
            Some(v) if loosely_equals(v, equals) => label.clone(),
            _ => String::new(),
        },

        FieldRule::MarkerTag { columns, token } => columns
            .iter()
            .filter(|c| row.value(c).is_some_and(|v| loosely_equals(v, token)))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(MARKER_SEPARATOR),

        FieldRule::Notes {
            fields,
            primary_dnc,
        } => build_notes(row, config, fields, primary_dnc.as_deref()),

        FieldRule::Constant { value } => value.clone(),

        FieldRule::Empty => String::new(),
    }
}

fn build_notes(
    row: &SourceRow<'_>,
    config: &MappingConfig,
    fields: &[NoteField],
    primary_dnc: Option<&str>,
) -> String {
    let mut segments: Vec<String> = Vec::new();

    for field in fields {
        let Some(value) = trimmed_cell(row, config, &field.column) else {
            continue;
        };

        let mut segment = if field.prefix.is_empty() {
            value
        } else {
            format!("{} {}", field.prefix, value)
        };

        if let Some(dnc) = field.dnc_column.as_deref().and_then(|c| row.non_blank(c)) {
            segment.push_str(&format!(" (DNC: {})", dnc));
        }

        segments.push(segment);
    }

    if let Some(dnc) = primary_dnc.and_then(|c| row.non_blank(c)) {
        segments.push(format!("Primary Phone DNC: {}", dnc));
    }

    segments.join(NOTE_SEPARATOR)
}

/// Cell value with numeric artifacts removed; `None` when missing
fn cell(row: &SourceRow<'_>, config: &MappingConfig, column: &str) -> Option<String> {
    let value = row.value(column)?;
    if config.is_numeric(column) {
        Some(strip_float_suffix(value.trim()))
    } else {
        Some(value.to_string())
    }
}

/// Trimmed, non-blank cell value
fn trimmed_cell(row: &SourceRow<'_>, config: &MappingConfig, column: &str) -> Option<String> {
    cell(row, config, column)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
