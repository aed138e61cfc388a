//! Column validation for uploaded CSV files.
//!
//! Checks the trimmed source header against a [`MappingConfig`] before any row
//! is processed:
//!
//! - Missing **required** columns reject the whole file with
//!   [`ConvertError::SchemaValidation`].
//! - Missing **optional** columns are reported through an
//!   [`OptionalColumnWarning`]; the derived cells they feed are left blank.
//! - Headers that needed trimming are listed for information.
//!
//! A required column that is present but blank in every row passes: only the
//! presence of the column is checked, never the presence of values.
//!
//! # Example
//!
//! ```rust,ignore
//! use leadmap::{validate_columns, MappingPreset, SourceTable};
//!
//! let table = SourceTable::from_strings(["first_name"], [["Jane"]]);
//! let err = validate_columns(&table, &MappingPreset::Rechat.config()).unwrap_err();
//! println!("{}", err);
//! ```

use serde::Serialize;
use std::fmt;

use crate::error::ConvertError;
use crate::models::SourceTable;
use crate::transform::mapping::MappingConfig;

/// Outcome of a successful column validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// Optional columns absent from the file, with the targets left blank
    pub warning: Option<OptionalColumnWarning>,

    /// Headers renamed by trimming, as `(original, trimmed)`
    pub renamed_headers: Vec<(String, String)>,
}

/// Advisory: some optional source columns are absent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionalColumnWarning {
    pub missing_columns: Vec<String>,
    /// Target columns that will be blank (or partially blank) for every row
    pub blank_targets: Vec<String>,
}

impl fmt::Display for OptionalColumnWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Optional columns not found: {}.",
            self.missing_columns.join(", ")
        )?;
        if !self.blank_targets.is_empty() {
            write!(
                f,
                " The following output will be blank or incomplete: {}.",
                self.blank_targets.join(", ")
            )?;
        }
        Ok(())
    }
}

impl ValidationReport {
    pub fn has_warning(&self) -> bool {
        self.warning.is_some()
    }

    /// Human-readable description of the trimmed headers, if any
    pub fn renamed_message(&self) -> Option<String> {
        if self.renamed_headers.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self
            .renamed_headers
            .iter()
            .map(|(from, to)| format!("'{}' → '{}'", from, to))
            .collect();
        Some(format!("Trimmed whitespace from headers: {}", pairs.join(", ")))
    }
}

/// Columns of `wanted` that are not in `present`, in `wanted` order
pub fn missing_columns(present: &[String], wanted: &[String]) -> Vec<String> {
    let mut missing: Vec<String> = Vec::new();
    for col in wanted {
        if !present.contains(col) && !missing.contains(col) {
            missing.push(col.clone());
        }
    }
    missing
}

/// Validate the source header against a mapping configuration.
///
/// # Returns
/// * `Ok(ValidationReport)` when every required column is present
/// * `Err(ConvertError::SchemaValidation)` naming the missing required columns
pub fn validate_columns(
    table: &SourceTable,
    config: &MappingConfig,
) -> Result<ValidationReport, ConvertError> {
    let present = table.headers();

    let missing = missing_columns(present, &config.required_columns);
    if !missing.is_empty() {
        return Err(ConvertError::SchemaValidation { missing });
    }

    let missing_optional = missing_columns(present, &config.optional_columns);
    let warning = if missing_optional.is_empty() {
        None
    } else {
        Some(OptionalColumnWarning {
            blank_targets: config.affected_targets(&missing_optional),
            missing_columns: missing_optional,
        })
    };

    Ok(ValidationReport {
        warning,
        renamed_headers: table.renamed_headers(),
    })
}

/// Quick check without the report
pub fn is_valid(table: &SourceTable, config: &MappingConfig) -> bool {
    validate_columns(table, config).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::mapping::MappingPreset;

    const FULL_REQUIRED: [&str; 6] = ["first_name", "last_name", "address", "city", "state", "zip_code"];

    fn table(headers: &[&str]) -> SourceTable {
        SourceTable::from_strings(headers.iter().copied(), Vec::<Vec<&str>>::new())
    }

    #[test]
    fn test_all_required_present() {
        let config = MappingPreset::Rechat.config();
        let report = validate_columns(&table(&FULL_REQUIRED), &config).unwrap();

        let warning = report.warning.expect("optional columns are missing");
        assert!(warning.missing_columns.contains(&"insight".to_string()));
        assert!(warning.blank_targets.contains(&"Notes".to_string()));
        assert!(warning.blank_targets.contains(&"Tag".to_string()));
        assert!(report.renamed_headers.is_empty());
    }

    #[test]
    fn test_each_required_column_gates() {
        let config = MappingPreset::Rechat.config();
        for removed in FULL_REQUIRED {
            let headers: Vec<&str> = FULL_REQUIRED.iter().copied().filter(|h| *h != removed).collect();
            match validate_columns(&table(&headers), &config) {
                Err(ConvertError::SchemaValidation { missing }) => {
                    assert_eq!(missing, vec![removed.to_string()])
                }
                other => panic!("expected schema error without {}, got {:?}", removed, other),
            }
        }
    }

    #[test]
    fn test_missing_listed_in_declared_order() {
        let config = MappingPreset::Rechat.config();
        let err = validate_columns(&table(&["city", "first_name"]), &config).unwrap_err();
        assert_eq!(
            err,
            ConvertError::SchemaValidation {
                missing: vec![
                    "last_name".into(),
                    "address".into(),
                    "state".into(),
                    "zip_code".into()
                ]
            }
        );
    }

    #[test]
    fn test_padded_headers_match_after_trim() {
        let config = MappingPreset::RechatBasic.config();
        let report = validate_columns(&table(&[" first_name ", "last_name\t"]), &config).unwrap();
        assert_eq!(report.renamed_headers.len(), 2);
        assert!(report.renamed_message().unwrap().contains("' first_name ' → 'first_name'"));
    }

    #[test]
    fn test_header_match_is_case_sensitive() {
        let config = MappingPreset::RechatBasic.config();
        assert!(!is_valid(&table(&["First_Name", "last_name"]), &config));
    }

    #[test]
    fn test_no_warning_when_everything_present() {
        let config = MappingPreset::RealtyJuggler.config();
        let headers: Vec<&str> = config.required_columns.iter().map(String::as_str).collect();
        let report = validate_columns(&table(&headers), &config).unwrap();
        assert!(!report.has_warning());
    }

    #[test]
    fn test_warning_message() {
        let warning = OptionalColumnWarning {
            missing_columns: vec!["insight".into(), "Sellers".into()],
            blank_targets: vec!["Tag".into(), "Notes".into()],
        };
        let msg = warning.to_string();
        assert!(msg.contains("insight, Sellers"));
        assert!(msg.contains("Tag, Notes"));
    }
}
