//! Mapping configuration
//!
//! A [`MappingConfig`] declares everything the row transformer needs to know
//! about one source/target schema pair: which source columns are required or
//! optional, which are numeric, and the ordered list of target columns with the
//! rule that fills each of them.
//!
//! The target schema is an ordered list rather than a map because CRM import
//! schemas legitimately repeat column names (Rechat expects two `Tag` columns).

pub mod presets;

use serde::Serialize;

pub use presets::MappingPreset;

/// A complete, declarative mapping from a source schema to a target schema
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MappingConfig {
    /// Short identifier (e.g. `rechat`)
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// Source columns that must be present or the whole file is rejected
    pub required_columns: Vec<String>,

    /// Source columns whose absence only blanks the derived output
    pub optional_columns: Vec<String>,

    /// Source columns that may carry a float artifact (`62704.0`)
    pub numeric_columns: Vec<String>,

    /// Output columns, in export order
    pub columns: Vec<TargetColumn>,
}

/// One output column and the rule producing its value
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TargetColumn {
    pub name: String,
    pub rule: FieldRule,
}

/// How a single target value is derived from a source row
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldRule {
    /// Copy a source cell verbatim
    Copy { source: String },

    /// Join the non-blank source cells with a separator
    Concat {
        sources: Vec<String>,
        separator: String,
    },

    /// Build `street, city state zip` and normalize punctuation
    Address {
        street: String,
        city: String,
        state: String,
        zip: String,
    },

    /// Emit `label` when the cell equals `equals` (trimmed, case-insensitive)
    StatusTag {
        column: String,
        equals: String,
        label: String,
    },

    /// Comma-join the names of marker columns whose cell equals `token`
    MarkerTag { columns: Vec<String>, token: String },

    /// Pipe-separated free-text notes built from several columns
    Notes {
        fields: Vec<NoteField>,
        #[serde(skip_serializing_if = "Option::is_none")]
        primary_dnc: Option<String>,
    },

    /// A literal value
    Constant { value: String },

    /// No source equivalent
    Empty,
}

/// A source column contributing one segment to a notes field
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NoteField {
    pub column: String,

    /// Label placed before the value, e.g. `Phone 2:`. Empty means bare value.
    pub prefix: String,

    /// Do-not-call flag column annotating this segment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dnc_column: Option<String>,
}

impl NoteField {
    /// A note segment made of the bare cell value
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            prefix: String::new(),
            dnc_column: None,
        }
    }

    /// A note segment rendered as `<prefix> <value>`
    pub fn prefixed(column: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::new(column)
        }
    }

    /// Attach a DNC column whose value is appended as ` (DNC: <value>)`
    pub fn with_dnc(mut self, column: impl Into<String>) -> Self {
        self.dnc_column = Some(column.into());
        self
    }
}

impl FieldRule {
    pub fn copy(source: impl Into<String>) -> Self {
        FieldRule::Copy {
            source: source.into(),
        }
    }

    pub fn concat<I, S>(sources: I, separator: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldRule::Concat {
            sources: sources.into_iter().map(Into::into).collect(),
            separator: separator.into(),
        }
    }

    pub fn address(
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip: impl Into<String>,
    ) -> Self {
        FieldRule::Address {
            street: street.into(),
            city: city.into(),
            state: state.into(),
            zip: zip.into(),
        }
    }

    pub fn status_tag(
        column: impl Into<String>,
        equals: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        FieldRule::StatusTag {
            column: column.into(),
            equals: equals.into(),
            label: label.into(),
        }
    }

    pub fn marker_tag<I, S>(columns: I, token: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldRule::MarkerTag {
            columns: columns.into_iter().map(Into::into).collect(),
            token: token.into(),
        }
    }

    pub fn notes(fields: Vec<NoteField>, primary_dnc: Option<&str>) -> Self {
        FieldRule::Notes {
            fields,
            primary_dnc: primary_dnc.map(str::to_string),
        }
    }

    pub fn constant(value: impl Into<String>) -> Self {
        FieldRule::Constant {
            value: value.into(),
        }
    }

    /// Get all source columns referenced by this rule
    pub fn sources(&self) -> Vec<&str> {
        match self {
            FieldRule::Copy { source } => vec![source.as_str()],
            FieldRule::Concat { sources, .. } => sources.iter().map(String::as_str).collect(),
            FieldRule::Address {
                street,
                city,
                state,
                zip,
            } => vec![street.as_str(), city.as_str(), state.as_str(), zip.as_str()],
            FieldRule::StatusTag { column, .. } => vec![column.as_str()],
            FieldRule::MarkerTag { columns, .. } => columns.iter().map(String::as_str).collect(),
            FieldRule::Notes {
                fields,
                primary_dnc,
            } => fields
                .iter()
                .flat_map(|f| std::iter::once(f.column.as_str()).chain(f.dnc_column.as_deref()))
                .chain(primary_dnc.as_deref())
                .collect(),
            FieldRule::Constant { .. } | FieldRule::Empty => Vec::new(),
        }
    }
}

impl MappingConfig {
    /// Create an empty configuration
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            required_columns: Vec::new(),
            optional_columns: Vec::new(),
            numeric_columns: Vec::new(),
            columns: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add required source columns
    pub fn require<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_columns
            .extend(columns.into_iter().map(Into::into));
        self
    }

    /// Add optional source columns
    pub fn optional<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.optional_columns
            .extend(columns.into_iter().map(Into::into));
        self
    }

    /// Mark source columns as numeric-looking (phones, postal codes)
    pub fn numeric<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.numeric_columns
            .extend(columns.into_iter().map(Into::into));
        self
    }

    /// Append a target column
    pub fn column(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        self.columns.push(TargetColumn {
            name: name.into(),
            rule,
        });
        self
    }

    /// The output header, duplicates included
    pub fn target_header(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn is_numeric(&self, column: &str) -> bool {
        self.numeric_columns.iter().any(|c| c == column)
    }

    /// Target columns whose rule reads any of the given source columns
    pub fn affected_targets(&self, missing: &[String]) -> Vec<String> {
        let mut targets: Vec<String> = Vec::new();
        for column in &self.columns {
            let hit = column
                .rule
                .sources()
                .iter()
                .any(|s| missing.iter().any(|m| m == s));
            if hit && !targets.contains(&column.name) {
                targets.push(column.name.clone());
            }
        }
        targets
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MappingConfig {
        MappingConfig::new("sample")
            .require(["first_name", "last_name"])
            .optional(["phone_2", "phone_2_dnc", "insight"])
            .column("First Name", FieldRule::copy("first_name"))
            .column("Tag", FieldRule::Empty)
            .column("Tag", FieldRule::Empty)
            .column(
                "Notes",
                FieldRule::notes(
                    vec![
                        NoteField::new("insight"),
                        NoteField::prefixed("phone_2", "Phone 2:").with_dnc("phone_2_dnc"),
                    ],
                    None,
                ),
            )
    }

    #[test]
    fn test_target_header_keeps_duplicates() {
        assert_eq!(
            sample().target_header(),
            vec!["First Name", "Tag", "Tag", "Notes"]
        );
    }

    #[test]
    fn test_notes_sources_include_dnc() {
        let config = sample();
        let notes = &config.columns[3].rule;
        assert_eq!(notes.sources(), vec!["insight", "phone_2", "phone_2_dnc"]);
    }

    #[test]
    fn test_affected_targets() {
        let config = sample();
        assert_eq!(
            config.affected_targets(&["phone_2_dnc".to_string()]),
            vec!["Notes".to_string()]
        );
        assert!(config.affected_targets(&["unknown".to_string()]).is_empty());
    }

    #[test]
    fn test_rule_json_is_tagged() {
        let json = serde_json::to_value(FieldRule::status_tag("s", "yes", "Homeowner")).unwrap();
        assert_eq!(json["type"], "status_tag");
        assert_eq!(json["label"], "Homeowner");
    }
}
