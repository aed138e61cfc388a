//! Built-in mapping presets
//!
//! The four supported export targets. They share one transformer and differ
//! only in the tables below.

use clap::ValueEnum;
use serde::Serialize;

use super::{FieldRule, MappingConfig, NoteField};

/// Marker columns in the Real Intent export, in tag order
const MARKER_COLUMNS: [&str; 4] = ["Sellers", "Buyers", "Residential", "Pre-Movers"];

/// Cells holding phone numbers and postal codes
const NUMERIC_COLUMNS: [&str; 4] = ["phone_1", "phone_2", "phone_3", "zip_code"];

const SPOUSE_COLUMNS: [&str; 5] = [
    "Spouse First Name",
    "Spouse Last Name",
    "Spouse Email",
    "Spouse Phone",
    "Spouse Birthday",
];

/// Selects one of the built-in mapping configurations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MappingPreset {
    /// Rechat import with homeowner/marker tags and DNC-annotated notes
    #[default]
    Rechat,
    /// Rechat import reading a yes/no `homeowner` flag
    RechatOwnerFlag,
    /// Rechat import with a homeowner tag and short notes only
    RechatBasic,
    /// Realty Juggler import with flat column renames
    RealtyJuggler,
}

impl MappingPreset {
    pub const ALL: [MappingPreset; 4] = [
        MappingPreset::Rechat,
        MappingPreset::RechatOwnerFlag,
        MappingPreset::RechatBasic,
        MappingPreset::RealtyJuggler,
    ];

    /// Stable identifier, as accepted on the command line and by the API
    pub fn id(self) -> &'static str {
        match self {
            MappingPreset::Rechat => "rechat",
            MappingPreset::RechatOwnerFlag => "rechat-owner-flag",
            MappingPreset::RechatBasic => "rechat-basic",
            MappingPreset::RealtyJuggler => "realty-juggler",
        }
    }

    /// Look up a preset by its identifier
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.id() == id.trim())
    }

    /// Build the mapping configuration for this preset
    pub fn config(self) -> MappingConfig {
        match self {
            MappingPreset::Rechat => rechat(),
            MappingPreset::RechatOwnerFlag => rechat_owner_flag(),
            MappingPreset::RechatBasic => rechat_basic(),
            MappingPreset::RealtyJuggler => realty_juggler(),
        }
    }
}

/// Columns shared by every Rechat flavour up to (and excluding) the tags
fn rechat_head(config: MappingConfig) -> MappingConfig {
    config
        .column("First Name", FieldRule::copy("first_name"))
        .column("Last Name", FieldRule::copy("last_name"))
        .column(
            "Marketing Name",
            FieldRule::concat(["first_name", "last_name"], " "),
        )
        .column("Email", FieldRule::copy("email_1"))
        .column("Phone", FieldRule::copy("phone_1"))
        .column(
            "Address",
            FieldRule::address("address", "city", "state", "zip_code"),
        )
        .column("Job Title", FieldRule::copy("occupation"))
        .column("Birthday", FieldRule::Empty)
}

fn with_spouse_columns(config: MappingConfig) -> MappingConfig {
    SPOUSE_COLUMNS
        .iter()
        .fold(config, |c, name| c.column(*name, FieldRule::Empty))
}

fn rechat() -> MappingConfig {
    let config = MappingConfig::new("rechat")
        .with_description("Real Intent lead export to Rechat contact import")
        .require(["first_name", "last_name", "address", "city", "state", "zip_code"])
        .optional([
            "email_1",
            "email_2",
            "email_3",
            "phone_1",
            "phone_1_dnc",
            "phone_2",
            "phone_2_dnc",
            "phone_3",
            "phone_3_dnc",
            "occupation",
            "home_owner_status",
            "insight",
            "household_income",
            "household_net_worth",
        ])
        .optional(MARKER_COLUMNS)
        .numeric(NUMERIC_COLUMNS);

    let config = rechat_head(config)
        .column(
            "Tag",
            FieldRule::status_tag("home_owner_status", "home owner", "Homeowner"),
        )
        .column("Tag", FieldRule::marker_tag(MARKER_COLUMNS, "x"))
        .column(
            "Notes",
            FieldRule::notes(
                vec![
                    NoteField::new("insight"),
                    NoteField::prefixed("phone_2", "Phone 2:").with_dnc("phone_2_dnc"),
                    NoteField::prefixed("phone_3", "Phone 3:").with_dnc("phone_3_dnc"),
                    NoteField::prefixed("email_2", "Email 2:"),
                    NoteField::prefixed("email_3", "Email 3:"),
                    NoteField::prefixed("household_income", "Household Income:"),
                    NoteField::prefixed("household_net_worth", "Household Net Worth:"),
                ],
                Some("phone_1_dnc"),
            ),
        );

    with_spouse_columns(config)
}

fn rechat_owner_flag() -> MappingConfig {
    let config = MappingConfig::new("rechat-owner-flag")
        .with_description("Real Intent export with a yes/no homeowner flag to Rechat")
        .require(["first_name", "last_name", "address", "city", "state", "zip_code"])
        .optional([
            "email_1",
            "phone_1",
            "phone_1_dnc",
            "phone_2",
            "phone_2_dnc",
            "phone_3",
            "phone_3_dnc",
            "occupation",
            "homeowner",
            "insight",
            "household_income",
            "household_net_worth",
        ])
        .optional(MARKER_COLUMNS)
        .numeric(NUMERIC_COLUMNS);

    let config = rechat_head(config)
        .column("Tag", FieldRule::status_tag("homeowner", "yes", "Homeowner"))
        .column("Tag", FieldRule::marker_tag(MARKER_COLUMNS, "x"))
        .column(
            "Notes",
            FieldRule::notes(
                vec![
                    NoteField::new("insight"),
                    NoteField::prefixed("phone_2", "Phone 2:").with_dnc("phone_2_dnc"),
                    NoteField::prefixed("phone_3", "Phone 3:").with_dnc("phone_3_dnc"),
                    NoteField::prefixed("household_income", "Income:"),
                    NoteField::prefixed("household_net_worth", "Net Worth:"),
                ],
                Some("phone_1_dnc"),
            ),
        );

    with_spouse_columns(config)
}

fn rechat_basic() -> MappingConfig {
    let config = MappingConfig::new("rechat-basic")
        .with_description("Minimal Real Intent to Rechat conversion")
        .require(["first_name", "last_name"])
        .optional([
            "email_1",
            "phone_1",
            "phone_2",
            "address",
            "city",
            "state",
            "zip_code",
            "occupation",
            "home_owner_status",
            "insight",
        ])
        .numeric(NUMERIC_COLUMNS);

    let config = rechat_head(config)
        .column(
            "Tag",
            FieldRule::status_tag("home_owner_status", "home owner", "Homeowner"),
        )
        .column("Tag", FieldRule::Empty)
        .column(
            "Notes",
            FieldRule::notes(
                vec![
                    NoteField::new("insight"),
                    NoteField::prefixed("phone_2", "Phone 2:"),
                ],
                None,
            ),
        );

    with_spouse_columns(config)
}

fn realty_juggler() -> MappingConfig {
    const RENAMES: [(&str, &str); 14] = [
        ("occupation", "Job Title"),
        ("first_name", "First Name"),
        ("last_name", "Last Name"),
        ("address", "Home Street"),
        ("city", "Home City"),
        ("state", "Home State"),
        ("zip_code", "Home Postal Code"),
        ("phone_1", "Home Phone"),
        ("phone_2", "Home Phone 1"),
        ("phone_3", "Home Phone 2"),
        ("email_1", "E-mail Address"),
        ("email_2", "E-mail 1"),
        ("email_3", "E-mail 2"),
        ("insight", "Notes"),
    ];

    let config = MappingConfig::new("realty-juggler")
        .with_description("Real Intent lead export to Realty Juggler contact import")
        .require(RENAMES.iter().map(|(source, _)| *source))
        .require(["household_income", "household_net_worth"])
        .numeric(NUMERIC_COLUMNS);

    RENAMES
        .iter()
        .fold(config, |c, (source, target)| {
            c.column(*target, FieldRule::copy(*source))
        })
        .column(
            "Notes 1",
            FieldRule::notes(
                vec![NoteField::prefixed("household_income", "Household Income:")],
                None,
            ),
        )
        .column(
            "Notes 2",
            FieldRule::notes(
                vec![NoteField::prefixed(
                    "household_net_worth",
                    "Household Net Worth:",
                )],
                None,
            ),
        )
        .column("Referred By", FieldRule::constant("Real Intent"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rechat_header_has_two_tags() {
        let config = MappingPreset::Rechat.config();
        let header = config.target_header();
        assert_eq!(header.iter().filter(|h| **h == "Tag").count(), 2);
        assert_eq!(
            &header[..6],
            &["First Name", "Last Name", "Marketing Name", "Email", "Phone", "Address"]
        );
        assert_eq!(header.last(), Some(&"Spouse Birthday"));
    }

    #[test]
    fn test_ids_round_trip() {
        for preset in MappingPreset::ALL {
            assert_eq!(MappingPreset::from_id(preset.id()), Some(preset));
            assert_eq!(preset.config().name, preset.id());
        }
        assert_eq!(MappingPreset::from_id("nope"), None);
    }

    #[test]
    fn test_required_and_optional_are_disjoint() {
        for preset in MappingPreset::ALL {
            let config = preset.config();
            for col in &config.required_columns {
                assert!(
                    !config.optional_columns.contains(col),
                    "{} lists {} twice",
                    config.name,
                    col
                );
            }
        }
    }

    #[test]
    fn test_every_source_is_declared() {
        for preset in MappingPreset::ALL {
            let config = preset.config();
            for column in &config.columns {
                for source in column.rule.sources() {
                    assert!(
                        config.required_columns.iter().any(|c| c == source)
                            || config.optional_columns.iter().any(|c| c == source),
                        "{}: '{}' reads undeclared column '{}'",
                        config.name,
                        column.name,
                        source
                    );
                }
            }
        }
    }

    #[test]
    fn test_realty_juggler_matches_legacy_layout() {
        let config = MappingPreset::RealtyJuggler.config();
        assert_eq!(config.required_columns.len(), 16);
        let header = config.target_header();
        assert_eq!(header[0], "Job Title");
        assert_eq!(
            &header[header.len() - 3..],
            &["Notes 1", "Notes 2", "Referred By"]
        );
    }
}
