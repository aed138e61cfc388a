//! Row transformation: mapping configs, field derivation and orchestration.
//!
//! - `mapping`: Declarative source → target mapping and built-in presets
//! - `derive`: Per-row field derivation engine
//! - `text`: String clean-up (addresses, numeric artifacts)
//! - `pipeline`: Table transformer and high-level conversion API

pub mod derive;
pub mod mapping;
pub mod pipeline;
pub mod text;

pub use derive::{derive_row, derive_value};
pub use mapping::{FieldRule, MappingConfig, MappingPreset, NoteField, TargetColumn};
