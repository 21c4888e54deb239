//! Serde types mirroring the catalog TOML file layout.
//!
//! A catalog file is a list of `[[units]]` tables:
//!
//! ```toml
//! [[units]]
//! id = "alphabet-a-j"
//! title = "Alphabet: a through j"
//! description = "The first decade of the braille alphabet."
//! level = 2
//! category = "basics"
//! duration_minutes = 15
//! ```

use serde::Deserialize;

/// Top-level catalog file structure.
#[derive(Debug, Deserialize)]
pub struct CatalogToml {
    #[serde(default)]
    pub units: Vec<UnitToml>,
}

/// A single `[[units]]` entry, before validation.
#[derive(Debug, Deserialize)]
pub struct UnitToml {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub level: u8,
    /// Category name; validated against the closed [`super::Category`] set.
    pub category: String,
    pub duration_minutes: u32,
}
