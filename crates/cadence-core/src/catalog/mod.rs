//! Learning-unit catalog: unit model, TOML parsing, and the embedded
//! starter library.
//!
//! The catalog is read-only from the scheduler's perspective: a stable,
//! ordered collection of [`LearningUnit`]s that the generator filters and
//! the modification engine draws replacements from.

pub mod parser;
pub mod toml_format;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use parser::{CatalogParseError, parse_catalog_toml};

/// Lowest difficulty level a unit may carry.
pub const MIN_LEVEL: u8 = 1;
/// Highest difficulty level a unit may carry.
pub const MAX_LEVEL: u8 = 30;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Content category of a learning unit. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Basics,
    Words,
    Sentences,
    Contractions,
    Advanced,
}

impl Category {
    /// All categories, in catalog order.
    pub const ALL: [Self; 5] = [
        Self::Basics,
        Self::Words,
        Self::Sentences,
        Self::Contractions,
        Self::Advanced,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Basics => "basics",
            Self::Words => "words",
            Self::Sentences => "sentences",
            Self::Contractions => "contractions",
            Self::Advanced => "advanced",
        };
        f.write_str(s)
    }
}

impl FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basics" => Ok(Self::Basics),
            "words" => Ok(Self::Words),
            "sentences" => Ok(Self::Sentences),
            "contractions" => Ok(Self::Contractions),
            "advanced" => Ok(Self::Advanced),
            other => Err(CategoryParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Category`] string.
#[derive(Debug, Clone)]
pub struct CategoryParseError(pub String);

impl fmt::Display for CategoryParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid category: {:?}", self.0)
    }
}

impl std::error::Error for CategoryParseError {}

// ---------------------------------------------------------------------------
// LearningUnit
// ---------------------------------------------------------------------------

/// An atomic piece of learning content. Immutable; owned by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningUnit {
    /// Unique id within the catalog.
    pub id: String,
    pub title: String,
    pub description: String,
    /// Difficulty level, 1 (easiest) to 30 (hardest).
    pub level: u8,
    pub category: Category,
    /// Nominal time to complete the unit.
    pub duration_minutes: u32,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// The embedded starter catalog TOML.
static DEFAULT_CATALOG_TOML: &str = include_str!("catalog.toml");

/// An ordered, validated collection of learning units.
#[derive(Debug, Clone)]
pub struct Catalog {
    units: Vec<LearningUnit>,
}

impl Catalog {
    pub(crate) fn new(units: Vec<LearningUnit>) -> Self {
        Self { units }
    }

    /// Load the embedded starter catalog.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed. This is a compile-time
    /// invariant -- if the binary was built, the TOML is valid.
    pub fn embedded() -> Self {
        parse_catalog_toml(DEFAULT_CATALOG_TOML).expect("embedded catalog.toml is invalid")
    }

    /// The units in stable catalog order.
    pub fn units(&self) -> &[LearningUnit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
