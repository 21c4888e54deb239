//! Catalog TOML parser with validation.
//!
//! Parses a catalog string into a [`Catalog`] and validates:
//! - The catalog contains at least one unit.
//! - Unit ids are unique.
//! - Levels fall within 1..=30.
//! - Durations are positive.
//! - Category values are valid enum variants.

use std::collections::HashSet;

use thiserror::Error;

use super::toml_format::CatalogToml;
use super::{Catalog, Category, LearningUnit, MAX_LEVEL, MIN_LEVEL};

/// Errors that can occur during catalog parsing and validation.
#[derive(Debug, Error)]
pub enum CatalogParseError {
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("catalog must contain at least one unit")]
    NoUnits,

    #[error("duplicate unit id: {0:?}")]
    DuplicateUnitId(String),

    #[error("invalid category {value:?} on unit {unit:?} (expected basics, words, sentences, contractions, or advanced)")]
    InvalidCategory { unit: String, value: String },

    #[error("level {level} on unit {unit:?} is outside {MIN_LEVEL}..={MAX_LEVEL}")]
    LevelOutOfRange { unit: String, level: u8 },

    #[error("unit {0:?} has a zero duration")]
    ZeroDuration(String),
}

/// Parse and validate a catalog TOML string.
///
/// Returns a validated [`Catalog`] or a descriptive error.
pub fn parse_catalog_toml(content: &str) -> Result<Catalog, CatalogParseError> {
    let raw: CatalogToml = toml::from_str(content)?;

    if raw.units.is_empty() {
        return Err(CatalogParseError::NoUnits);
    }

    let mut seen = HashSet::new();
    let mut units = Vec::with_capacity(raw.units.len());

    for unit in raw.units {
        if !seen.insert(unit.id.clone()) {
            return Err(CatalogParseError::DuplicateUnitId(unit.id));
        }

        let category: Category =
            unit.category
                .parse()
                .map_err(|_| CatalogParseError::InvalidCategory {
                    unit: unit.id.clone(),
                    value: unit.category.clone(),
                })?;

        if !(MIN_LEVEL..=MAX_LEVEL).contains(&unit.level) {
            return Err(CatalogParseError::LevelOutOfRange {
                unit: unit.id,
                level: unit.level,
            });
        }

        if unit.duration_minutes == 0 {
            return Err(CatalogParseError::ZeroDuration(unit.id));
        }

        units.push(LearningUnit {
            id: unit.id,
            title: unit.title,
            description: unit.description,
            level: unit.level,
            category,
            duration_minutes: unit.duration_minutes,
        });
    }

    Ok(Catalog::new(units))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_toml(id: &str, level: u8, category: &str) -> String {
        format!(
            r#"
[[units]]
id = "{id}"
title = "Unit {id}"
level = {level}
category = "{category}"
duration_minutes = 15
"#
        )
    }

    #[test]
    fn parses_valid_catalog() {
        let content = format!(
            "{}{}",
            unit_toml("u1", 1, "basics"),
            unit_toml("u2", 15, "words")
        );
        let catalog = parse_catalog_toml(&content).expect("should parse");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.units()[0].id, "u1");
        assert_eq!(catalog.units()[1].category, Category::Words);
    }

    #[test]
    fn preserves_file_order() {
        let content = format!(
            "{}{}{}",
            unit_toml("charlie", 3, "basics"),
            unit_toml("alpha", 1, "basics"),
            unit_toml("bravo", 2, "basics")
        );
        let catalog = parse_catalog_toml(&content).expect("should parse");
        let ids: Vec<&str> = catalog.units().iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["charlie", "alpha", "bravo"]);
    }

    #[test]
    fn rejects_empty_catalog() {
        let result = parse_catalog_toml("");
        assert!(matches!(result, Err(CatalogParseError::NoUnits)));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let content = format!(
            "{}{}",
            unit_toml("dup", 1, "basics"),
            unit_toml("dup", 2, "words")
        );
        let result = parse_catalog_toml(&content);
        assert!(matches!(
            result,
            Err(CatalogParseError::DuplicateUnitId(id)) if id == "dup"
        ));
    }

    #[test]
    fn rejects_unknown_category() {
        let content = unit_toml("u1", 1, "grammar");
        let result = parse_catalog_toml(&content);
        assert!(matches!(
            result,
            Err(CatalogParseError::InvalidCategory { value, .. }) if value == "grammar"
        ));
    }

    #[test]
    fn rejects_out_of_range_level() {
        let content = unit_toml("u1", 31, "basics");
        let result = parse_catalog_toml(&content);
        assert!(matches!(
            result,
            Err(CatalogParseError::LevelOutOfRange { level: 31, .. })
        ));
    }

    #[test]
    fn rejects_zero_level() {
        let content = unit_toml("u1", 0, "basics");
        let result = parse_catalog_toml(&content);
        assert!(matches!(
            result,
            Err(CatalogParseError::LevelOutOfRange { level: 0, .. })
        ));
    }

    #[test]
    fn rejects_zero_duration() {
        let content = r#"
[[units]]
id = "u1"
title = "Unit"
level = 1
category = "basics"
duration_minutes = 0
"#;
        let result = parse_catalog_toml(content);
        assert!(matches!(result, Err(CatalogParseError::ZeroDuration(_))));
    }

    #[test]
    fn rejects_malformed_toml() {
        let result = parse_catalog_toml("this is not valid toml {{{");
        assert!(matches!(result, Err(CatalogParseError::TomlError(_))));
    }
}
