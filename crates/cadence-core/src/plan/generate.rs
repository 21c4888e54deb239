//! Plan generation: preference filtering, truncation, and calendar
//! assignment. Pure logic; no I/O.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::{Category, LearningUnit};

use super::{AdaptiveDifficulty, Plan, PlanStatistics, Priority, ScheduledUnit};

// ---------------------------------------------------------------------------
// Preference types
// ---------------------------------------------------------------------------

/// Requested overall difficulty, mapped to a catalog level range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl DifficultyLevel {
    /// The catalog levels eligible under this difficulty.
    ///
    /// The bands deliberately overlap so intermediate plans can reach both
    /// down into easy review material and up into harder units.
    pub fn level_range(self) -> RangeInclusive<u8> {
        match self {
            Self::Beginner => 1..=10,
            Self::Intermediate => 5..=20,
            Self::Advanced => 15..=30,
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        };
        f.write_str(s)
    }
}

impl FromStr for DifficultyLevel {
    type Err = DifficultyLevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            other => Err(DifficultyLevelParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`DifficultyLevel`] string.
#[derive(Debug, Clone)]
pub struct DifficultyLevelParseError(pub String);

impl fmt::Display for DifficultyLevelParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid difficulty level: {:?}", self.0)
    }
}

impl std::error::Error for DifficultyLevelParseError {}

// ---------------------------------------------------------------------------

/// Which categories to draw units from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusArea {
    All,
    Category(Category),
}

impl fmt::Display for FocusArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Category(c) => c.fmt(f),
        }
    }
}

impl FromStr for FocusArea {
    type Err = FocusAreaParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(Self::All);
        }
        s.parse::<Category>()
            .map(Self::Category)
            .map_err(|_| FocusAreaParseError(s.to_owned()))
    }
}

/// Error returned when parsing an invalid [`FocusArea`] string.
#[derive(Debug, Clone)]
pub struct FocusAreaParseError(pub String);

impl fmt::Display for FocusAreaParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid focus area: {:?} (expected \"all\" or a category)", self.0)
    }
}

impl std::error::Error for FocusAreaParseError {}

// ---------------------------------------------------------------------------

/// User preferences driving plan generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    pub difficulty: DifficultyLevel,
    pub focus_area: FocusArea,
    /// Study cadence; must be within 1..=7.
    pub units_per_week: u32,
    /// Requested plan size; the generated plan may be smaller if the
    /// catalog runs out of eligible units.
    pub total_units: u32,
    /// Advisory per-unit time override. `None` keeps each unit's own
    /// nominal duration.
    pub minutes_per_unit: Option<u32>,
    /// Informational; the generator does not consult it.
    pub preferred_days: Vec<Weekday>,
    pub start_date: NaiveDate,
}

impl Preferences {
    /// Reject malformed numeric input before it reaches the generator.
    pub fn validate(&self) -> Result<(), PreferenceError> {
        if !(1..=7).contains(&self.units_per_week) {
            return Err(PreferenceError::UnitsPerWeekOutOfRange(
                self.units_per_week,
            ));
        }
        if self.total_units == 0 {
            return Err(PreferenceError::ZeroTotalUnits);
        }
        if self.minutes_per_unit == Some(0) {
            return Err(PreferenceError::ZeroMinutesPerUnit);
        }
        Ok(())
    }
}

/// Invalid preference input, surfaced before any plan is generated.
#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("units_per_week must be within 1..=7, got {0}")]
    UnitsPerWeekOutOfRange(u32),

    #[error("total_units must be a positive integer")]
    ZeroTotalUnits,

    #[error("minutes_per_unit must be a positive integer when set")]
    ZeroMinutesPerUnit,
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Priority tier for the unit at schedule position `index`.
pub(crate) fn priority_for_index(index: usize) -> Priority {
    if index < 10 {
        Priority::High
    } else if index < 30 {
        Priority::Medium
    } else {
        Priority::Low
    }
}

/// Calendar date for the unit at schedule position `index`: positions fill
/// the first `units_per_week` days of each week.
fn date_for_index(start_date: NaiveDate, units_per_week: u32, index: usize) -> NaiveDate {
    let week = index as i64 / i64::from(units_per_week);
    let day = index as i64 % i64::from(units_per_week);
    start_date + Duration::days(week * 7 + day)
}

/// Generate a plan from the catalog and the user's preferences.
///
/// Deterministic: identical inputs produce identical plans. An empty
/// eligible pool yields a legal zero-unit plan rather than an error.
/// `preferences` are assumed validated (see [`Preferences::validate`]).
pub fn generate(units: &[LearningUnit], prefs: &Preferences, owner_id: &str) -> Plan {
    let level_range = prefs.difficulty.level_range();

    // Basics units are always eligible as filler, even under a narrowed
    // focus, so foundational material is never excluded.
    let selected: Vec<&LearningUnit> = units
        .iter()
        .filter(|u| level_range.contains(&u.level))
        .filter(|u| match prefs.focus_area {
            FocusArea::All => true,
            FocusArea::Category(focus) => {
                u.category == focus || u.category == Category::Basics
            }
        })
        .take(prefs.total_units as usize)
        .collect();

    let scheduled_units: Vec<ScheduledUnit> = selected
        .into_iter()
        .enumerate()
        .map(|(index, unit)| ScheduledUnit {
            unit: unit.clone(),
            scheduled_date: date_for_index(prefs.start_date, prefs.units_per_week, index),
            is_completed: false,
            can_reschedule: true,
            priority: priority_for_index(index),
            estimated_minutes: prefs.minutes_per_unit.unwrap_or(unit.duration_minutes),
            adaptive_difficulty: AdaptiveDifficulty::Normal,
        })
        .collect();

    let mut plan = Plan {
        // Derived from the owner so generation stays a pure function.
        id: Uuid::new_v5(&Uuid::NAMESPACE_OID, owner_id.as_bytes()),
        owner_id: owner_id.to_string(),
        title: format!("{} study plan", prefs.difficulty),
        description: format!(
            "{} units at {} per week starting {}",
            scheduled_units.len(),
            prefs.units_per_week,
            prefs.start_date
        ),
        scheduled_units,
        total_units: 0,
        start_date: prefs.start_date,
        target_end_date: prefs.start_date,
        weekly_goal: prefs.units_per_week,
        is_active: false,
        statistics: PlanStatistics::default(),
    };
    plan.resequence();
    plan
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
