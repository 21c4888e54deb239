//! Study plan data model: scheduled units, priority tiers, and the
//! integrity rules every generated or modified plan must satisfy.

pub mod generate;
pub mod modify;
pub mod rules;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::LearningUnit;

pub use generate::{DifficultyLevel, FocusArea, PreferenceError, Preferences, generate};
pub use modify::{ChangeEntry, ChangeLog, apply_request};
pub use rules::RuleKind;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Coarse urgency tier, assigned by position in the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        };
        f.write_str(s)
    }
}

impl FromStr for Priority {
    type Err = PriorityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(PriorityParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Priority`] string.
#[derive(Debug, Clone)]
pub struct PriorityParseError(pub String);

impl fmt::Display for PriorityParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid priority: {:?}", self.0)
    }
}

impl std::error::Error for PriorityParseError {}

// ---------------------------------------------------------------------------

/// Per-unit difficulty stance set by the modification engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptiveDifficulty {
    Easy,
    Normal,
    Hard,
}

impl fmt::Display for AdaptiveDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
        };
        f.write_str(s)
    }
}

impl FromStr for AdaptiveDifficulty {
    type Err = AdaptiveDifficultyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Self::Easy),
            "normal" => Ok(Self::Normal),
            "hard" => Ok(Self::Hard),
            other => Err(AdaptiveDifficultyParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`AdaptiveDifficulty`] string.
#[derive(Debug, Clone)]
pub struct AdaptiveDifficultyParseError(pub String);

impl fmt::Display for AdaptiveDifficultyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid adaptive difficulty: {:?}", self.0)
    }
}

impl std::error::Error for AdaptiveDifficultyParseError {}

// ---------------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------------

/// A learning unit placed on the calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledUnit {
    pub unit: LearningUnit,
    pub scheduled_date: NaiveDate,
    /// Owned by the external progress tracker; the scheduler never flips it.
    pub is_completed: bool,
    pub can_reschedule: bool,
    pub priority: Priority,
    /// May differ from the unit's nominal duration.
    pub estimated_minutes: u32,
    pub adaptive_difficulty: AdaptiveDifficulty,
}

/// Read-only summary written by the external progress tracker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanStatistics {
    pub completed_units: u32,
    pub average_score: Option<f32>,
}

/// A dated, prioritized study plan for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: Uuid,
    pub owner_id: String,
    pub title: String,
    /// Rewritten on each modification to record the applied changes.
    pub description: String,
    /// Date-sorted ascending, ties broken by original position.
    pub scheduled_units: Vec<ScheduledUnit>,
    /// Always equals `scheduled_units.len()`.
    pub total_units: u32,
    pub start_date: NaiveDate,
    /// Always equals the last scheduled date, or `start_date` when empty.
    pub target_end_date: NaiveDate,
    /// Units per week the user aims for; always within 1..=7.
    pub weekly_goal: u32,
    pub is_active: bool,
    pub statistics: PlanStatistics,
}

impl Plan {
    /// The date of the last scheduled unit, if any.
    pub fn last_scheduled_date(&self) -> Option<NaiveDate> {
        self.scheduled_units.last().map(|u| u.scheduled_date)
    }

    /// Restore the ordering and derived-field invariants after an edit.
    ///
    /// Sorts units by date (stable, so original position breaks ties),
    /// then recomputes `total_units` and `target_end_date`.
    pub fn resequence(&mut self) {
        self.scheduled_units.sort_by_key(|u| u.scheduled_date);
        self.total_units = self.scheduled_units.len() as u32;
        self.target_end_date = self.last_scheduled_date().unwrap_or(self.start_date);
    }

    /// Verify the plan invariants.
    ///
    /// Checked by the lifecycle controller before every persist; the
    /// generator and the modification engine uphold these by construction.
    pub fn check_integrity(&self) -> Result<(), PlanIntegrityError> {
        if self.total_units as usize != self.scheduled_units.len() {
            return Err(PlanIntegrityError::SizeMismatch {
                total_units: self.total_units,
                actual: self.scheduled_units.len(),
            });
        }

        let mut seen = HashSet::new();
        for unit in &self.scheduled_units {
            if !seen.insert(unit.unit.id.as_str()) {
                return Err(PlanIntegrityError::DuplicateUnitId(unit.unit.id.clone()));
            }
        }

        for (index, pair) in self.scheduled_units.windows(2).enumerate() {
            if pair[0].scheduled_date > pair[1].scheduled_date {
                return Err(PlanIntegrityError::DatesOutOfOrder { index: index + 1 });
            }
        }

        let expected_end = self.last_scheduled_date().unwrap_or(self.start_date);
        if self.target_end_date != expected_end {
            return Err(PlanIntegrityError::EndDateMismatch {
                target_end_date: self.target_end_date,
                expected: expected_end,
            });
        }

        if !(1..=7).contains(&self.weekly_goal) {
            return Err(PlanIntegrityError::WeeklyGoalOutOfRange(self.weekly_goal));
        }

        Ok(())
    }
}

/// A violated plan invariant.
#[derive(Debug, Error)]
pub enum PlanIntegrityError {
    #[error("total_units is {total_units} but {actual} units are scheduled")]
    SizeMismatch { total_units: u32, actual: usize },

    #[error("duplicate unit id in plan: {0:?}")]
    DuplicateUnitId(String),

    #[error("scheduled dates out of order at position {index}")]
    DatesOutOfOrder { index: usize },

    #[error("target end date {target_end_date} does not match the schedule (expected {expected})")]
    EndDateMismatch {
        target_end_date: NaiveDate,
        expected: NaiveDate,
    },

    #[error("weekly goal {0} is outside 1..=7")]
    WeeklyGoalOutOfRange(u32),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
