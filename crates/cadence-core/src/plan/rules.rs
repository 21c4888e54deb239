//! The modification rule table and its plan transforms.
//!
//! Each rule pairs a set of trigger phrases with a pure transform. A
//! transform returns `None` when its candidate filter finds zero units,
//! which tells the engine to skip that rule and leave the plan as it was.

use std::collections::HashSet;
use std::fmt;

use chrono::Duration;

use crate::catalog::{Category, LearningUnit};

use super::generate::priority_for_index;
use super::{AdaptiveDifficulty, Plan, Priority, ScheduledUnit};

/// Units at or above this level count as challenge material.
const CHALLENGE_LEVEL_FLOOR: u8 = 15;
/// Units at or below this level count as foundation material.
const FOUNDATION_LEVEL_CEIL: u8 = 10;
/// "Harder" rebuilds the plan with at least this many units when available.
const CHALLENGE_POOL_CAP: usize = 40;
/// "Easier" rebuilds the plan with at least this many units when available.
const FOUNDATION_POOL_CAP: usize = 30;
/// Upper bound on units appended by a single "add lessons" request.
const ADDED_LESSON_CAP: usize = 15;

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

/// Identifies a modification rule in the ordered table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Harder,
    Easier,
    SpreadOut,
    Accelerate,
    Refocus(Category),
    AddLessons,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Harder => f.write_str("harder"),
            Self::Easier => f.write_str("easier"),
            Self::SpreadOut => f.write_str("spread-out"),
            Self::Accelerate => f.write_str("accelerate"),
            Self::Refocus(c) => write!(f, "refocus-{c}"),
            Self::AddLessons => f.write_str("add-lessons"),
        }
    }
}

/// One entry in the rule table.
pub(crate) struct Rule {
    pub kind: RuleKind,
    triggers: Vec<String>,
    pub summary: String,
}

impl Rule {
    /// Case-insensitive substring match; `request_lower` must already be
    /// lowercased.
    pub fn matches(&self, request_lower: &str) -> bool {
        self.triggers.iter().any(|t| request_lower.contains(t.as_str()))
    }
}

fn fixed(kind: RuleKind, triggers: &[&str], summary: &str) -> Rule {
    Rule {
        kind,
        triggers: triggers.iter().map(|t| (*t).to_owned()).collect(),
        summary: summary.to_owned(),
    }
}

/// The ordered rule table. Every matching rule applies, in this order.
pub(crate) fn rule_table() -> Vec<Rule> {
    let mut rules = vec![
        fixed(
            RuleKind::Harder,
            &["harder", "more challenging", "difficult"],
            "switched to challenge-level units",
        ),
        fixed(
            RuleKind::Easier,
            &["easier", "simpler", "beginner"],
            "switched to foundation-level units",
        ),
        fixed(
            RuleKind::SpreadOut,
            &["spread out", "more time", "slower pace"],
            "spread sessions five days apart",
        ),
        fixed(
            RuleKind::Accelerate,
            &["faster", "accelerate", "daily", "more frequent"],
            "moved to a daily cadence",
        ),
    ];
    for category in Category::ALL {
        rules.push(Rule {
            kind: RuleKind::Refocus(category),
            triggers: vec![format!("focus on {category}")],
            summary: format!("refocused the plan on {category} units"),
        });
    }
    rules.push(fixed(
        RuleKind::AddLessons,
        &["more lessons", "add lessons"],
        "added extra lessons",
    ));
    rules
}

/// Apply a single rule's transform. `None` means the rule found no
/// candidate units and must be skipped.
pub(crate) fn apply_rule(kind: RuleKind, plan: &Plan, pool: &[LearningUnit]) -> Option<Plan> {
    match kind {
        RuleKind::Harder => make_harder(plan, pool),
        RuleKind::Easier => make_easier(plan, pool),
        RuleKind::SpreadOut => respace(plan, 5),
        RuleKind::Accelerate => accelerate(plan),
        RuleKind::Refocus(category) => refocus(plan, pool, category),
        RuleKind::AddLessons => add_lessons(plan, pool),
    }
}

// ---------------------------------------------------------------------------
// Transforms
// ---------------------------------------------------------------------------

/// Replace the schedule with challenge-level units on a 1.5-day cadence.
///
/// Dates are whole days, so the half-day cadence lands on
/// `floor(3 * position / 2)` days after the plan's start date.
fn make_harder(plan: &Plan, pool: &[LearningUnit]) -> Option<Plan> {
    let cap = (plan.total_units as usize).max(CHALLENGE_POOL_CAP);
    let replacements: Vec<&LearningUnit> = pool
        .iter()
        .filter(|u| u.level >= CHALLENGE_LEVEL_FLOOR)
        .take(cap)
        .collect();
    if replacements.is_empty() {
        return None;
    }

    let mut next = plan.clone();
    next.scheduled_units = replacements
        .into_iter()
        .enumerate()
        .map(|(i, unit)| ScheduledUnit {
            unit: unit.clone(),
            scheduled_date: plan.start_date + Duration::days(i as i64 * 3 / 2),
            is_completed: false,
            can_reschedule: true,
            priority: Priority::High,
            estimated_minutes: unit.duration_minutes + 10,
            adaptive_difficulty: AdaptiveDifficulty::Hard,
        })
        .collect();
    next.weekly_goal = (plan.weekly_goal * 3).div_ceil(2).min(7);
    Some(next)
}

/// Replace the schedule with foundation-level units on a four-day cadence.
fn make_easier(plan: &Plan, pool: &[LearningUnit]) -> Option<Plan> {
    let cap = (plan.total_units as usize).max(FOUNDATION_POOL_CAP);
    let replacements: Vec<&LearningUnit> = pool
        .iter()
        .filter(|u| u.level <= FOUNDATION_LEVEL_CEIL)
        .take(cap)
        .collect();
    if replacements.is_empty() {
        return None;
    }

    let mut next = plan.clone();
    next.scheduled_units = replacements
        .into_iter()
        .enumerate()
        .map(|(i, unit)| ScheduledUnit {
            unit: unit.clone(),
            scheduled_date: plan.start_date + Duration::days(i as i64 * 4),
            is_completed: false,
            can_reschedule: true,
            priority: Priority::Low,
            estimated_minutes: unit.duration_minutes.saturating_sub(5).max(10),
            adaptive_difficulty: AdaptiveDifficulty::Easy,
        })
        .collect();
    next.weekly_goal = (plan.weekly_goal / 2).max(1);
    Some(next)
}

/// Keep the same units; re-date at a uniform `interval_days` spacing and
/// halve the weekly goal. Spacing is a function of position alone, so
/// re-applying the rule is idempotent.
fn respace(plan: &Plan, interval_days: i64) -> Option<Plan> {
    let mut next = plan.clone();
    for (i, unit) in next.scheduled_units.iter_mut().enumerate() {
        unit.scheduled_date = plan.start_date + Duration::days(i as i64 * interval_days);
    }
    next.weekly_goal = (plan.weekly_goal / 2).max(1);
    Some(next)
}

/// Keep the same units; re-date daily and double the weekly goal.
fn accelerate(plan: &Plan) -> Option<Plan> {
    let mut next = plan.clone();
    for (i, unit) in next.scheduled_units.iter_mut().enumerate() {
        unit.scheduled_date = plan.start_date + Duration::days(i as i64);
    }
    next.weekly_goal = (plan.weekly_goal * 2).min(7);
    Some(next)
}

/// Swap in units of the named category, keeping the existing dates (and
/// the rest of the positional scheduling metadata) in place.
fn refocus(plan: &Plan, pool: &[LearningUnit], category: Category) -> Option<Plan> {
    let replacements: Vec<&LearningUnit> = pool
        .iter()
        .filter(|u| u.category == category)
        .take(plan.scheduled_units.len())
        .collect();
    if replacements.is_empty() {
        return None;
    }

    let mut next = plan.clone();
    next.scheduled_units = plan
        .scheduled_units
        .iter()
        .zip(replacements)
        .map(|(existing, unit)| ScheduledUnit {
            unit: unit.clone(),
            scheduled_date: existing.scheduled_date,
            is_completed: false,
            can_reschedule: existing.can_reschedule,
            priority: existing.priority,
            estimated_minutes: unit.duration_minutes,
            adaptive_difficulty: existing.adaptive_difficulty,
        })
        .collect();
    Some(next)
}

/// Append catalog units not already in the plan, two days apart after the
/// last scheduled date.
fn add_lessons(plan: &Plan, pool: &[LearningUnit]) -> Option<Plan> {
    let present: HashSet<&str> = plan
        .scheduled_units
        .iter()
        .map(|s| s.unit.id.as_str())
        .collect();
    let additions: Vec<&LearningUnit> = pool
        .iter()
        .filter(|u| !present.contains(u.id.as_str()))
        .take(ADDED_LESSON_CAP)
        .collect();
    if additions.is_empty() {
        return None;
    }

    let mut next = plan.clone();
    let last = plan.last_scheduled_date().unwrap_or(plan.start_date);
    let base = plan.scheduled_units.len();
    for (j, unit) in additions.into_iter().enumerate() {
        next.scheduled_units.push(ScheduledUnit {
            unit: unit.clone(),
            scheduled_date: last + Duration::days(2 * (j as i64 + 1)),
            is_completed: false,
            can_reschedule: true,
            priority: priority_for_index(base + j),
            estimated_minutes: unit.duration_minutes,
            adaptive_difficulty: AdaptiveDifficulty::Normal,
        });
    }
    Some(next)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
