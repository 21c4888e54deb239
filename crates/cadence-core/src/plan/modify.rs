//! Modification engine: maps a free-text change request onto an ordered
//! pipeline of pure plan transforms.
//!
//! Every rule whose trigger matches the request applies, in table order,
//! each consuming the previous rule's output. The engine is not an intent
//! disambiguator: a request matching several rules compounds them, and the
//! later rule's re-dating overrides the earlier one's. Which rules fired
//! (and which were skipped for lack of candidates) comes back as a
//! [`ChangeLog`] alongside the new plan.

use crate::catalog::LearningUnit;

use super::Plan;
use super::rules::{RuleKind, apply_rule, rule_table};

/// Outcome of one rule that matched the request.
#[derive(Debug, Clone)]
pub struct ChangeEntry {
    pub rule: RuleKind,
    pub summary: String,
    /// `false` when the rule matched but found zero candidate units and
    /// was skipped.
    pub applied: bool,
}

/// The rules that matched a request, in application order.
#[derive(Debug, Clone, Default)]
pub struct ChangeLog {
    pub entries: Vec<ChangeEntry>,
}

impl ChangeLog {
    fn record(&mut self, rule: RuleKind, summary: String, applied: bool) {
        self.entries.push(ChangeEntry {
            rule,
            summary,
            applied,
        });
    }

    /// Whether any matched rule actually transformed the plan.
    pub fn any_applied(&self) -> bool {
        self.entries.iter().any(|e| e.applied)
    }

    /// Whether any rule matched the request at all.
    pub fn matched(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Summaries of the applied rules, in application order.
    pub fn applied_summaries(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.applied)
            .map(|e| e.summary.as_str())
            .collect()
    }
}

/// Apply a free-text modification request to a plan.
///
/// Pure: returns a new plan, never mutates the input. When no rule
/// matches (or every matching rule is skipped), the returned plan equals
/// the input in every field -- a silent, valid no-op.
pub fn apply_request(plan: &Plan, pool: &[LearningUnit], request: &str) -> (Plan, ChangeLog) {
    let needle = request.to_lowercase();
    let mut current = plan.clone();
    let mut log = ChangeLog::default();

    for rule in rule_table() {
        if !rule.matches(&needle) {
            continue;
        }
        match apply_rule(rule.kind, &current, pool) {
            Some(next) => {
                current = next;
                log.record(rule.kind, rule.summary, true);
            }
            None => {
                // Zero candidates: the plan stays as it was before this rule.
                log.record(rule.kind, rule.summary, false);
            }
        }
    }

    if log.any_applied() {
        current.resequence();
        current.description = log.applied_summaries().join(", ");
    }

    (current, log)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
