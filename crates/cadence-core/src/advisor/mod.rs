//! The `Advisor` trait -- the adapter interface for advisory text services.
//!
//! An advisor turns a change summary into a friendly confirmation message
//! for display. Its output is cosmetic: no scheduling decision ever
//! depends on it, and a failing advisor degrades to a fixed fallback
//! string. The trait is intentionally object-safe so it can be stored as
//! `Arc<dyn Advisor>` in the lifecycle controller.

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

/// Shown when the advisory service fails or is unavailable.
pub const FALLBACK_ADVISORY: &str = "Your study plan has been updated. Take a look at the new schedule.";

/// Adapter interface for generating advisory prose about plan changes.
#[async_trait]
pub trait Advisor: Send + Sync {
    /// Human-readable name for this advisor (e.g. "template").
    fn name(&self) -> &str;

    /// Turn a change summary and a short plan context line into a
    /// user-facing confirmation message.
    async fn summarize(&self, change_summary: &str, plan_context: &str) -> Result<String>;
}

// Compile-time assertion: Advisor must be object-safe.
// If this line compiles, the trait can be used as `dyn Advisor`.
const _: () = {
    fn _assert_object_safe(_: &dyn Advisor) {}
};

/// Ask the advisor for a summary, falling back to [`FALLBACK_ADVISORY`]
/// when it fails. Failures are logged and never propagated.
pub async fn advisory_or_fallback(
    advisor: &dyn Advisor,
    change_summary: &str,
    plan_context: &str,
) -> String {
    match advisor.summarize(change_summary, plan_context).await {
        Ok(text) => text,
        Err(e) => {
            warn!(
                advisor = advisor.name(),
                error = %e,
                "advisory service failed, using fallback message"
            );
            FALLBACK_ADVISORY.to_owned()
        }
    }
}

/// Deterministic local advisor that phrases the change summary directly.
pub struct TemplateAdvisor;

#[async_trait]
impl Advisor for TemplateAdvisor {
    fn name(&self) -> &str {
        "template"
    }

    async fn summarize(&self, change_summary: &str, plan_context: &str) -> Result<String> {
        Ok(format!(
            "Done -- I {change_summary}. Your plan now covers {plan_context}."
        ))
    }
}
