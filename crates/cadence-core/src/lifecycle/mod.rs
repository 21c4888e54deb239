//! Plan lifecycle controller: the state machine and persistence glue
//! around the generator and the modification engine.
//!
//! Enforces the valid transition graph:
//!
//! ```text
//! no_plan -> draft    (preview: preferences submitted, nothing persisted)
//! draft   -> active   (confirm: persisted and marked active)
//! draft   -> no_plan  (reject: draft discarded)
//! active  -> active   (modify: engine, persist, advisory)
//! active  -> no_plan  (reset: persisted record deleted)
//! ```
//!
//! The session state sits behind a single-slot async lock. A modification
//! takes the slot with `try_lock`, so a second modification arriving while
//! one is in flight is refused with [`SchedulerError::Busy`] instead of
//! queueing -- the cooperative busy flag from the source design, made
//! explicit.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::advisor::{Advisor, advisory_or_fallback};
use crate::catalog::Catalog;
use crate::plan::{
    ChangeLog, Plan, PlanIntegrityError, PreferenceError, Preferences, apply_request, generate,
};
use crate::store::{PlanStore, StoreError};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Where a session currently stands in the plan lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    NoPlan,
    Draft,
    Active,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NoPlan => "no_plan",
            Self::Draft => "draft",
            Self::Active => "active",
        };
        f.write_str(s)
    }
}

/// Internal session state; the plan travels with the phase.
enum SessionState {
    NoPlan,
    Draft(Plan),
    Active(Plan),
}

impl SessionState {
    fn phase(&self) -> SessionPhase {
        match self {
            Self::NoPlan => SessionPhase::NoPlan,
            Self::Draft(_) => SessionPhase::Draft,
            Self::Active(_) => SessionPhase::Active,
        }
    }
}

/// Errors surfaced by the lifecycle controller.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("no active plan; generate and confirm a plan before requesting changes")]
    NoActivePlan,

    #[error("a confirmed plan already exists; reset it before generating a new one")]
    ActivePlanExists,

    #[error("a draft plan is already awaiting a decision; confirm or reject it first")]
    DraftPending,

    #[error("no draft plan; generate a preview first")]
    NoDraft,

    #[error("another modification is already in flight for this plan")]
    Busy,

    #[error(transparent)]
    InvalidPreferences(#[from] PreferenceError),

    #[error("plan failed integrity check: {0}")]
    Integrity(#[from] PlanIntegrityError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of a modification request.
#[derive(Debug)]
pub struct ModifyOutcome {
    /// The plan after the request (unchanged on a no-op).
    pub plan: Plan,
    /// Which rules matched, and which of those applied.
    pub changes: ChangeLog,
    /// Advisory message for display; `None` when no rule applied.
    pub advisory: Option<String>,
}

// ---------------------------------------------------------------------------
// PlanController
// ---------------------------------------------------------------------------

/// Drives one owner's plan through its lifecycle.
pub struct PlanController {
    owner_id: String,
    catalog: Arc<Catalog>,
    store: Arc<dyn PlanStore>,
    advisor: Arc<dyn Advisor>,
    state: Mutex<SessionState>,
}

impl PlanController {
    pub fn new(
        owner_id: impl Into<String>,
        catalog: Arc<Catalog>,
        store: Arc<dyn PlanStore>,
        advisor: Arc<dyn Advisor>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            catalog,
            store,
            advisor,
            state: Mutex::new(SessionState::NoPlan),
        }
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Restore the session from storage at startup: a persisted plan puts
    /// the session straight into `Active`.
    pub async fn hydrate(&self) -> Result<SessionPhase, SchedulerError> {
        let mut state = self.state.lock().await;
        if let Some(plan) = self.store.load(&self.owner_id).await? {
            debug!(owner = %self.owner_id, plan_id = %plan.id, "restored active plan from store");
            *state = SessionState::Active(plan);
        }
        Ok(state.phase())
    }

    /// Current lifecycle phase.
    pub async fn phase(&self) -> SessionPhase {
        self.state.lock().await.phase()
    }

    /// Snapshot of the confirmed plan, if the session is active.
    pub async fn active_plan(&self) -> Option<Plan> {
        match &*self.state.lock().await {
            SessionState::Active(plan) => Some(plan.clone()),
            _ => None,
        }
    }

    /// Generate a draft plan from preferences. Nothing is persisted until
    /// the draft is confirmed.
    pub async fn preview(&self, prefs: &Preferences) -> Result<Plan, SchedulerError> {
        prefs.validate()?;

        let mut state = self.state.lock().await;
        match &*state {
            SessionState::Active(_) => return Err(SchedulerError::ActivePlanExists),
            SessionState::Draft(_) => return Err(SchedulerError::DraftPending),
            SessionState::NoPlan => {}
        }

        let plan = generate(self.catalog.units(), prefs, &self.owner_id);
        plan.check_integrity()?;

        info!(
            owner = %self.owner_id,
            units = plan.total_units,
            end_date = %plan.target_end_date,
            "generated draft plan"
        );

        *state = SessionState::Draft(plan.clone());
        Ok(plan)
    }

    /// Confirm the draft: persist it and mark the session active.
    ///
    /// The draft is only promoted after the save succeeds; a persistence
    /// failure leaves the draft in place for a retry.
    pub async fn confirm(&self) -> Result<Plan, SchedulerError> {
        let mut state = self.state.lock().await;
        let SessionState::Draft(draft) = &*state else {
            return Err(SchedulerError::NoDraft);
        };

        let mut plan = draft.clone();
        plan.is_active = true;

        self.store.save(&self.owner_id, &plan).await?;

        info!(owner = %self.owner_id, plan_id = %plan.id, "plan confirmed and persisted");
        *state = SessionState::Active(plan.clone());
        Ok(plan)
    }

    /// Discard the draft and return to preference collection.
    pub async fn reject(&self) -> Result<(), SchedulerError> {
        let mut state = self.state.lock().await;
        if !matches!(&*state, SessionState::Draft(_)) {
            return Err(SchedulerError::NoDraft);
        }

        info!(owner = %self.owner_id, "draft plan rejected");
        *state = SessionState::NoPlan;
        Ok(())
    }

    /// Apply a free-text modification request to the active plan.
    ///
    /// Refused with [`SchedulerError::Busy`] while another modification is
    /// in flight. A request matching no rule is a valid no-op: the plan is
    /// returned unchanged, nothing is persisted, and no advisory is
    /// requested. Otherwise the new plan is persisted, committed, and an
    /// advisory message fetched best-effort.
    pub async fn modify(&self, request: &str) -> Result<ModifyOutcome, SchedulerError> {
        let mut state = self
            .state
            .try_lock()
            .map_err(|_| SchedulerError::Busy)?;

        let current = match &*state {
            SessionState::Active(plan) => plan.clone(),
            _ => return Err(SchedulerError::NoActivePlan),
        };

        let (plan, changes) = apply_request(&current, self.catalog.units(), request);

        if !changes.any_applied() {
            debug!(owner = %self.owner_id, "no modification rule applied");
            return Ok(ModifyOutcome {
                plan,
                changes,
                advisory: None,
            });
        }

        plan.check_integrity()?;
        self.store.save(&self.owner_id, &plan).await?;
        *state = SessionState::Active(plan.clone());

        info!(
            owner = %self.owner_id,
            applied = changes.applied_summaries().len(),
            units = plan.total_units,
            end_date = %plan.target_end_date,
            "plan modified and persisted"
        );

        // The mutation is already committed; a slow or failing advisory
        // service can only affect the confirmation text.
        let context = format!("{} units through {}", plan.total_units, plan.target_end_date);
        let advisory =
            advisory_or_fallback(self.advisor.as_ref(), &plan.description, &context).await;

        Ok(ModifyOutcome {
            plan,
            changes,
            advisory: Some(advisory),
        })
    }

    /// Delete the persisted plan and return to the pre-plan state.
    pub async fn reset(&self) -> Result<(), SchedulerError> {
        let mut state = self.state.lock().await;
        if !matches!(&*state, SessionState::Active(_)) {
            return Err(SchedulerError::NoActivePlan);
        }

        self.store.delete(&self.owner_id).await?;
        info!(owner = %self.owner_id, "plan reset; persisted record deleted");
        *state = SessionState::NoPlan;
        Ok(())
    }
}
