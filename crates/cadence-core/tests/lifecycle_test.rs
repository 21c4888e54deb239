//! Tests for the plan lifecycle controller.
//!
//! Uses in-memory and fault-injecting stores so no database is required;
//! the PostgreSQL store has its own integration suite.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Notify;

use cadence_core::advisor::{Advisor, FALLBACK_ADVISORY, TemplateAdvisor};
use cadence_core::catalog::Catalog;
use cadence_core::lifecycle::{PlanController, SchedulerError, SessionPhase};
use cadence_core::plan::{DifficultyLevel, FocusArea, Plan, Preferences};
use cadence_core::store::memory::MemoryStore;
use cadence_core::store::{PlanStore, StoreError};

// ===========================================================================
// Test stores and advisors
// ===========================================================================

/// A store whose saves always fail.
struct FailingStore;

#[async_trait]
impl PlanStore for FailingStore {
    async fn load(&self, _owner_id: &str) -> Result<Option<Plan>, StoreError> {
        Ok(None)
    }

    async fn save(&self, _owner_id: &str, _plan: &Plan) -> Result<(), StoreError> {
        Err(StoreError::Backend(anyhow::anyhow!("disk on fire")))
    }

    async fn delete(&self, _owner_id: &str) -> Result<bool, StoreError> {
        Ok(false)
    }
}

/// A store that works until `fail_saves` is flipped on.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_saves: AtomicBool,
}

#[async_trait]
impl PlanStore for FlakyStore {
    async fn load(&self, owner_id: &str) -> Result<Option<Plan>, StoreError> {
        self.inner.load(owner_id).await
    }

    async fn save(&self, owner_id: &str, plan: &Plan) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(anyhow::anyhow!("write refused")));
        }
        self.inner.save(owner_id, plan).await
    }

    async fn delete(&self, owner_id: &str) -> Result<bool, StoreError> {
        self.inner.delete(owner_id).await
    }
}

/// A store whose saves can be held open, for exercising the busy flag.
#[derive(Default)]
struct BlockingStore {
    inner: MemoryStore,
    block_next_save: AtomicBool,
    entered_save: Notify,
    release_save: Notify,
}

#[async_trait]
impl PlanStore for BlockingStore {
    async fn load(&self, owner_id: &str) -> Result<Option<Plan>, StoreError> {
        self.inner.load(owner_id).await
    }

    async fn save(&self, owner_id: &str, plan: &Plan) -> Result<(), StoreError> {
        if self.block_next_save.swap(false, Ordering::SeqCst) {
            self.entered_save.notify_one();
            self.release_save.notified().await;
        }
        self.inner.save(owner_id, plan).await
    }

    async fn delete(&self, owner_id: &str) -> Result<bool, StoreError> {
        self.inner.delete(owner_id).await
    }
}

/// An advisor that always fails.
struct UnreachableAdvisor;

#[async_trait]
impl Advisor for UnreachableAdvisor {
    fn name(&self) -> &str {
        "unreachable"
    }

    async fn summarize(&self, _changes: &str, _context: &str) -> anyhow::Result<String> {
        anyhow::bail!("connection refused")
    }
}

// ===========================================================================
// Helpers
// ===========================================================================

fn beginner_prefs() -> Preferences {
    Preferences {
        difficulty: DifficultyLevel::Beginner,
        focus_area: FocusArea::All,
        units_per_week: 3,
        total_units: 8,
        minutes_per_unit: None,
        preferred_days: vec![],
        start_date: "2024-01-01".parse().unwrap(),
    }
}

fn controller_with(store: Arc<dyn PlanStore>) -> PlanController {
    PlanController::new(
        "alice",
        Arc::new(Catalog::embedded()),
        store,
        Arc::new(TemplateAdvisor),
    )
}

// ===========================================================================
// Tests
// ===========================================================================

#[tokio::test]
async fn full_lifecycle_preview_confirm_modify_reset() {
    let store = Arc::new(MemoryStore::default());
    let controller = controller_with(store.clone());

    assert_eq!(controller.phase().await, SessionPhase::NoPlan);

    // Preview: draft exists, nothing persisted.
    let draft = controller.preview(&beginner_prefs()).await.expect("preview");
    assert_eq!(controller.phase().await, SessionPhase::Draft);
    assert!(!draft.is_active);
    assert!(store.load("alice").await.unwrap().is_none());

    // Confirm: persisted and active.
    let active = controller.confirm().await.expect("confirm");
    assert_eq!(controller.phase().await, SessionPhase::Active);
    assert!(active.is_active);
    let stored = store.load("alice").await.unwrap().expect("persisted");
    assert_eq!(stored, active);

    // Modify: engine result persisted, advisory produced.
    let outcome = controller
        .modify("can we spread out the dates")
        .await
        .expect("modify");
    assert!(outcome.changes.any_applied());
    let advisory = outcome.advisory.expect("advisory for an applied change");
    assert!(advisory.contains("spread sessions five days apart"));
    let stored = store.load("alice").await.unwrap().expect("persisted");
    assert_eq!(stored, outcome.plan);
    assert_eq!(controller.active_plan().await, Some(outcome.plan));

    // Reset: record deleted, back to the pre-plan state.
    controller.reset().await.expect("reset");
    assert_eq!(controller.phase().await, SessionPhase::NoPlan);
    assert!(store.load("alice").await.unwrap().is_none());
}

#[tokio::test]
async fn modify_without_active_plan_is_rejected() {
    let controller = controller_with(Arc::new(MemoryStore::default()));

    let err = controller.modify("harder").await.unwrap_err();
    assert!(matches!(err, SchedulerError::NoActivePlan));
    // The error carries guidance toward creating a plan first.
    assert!(err.to_string().contains("confirm a plan"));

    // A draft is not enough either.
    controller.preview(&beginner_prefs()).await.expect("preview");
    let err = controller.modify("harder").await.unwrap_err();
    assert!(matches!(err, SchedulerError::NoActivePlan));
}

#[tokio::test]
async fn reject_discards_draft_without_persisting() {
    let store = Arc::new(MemoryStore::default());
    let controller = controller_with(store.clone());

    controller.preview(&beginner_prefs()).await.expect("preview");
    controller.reject().await.expect("reject");

    assert_eq!(controller.phase().await, SessionPhase::NoPlan);
    assert!(store.load("alice").await.unwrap().is_none());

    // Back at preference collection: a new preview is legal.
    controller.preview(&beginner_prefs()).await.expect("second preview");
}

#[tokio::test]
async fn confirm_and_reject_require_a_draft() {
    let controller = controller_with(Arc::new(MemoryStore::default()));

    assert!(matches!(
        controller.confirm().await.unwrap_err(),
        SchedulerError::NoDraft
    ));
    assert!(matches!(
        controller.reject().await.unwrap_err(),
        SchedulerError::NoDraft
    ));
}

#[tokio::test]
async fn preview_is_blocked_by_draft_and_active_plans() {
    let controller = controller_with(Arc::new(MemoryStore::default()));

    controller.preview(&beginner_prefs()).await.expect("preview");
    assert!(matches!(
        controller.preview(&beginner_prefs()).await.unwrap_err(),
        SchedulerError::DraftPending
    ));

    controller.confirm().await.expect("confirm");
    assert!(matches!(
        controller.preview(&beginner_prefs()).await.unwrap_err(),
        SchedulerError::ActivePlanExists
    ));
}

#[tokio::test]
async fn invalid_preferences_are_rejected_before_generation() {
    let controller = controller_with(Arc::new(MemoryStore::default()));

    let mut prefs = beginner_prefs();
    prefs.units_per_week = 0;

    let err = controller.preview(&prefs).await.unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidPreferences(_)));
    assert_eq!(controller.phase().await, SessionPhase::NoPlan);
}

#[tokio::test]
async fn confirm_save_failure_leaves_draft_in_place() {
    let controller = controller_with(Arc::new(FailingStore));

    controller.preview(&beginner_prefs()).await.expect("preview");
    let err = controller.confirm().await.unwrap_err();
    assert!(matches!(err, SchedulerError::Store(_)));

    // The draft survives for a retry; the session is not active.
    assert_eq!(controller.phase().await, SessionPhase::Draft);
    assert_eq!(controller.active_plan().await, None);
}

#[tokio::test]
async fn modify_save_failure_keeps_previous_active_plan() {
    let store = Arc::new(FlakyStore::default());
    let controller = controller_with(store.clone());

    controller.preview(&beginner_prefs()).await.expect("preview");
    let active = controller.confirm().await.expect("confirm");

    store.fail_saves.store(true, Ordering::SeqCst);
    let err = controller.modify("spread out").await.unwrap_err();
    assert!(matches!(err, SchedulerError::Store(_)));

    // The caller-visible plan and the stored record both still hold the
    // pre-modification schedule.
    assert_eq!(controller.active_plan().await, Some(active.clone()));
    assert_eq!(store.load("alice").await.unwrap(), Some(active));
}

#[tokio::test]
async fn unrecognized_request_is_a_silent_noop() {
    let store = Arc::new(MemoryStore::default());
    let controller = controller_with(store.clone());

    controller.preview(&beginner_prefs()).await.expect("preview");
    let active = controller.confirm().await.expect("confirm");

    let outcome = controller
        .modify("xyz-unrecognized-text")
        .await
        .expect("no-op modify");
    assert!(!outcome.changes.matched());
    assert!(outcome.advisory.is_none());
    assert_eq!(outcome.plan, active);

    // Nothing was re-persisted.
    assert_eq!(store.load("alice").await.unwrap(), Some(active));
}

#[tokio::test]
async fn concurrent_modification_is_refused_while_busy() {
    let store = Arc::new(BlockingStore::default());
    let controller = Arc::new(PlanController::new(
        "alice",
        Arc::new(Catalog::embedded()),
        store.clone() as Arc<dyn PlanStore>,
        Arc::new(TemplateAdvisor),
    ));

    controller.preview(&beginner_prefs()).await.expect("preview");
    controller.confirm().await.expect("confirm");

    // Hold the next save open so the first modification stays in flight.
    store.block_next_save.store(true, Ordering::SeqCst);
    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.modify("spread out").await }
    });
    store.entered_save.notified().await;

    // Second request while the first is mid-persist: refused, not queued.
    let err = controller.modify("faster").await.unwrap_err();
    assert!(matches!(err, SchedulerError::Busy));

    store.release_save.notify_one();
    let outcome = first.await.expect("task").expect("first modify succeeds");
    assert!(outcome.changes.any_applied());

    // With the slot free again, modification works.
    controller.modify("faster").await.expect("modify after release");
}

#[tokio::test]
async fn advisory_failure_falls_back_and_never_blocks_the_mutation() {
    let store = Arc::new(MemoryStore::default());
    let controller = PlanController::new(
        "alice",
        Arc::new(Catalog::embedded()),
        store.clone() as Arc<dyn PlanStore>,
        Arc::new(UnreachableAdvisor),
    );

    controller.preview(&beginner_prefs()).await.expect("preview");
    controller.confirm().await.expect("confirm");

    let outcome = controller.modify("make it harder").await.expect("modify");
    assert_eq!(outcome.advisory.as_deref(), Some(FALLBACK_ADVISORY));

    // The mutation itself is committed despite the advisory failure.
    let stored = store.load("alice").await.unwrap().expect("persisted");
    assert_eq!(stored, outcome.plan);
    assert!(stored.scheduled_units.iter().all(|u| u.unit.level >= 15));
}

#[tokio::test]
async fn hydrate_restores_an_active_session() {
    let store = Arc::new(MemoryStore::default());

    // First session confirms a plan.
    let first = controller_with(store.clone());
    first.preview(&beginner_prefs()).await.expect("preview");
    let active = first.confirm().await.expect("confirm");

    // A fresh controller over the same store resumes as active.
    let second = controller_with(store.clone());
    assert_eq!(second.phase().await, SessionPhase::NoPlan);
    let phase = second.hydrate().await.expect("hydrate");
    assert_eq!(phase, SessionPhase::Active);
    assert_eq!(second.active_plan().await, Some(active));

    // And an empty store hydrates to the pre-plan state.
    let empty = controller_with(Arc::new(MemoryStore::default()));
    assert_eq!(empty.hydrate().await.expect("hydrate"), SessionPhase::NoPlan);
}
