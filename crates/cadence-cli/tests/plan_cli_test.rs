//! Integration test for the operator plan flow the CLI drives: create,
//! resume, modify, and reset against a real PostgreSQL instance.
//!
//! Exercises the same controller-plus-store wiring the `cadence plan`
//! commands use, with an isolated temporary database per test.

use std::sync::Arc;

use cadence_core::advisor::TemplateAdvisor;
use cadence_core::catalog::Catalog;
use cadence_core::lifecycle::{PlanController, SchedulerError, SessionPhase};
use cadence_core::plan::{DifficultyLevel, FocusArea, Preferences};
use cadence_core::store::PlanStore;
use cadence_core::store::postgres::PgPlanStore;
use cadence_test_utils::{create_test_db, drop_test_db};

fn controller(pool: &sqlx::PgPool, owner: &str) -> PlanController {
    PlanController::new(
        owner,
        Arc::new(Catalog::embedded()),
        Arc::new(PgPlanStore::new(pool.clone())),
        Arc::new(TemplateAdvisor),
    )
}

fn prefs() -> Preferences {
    Preferences {
        difficulty: DifficultyLevel::Beginner,
        focus_area: FocusArea::All,
        units_per_week: 3,
        total_units: 10,
        minutes_per_unit: None,
        preferred_days: vec![chrono::Weekday::Mon, chrono::Weekday::Wed],
        start_date: "2024-01-01".parse().unwrap(),
    }
}

#[tokio::test]
async fn operator_flow_create_modify_reset() {
    let (pool, db_name) = create_test_db().await;

    // `cadence plan create` = hydrate + preview + confirm.
    let create = controller(&pool, "operator");
    create.hydrate().await.expect("hydrate");
    create.preview(&prefs()).await.expect("preview");
    let active = create.confirm().await.expect("confirm");
    assert!(active.is_active);

    // `cadence plan modify` runs in a fresh process: hydrate then modify.
    let modify = controller(&pool, "operator");
    assert_eq!(modify.hydrate().await.expect("hydrate"), SessionPhase::Active);
    let outcome = modify.modify("focus on words").await.expect("modify");
    assert!(outcome.changes.any_applied());
    assert!(outcome
        .plan
        .scheduled_units
        .iter()
        .all(|u| u.unit.category == cadence_core::catalog::Category::Words));

    // A different owner sees no plan.
    let other = controller(&pool, "someone-else");
    other.hydrate().await.expect("hydrate");
    let err = other.modify("harder").await.unwrap_err();
    assert!(matches!(err, SchedulerError::NoActivePlan));

    // `cadence plan reset` deletes the record.
    let reset = controller(&pool, "operator");
    reset.hydrate().await.expect("hydrate");
    reset.reset().await.expect("reset");

    let store = PgPlanStore::new(pool.clone());
    assert!(store.load("operator").await.unwrap().is_none());

    pool.close().await;
    drop_test_db(&db_name).await;
}
