//! End-to-end scheduling scenarios over a generated 50-unit catalog,
//! driven through the lifecycle controller.

use std::fmt::Write as _;
use std::sync::Arc;

use cadence_core::advisor::TemplateAdvisor;
use cadence_core::catalog::{Catalog, Category, parse_catalog_toml};
use cadence_core::lifecycle::PlanController;
use cadence_core::plan::{DifficultyLevel, FocusArea, Preferences};
use cadence_core::store::memory::MemoryStore;

/// A 50-unit catalog with ids u1..u50, levels cycling 1..=30 and
/// categories cycling through the full set.
fn catalog_50() -> Catalog {
    catalog_with_levels(|i| (i % 30) as u8 + 1)
}

fn catalog_with_levels(level_for: impl Fn(usize) -> u8) -> Catalog {
    let mut toml = String::new();
    for i in 0..50 {
        let category = Category::ALL[i % Category::ALL.len()];
        write!(
            toml,
            r#"
[[units]]
id = "u{}"
title = "Unit {}"
level = {}
category = "{category}"
duration_minutes = 15
"#,
            i + 1,
            i + 1,
            level_for(i),
        )
        .expect("writing to a String cannot fail");
    }
    parse_catalog_toml(&toml).expect("generated catalog is valid")
}

fn scenario_prefs() -> Preferences {
    Preferences {
        difficulty: DifficultyLevel::Beginner,
        focus_area: FocusArea::All,
        units_per_week: 3,
        total_units: 12,
        minutes_per_unit: None,
        preferred_days: vec![],
        start_date: "2024-01-01".parse().unwrap(),
    }
}

fn controller(catalog: Catalog) -> PlanController {
    PlanController::new(
        "scenario-user",
        Arc::new(catalog),
        Arc::new(MemoryStore::default()),
        Arc::new(TemplateAdvisor),
    )
}

#[tokio::test]
async fn scenario_a_beginner_plan_dates() {
    let controller = controller(catalog_50());

    let plan = controller.preview(&scenario_prefs()).await.expect("preview");
    assert_eq!(plan.scheduled_units.len(), 12);

    // Three units per week: position 3 opens week 1.
    assert_eq!(
        plan.scheduled_units[3].scheduled_date,
        "2024-01-08".parse().unwrap()
    );
    // Position 9 opens week 3 (day 0 = 21 days in)...
    assert_eq!(
        plan.scheduled_units[9].scheduled_date,
        "2024-01-22".parse().unwrap()
    );
    // ...and position 11 lands on week 3, day 2.
    assert_eq!(
        plan.scheduled_units[11].scheduled_date,
        "2024-01-24".parse().unwrap()
    );
}

#[tokio::test]
async fn scenario_b_make_it_harder() {
    let controller = controller(catalog_50());
    controller.preview(&scenario_prefs()).await.expect("preview");
    controller.confirm().await.expect("confirm");

    let outcome = controller
        .modify("make it harder please")
        .await
        .expect("modify");

    assert!(outcome.changes.any_applied());
    assert!(
        outcome.plan.scheduled_units.iter().all(|u| u.unit.level >= 15),
        "every unit should be challenge-level"
    );
    // ceil(3 * 1.5) = 5.
    assert_eq!(outcome.plan.weekly_goal, 5);
}

#[tokio::test]
async fn scenario_c_spread_out_the_dates() {
    let controller = controller(catalog_50());
    controller.preview(&scenario_prefs()).await.expect("preview");
    controller.confirm().await.expect("confirm");

    let outcome = controller
        .modify("can we spread out the dates")
        .await
        .expect("modify");

    assert_eq!(outcome.plan.scheduled_units.len(), 12);
    for (i, unit) in outcome.plan.scheduled_units.iter().enumerate() {
        assert_eq!(
            unit.scheduled_date,
            "2024-01-01".parse::<chrono::NaiveDate>().unwrap()
                + chrono::Duration::days(i as i64 * 5),
            "unit {i} should sit on an exact five-day step"
        );
    }
    // floor(3 / 2) = 1.
    assert_eq!(outcome.plan.weekly_goal, 1);
}

#[tokio::test]
async fn scenario_d_harder_with_no_challenge_units() {
    // Every unit stays below the challenge threshold.
    let controller = controller(catalog_with_levels(|i| (i % 14) as u8 + 1));
    controller.preview(&scenario_prefs()).await.expect("preview");
    let active = controller.confirm().await.expect("confirm");

    let outcome = controller.modify("harder").await.expect("no exception");
    assert!(outcome.changes.matched());
    assert!(!outcome.changes.any_applied());
    assert_eq!(outcome.plan, active, "plan must be left unchanged");
}
