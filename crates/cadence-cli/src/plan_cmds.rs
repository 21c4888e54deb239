//! Operator CLI handlers for `cadence plan` subcommands.
//!
//! Implements:
//! - `cadence plan preview`        -- generate and print a draft (not persisted)
//! - `cadence plan create`         -- generate, confirm, and persist a plan
//! - `cadence plan show`           -- show the active plan
//! - `cadence plan modify <text>`  -- apply a free-text change request
//! - `cadence plan reset`          -- delete the active plan

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Weekday;
use sqlx::PgPool;

use cadence_core::advisor::TemplateAdvisor;
use cadence_core::catalog::{Catalog, parse_catalog_toml};
use cadence_core::lifecycle::PlanController;
use cadence_core::plan::{Plan, Preferences};
use cadence_core::store::postgres::PgPlanStore;

use crate::{PlanCommands, PrefArgs};

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

/// Dispatch a `PlanCommands` variant to the appropriate handler.
pub async fn run_plan_command(command: PlanCommands, pool: &PgPool, owner: &str) -> Result<()> {
    match command {
        PlanCommands::Preview { prefs } => cmd_preview(pool, owner, &prefs).await,
        PlanCommands::Create { prefs } => cmd_create(pool, owner, &prefs).await,
        PlanCommands::Show => cmd_show(pool, owner).await,
        PlanCommands::Modify { request } => cmd_modify(pool, owner, &request).await,
        PlanCommands::Reset => cmd_reset(pool, owner).await,
    }
}

// -----------------------------------------------------------------------
// Shared helpers
// -----------------------------------------------------------------------

fn build_controller(pool: &PgPool, owner: &str, catalog: Catalog) -> PlanController {
    PlanController::new(
        owner,
        Arc::new(catalog),
        Arc::new(PgPlanStore::new(pool.clone())),
        Arc::new(TemplateAdvisor),
    )
}

/// Load a catalog TOML file, or fall back to the embedded starter catalog.
fn load_catalog(path: Option<&str>) -> Result<Catalog> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read catalog file: {path}"))?;
            parse_catalog_toml(&content)
                .with_context(|| format!("failed to parse catalog file: {path}"))
        }
        None => Ok(Catalog::embedded()),
    }
}

/// Parse a comma-separated weekday list, e.g. "mon,wed,fri".
fn parse_days(spec: &str) -> Result<Vec<Weekday>> {
    spec.split(',')
        .map(|day| {
            let day = day.trim();
            day.parse::<Weekday>()
                .map_err(|_| anyhow::anyhow!("invalid weekday: {day:?}"))
        })
        .collect()
}

impl PrefArgs {
    fn to_preferences(&self) -> Result<Preferences> {
        let preferred_days = match &self.days {
            Some(spec) => parse_days(spec)?,
            None => vec![],
        };
        Ok(Preferences {
            difficulty: self.difficulty,
            focus_area: self.focus,
            // The controller rejects 0; larger values clamp to a full week.
            units_per_week: self.units_per_week.min(7),
            total_units: self.total_units,
            minutes_per_unit: self.minutes_per_unit,
            preferred_days,
            start_date: self
                .start_date
                .unwrap_or_else(|| chrono::Utc::now().date_naive()),
        })
    }
}

/// Print a plan header and its schedule table.
fn print_plan(plan: &Plan) {
    println!("{}", plan.title);
    if !plan.description.is_empty() {
        println!("{}", plan.description);
    }
    println!();
    println!("  Owner:       {}", plan.owner_id);
    println!("  Status:      {}", if plan.is_active { "active" } else { "draft" });
    println!("  Units:       {}", plan.total_units);
    println!("  Weekly goal: {}", plan.weekly_goal);
    println!("  Start date:  {}", plan.start_date);
    println!("  End date:    {}", plan.target_end_date);
    if plan.statistics.completed_units > 0 {
        println!("  Completed:   {}", plan.statistics.completed_units);
    }

    if plan.scheduled_units.is_empty() {
        println!();
        println!("No units matched the preferences; the schedule is empty.");
        return;
    }

    println!();

    // Compute column widths for a clean table.
    let title_w = plan
        .scheduled_units
        .iter()
        .map(|u| u.unit.title.len())
        .max()
        .unwrap_or(5)
        .max(5);
    let category_w = 12;
    let priority_w = 8;

    println!(
        "{:<10}  {:<title_w$}  {:>5}  {:<category_w$}  {:<priority_w$}  {:>4}",
        "DATE", "TITLE", "LEVEL", "CATEGORY", "PRIORITY", "MIN",
    );
    for unit in &plan.scheduled_units {
        println!(
            "{:<10}  {:<title_w$}  {:>5}  {:<category_w$}  {:<priority_w$}  {:>4}",
            unit.scheduled_date.to_string(),
            unit.unit.title,
            unit.unit.level,
            unit.unit.category.to_string(),
            unit.priority.to_string(),
            unit.estimated_minutes,
        );
    }
}

// -----------------------------------------------------------------------
// cadence plan preview
// -----------------------------------------------------------------------

async fn cmd_preview(pool: &PgPool, owner: &str, args: &PrefArgs) -> Result<()> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    let prefs = args.to_preferences()?;

    let controller = build_controller(pool, owner, catalog);
    controller.hydrate().await?;
    let plan = controller.preview(&prefs).await?;

    print_plan(&plan);
    println!();
    println!("Preview only. Run `cadence plan create` with the same options to confirm.");
    Ok(())
}

// -----------------------------------------------------------------------
// cadence plan create
// -----------------------------------------------------------------------

async fn cmd_create(pool: &PgPool, owner: &str, args: &PrefArgs) -> Result<()> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    let prefs = args.to_preferences()?;

    let controller = build_controller(pool, owner, catalog);
    controller.hydrate().await?;
    controller.preview(&prefs).await?;
    let plan = controller.confirm().await?;

    println!("Plan created and confirmed.");
    println!();
    print_plan(&plan);
    Ok(())
}

// -----------------------------------------------------------------------
// cadence plan show
// -----------------------------------------------------------------------

async fn cmd_show(pool: &PgPool, owner: &str) -> Result<()> {
    let controller = build_controller(pool, owner, Catalog::embedded());
    controller.hydrate().await?;

    match controller.active_plan().await {
        Some(plan) => print_plan(&plan),
        None => {
            println!("No active plan for {owner}. Use `cadence plan create` to make one.");
        }
    }
    Ok(())
}

// -----------------------------------------------------------------------
// cadence plan modify
// -----------------------------------------------------------------------

async fn cmd_modify(pool: &PgPool, owner: &str, request: &str) -> Result<()> {
    let controller = build_controller(pool, owner, Catalog::embedded());
    controller.hydrate().await?;

    let outcome = controller.modify(request).await?;

    if !outcome.changes.matched() {
        println!("No recognized change in {request:?}; the plan was left as is.");
        return Ok(());
    }

    for entry in &outcome.changes.entries {
        if entry.applied {
            println!("applied: {}", entry.summary);
        } else {
            println!("skipped: {} (no matching units in the catalog)", entry.rule);
        }
    }

    if let Some(advisory) = &outcome.advisory {
        println!();
        println!("{advisory}");
    }

    println!();
    print_plan(&outcome.plan);
    Ok(())
}

// -----------------------------------------------------------------------
// cadence plan reset
// -----------------------------------------------------------------------

async fn cmd_reset(pool: &PgPool, owner: &str) -> Result<()> {
    let controller = build_controller(pool, owner, Catalog::embedded());
    controller.hydrate().await?;
    controller.reset().await?;

    println!("Active plan for {owner} deleted.");
    Ok(())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
