//! Database query functions for the `plans` table.
//!
//! The table is a key-value store: one JSONB plan document per owner.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::PlanRecord;

/// Insert or replace the plan document for an owner. Returns the stored
/// record with server-generated timestamps.
pub async fn upsert_plan(
    pool: &PgPool,
    owner_id: &str,
    document: &serde_json::Value,
) -> Result<PlanRecord> {
    let record = sqlx::query_as::<_, PlanRecord>(
        "INSERT INTO plans (owner_id, document) \
         VALUES ($1, $2) \
         ON CONFLICT (owner_id) \
         DO UPDATE SET document = EXCLUDED.document, updated_at = now() \
         RETURNING *",
    )
    .bind(owner_id)
    .bind(document)
    .fetch_one(pool)
    .await
    .context("failed to upsert plan")?;

    Ok(record)
}

/// Fetch the plan document for an owner, if one exists.
pub async fn get_plan(pool: &PgPool, owner_id: &str) -> Result<Option<PlanRecord>> {
    let record = sqlx::query_as::<_, PlanRecord>("SELECT * FROM plans WHERE owner_id = $1")
        .bind(owner_id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch plan")?;

    Ok(record)
}

/// Delete the plan document for an owner.
///
/// Returns `true` if a record was deleted, `false` if none existed.
pub async fn delete_plan(pool: &PgPool, owner_id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM plans WHERE owner_id = $1")
        .bind(owner_id)
        .execute(pool)
        .await
        .context("failed to delete plan")?;

    Ok(result.rows_affected() > 0)
}

/// List all stored plans, ordered by last update (newest first).
pub async fn list_plans(pool: &PgPool) -> Result<Vec<PlanRecord>> {
    let records = sqlx::query_as::<_, PlanRecord>("SELECT * FROM plans ORDER BY updated_at DESC")
        .fetch_all(pool)
        .await
        .context("failed to list plans")?;

    Ok(records)
}
