//! PostgreSQL-backed plan store.
//!
//! Serializes the plan to a JSON document and delegates to the
//! owner-keyed queries in `cadence-db`.

use async_trait::async_trait;
use sqlx::PgPool;

use cadence_db::queries::plans as plan_db;

use crate::plan::Plan;

use super::{PlanStore, StoreError};

/// A `PlanStore` backed by the `plans` table in PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgPlanStore {
    pool: PgPool,
}

impl PgPlanStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlanStore for PgPlanStore {
    async fn load(&self, owner_id: &str) -> Result<Option<Plan>, StoreError> {
        let record = plan_db::get_plan(&self.pool, owner_id)
            .await
            .map_err(StoreError::Backend)?;

        match record {
            Some(record) => {
                let plan: Plan = serde_json::from_value(record.document)?;
                Ok(Some(plan))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, owner_id: &str, plan: &Plan) -> Result<(), StoreError> {
        let document = serde_json::to_value(plan)?;
        plan_db::upsert_plan(&self.pool, owner_id, &document)
            .await
            .map_err(StoreError::Backend)?;
        Ok(())
    }

    async fn delete(&self, owner_id: &str) -> Result<bool, StoreError> {
        plan_db::delete_plan(&self.pool, owner_id)
            .await
            .map_err(StoreError::Backend)
    }
}
