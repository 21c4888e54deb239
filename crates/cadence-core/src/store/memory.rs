//! In-process plan store backed by a `HashMap`. Used by tests and demos;
//! nothing survives the process.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::plan::Plan;

use super::{PlanStore, StoreError};

/// A `PlanStore` that keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    plans: RwLock<HashMap<String, Plan>>,
}

#[async_trait]
impl PlanStore for MemoryStore {
    async fn load(&self, owner_id: &str) -> Result<Option<Plan>, StoreError> {
        Ok(self.plans.read().await.get(owner_id).cloned())
    }

    async fn save(&self, owner_id: &str, plan: &Plan) -> Result<(), StoreError> {
        self.plans
            .write()
            .await
            .insert(owner_id.to_owned(), plan.clone());
        Ok(())
    }

    async fn delete(&self, owner_id: &str) -> Result<bool, StoreError> {
        Ok(self.plans.write().await.remove(owner_id).is_some())
    }
}
