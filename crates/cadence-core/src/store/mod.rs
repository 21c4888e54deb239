//! The `PlanStore` trait -- the adapter interface for plan persistence.
//!
//! The scheduler treats storage as a key-value store keyed by owner id.
//! The trait is intentionally object-safe so controllers can hold an
//! `Arc<dyn PlanStore>` and tests can swap in [`memory::MemoryStore`].

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::plan::Plan;

/// Errors surfaced by a plan store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The plan document could not be encoded or decoded.
    #[error("plan document codec error: {0}")]
    Document(#[from] serde_json::Error),

    /// The storage backend failed (connection, query, I/O).
    #[error("storage backend error: {0}")]
    Backend(#[source] anyhow::Error),
}

/// Adapter interface for persisting one plan per owner.
///
/// # Object Safety
///
/// This trait is object-safe: it can be stored as `Box<dyn PlanStore>` or
/// `Arc<dyn PlanStore>`.
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Load the owner's plan, or `None` if nothing is stored.
    async fn load(&self, owner_id: &str) -> Result<Option<Plan>, StoreError>;

    /// Store (or replace) the owner's plan.
    async fn save(&self, owner_id: &str, plan: &Plan) -> Result<(), StoreError>;

    /// Delete the owner's plan. Returns `true` if a record existed.
    async fn delete(&self, owner_id: &str) -> Result<bool, StoreError>;
}

// Compile-time assertion: PlanStore must be object-safe.
// If this line compiles, the trait can be used as `dyn PlanStore`.
const _: () = {
    fn _assert_object_safe(_: &dyn PlanStore) {}
};

#[cfg(test)]
mod tests {
    use super::memory::MemoryStore;
    use super::*;
    use crate::catalog::{Category, LearningUnit};
    use crate::plan::generate::{DifficultyLevel, FocusArea, Preferences, generate};

    fn sample_plan(owner: &str) -> Plan {
        let pool: Vec<LearningUnit> = (0..5)
            .map(|i| LearningUnit {
                id: format!("s{i}"),
                title: format!("Unit {i}"),
                description: String::new(),
                level: 4,
                category: Category::Basics,
                duration_minutes: 15,
            })
            .collect();
        let prefs = Preferences {
            difficulty: DifficultyLevel::Beginner,
            focus_area: FocusArea::All,
            units_per_week: 2,
            total_units: 5,
            minutes_per_unit: None,
            preferred_days: vec![],
            start_date: "2024-03-04".parse().unwrap(),
        };
        generate(&pool, &prefs, owner)
    }

    #[tokio::test]
    async fn memory_store_roundtrip_through_trait_object() {
        let store: Box<dyn PlanStore> = Box::new(MemoryStore::default());

        assert!(store.load("dana").await.unwrap().is_none());

        let plan = sample_plan("dana");
        store.save("dana", &plan).await.unwrap();
        let loaded = store.load("dana").await.unwrap().expect("plan stored");
        assert_eq!(loaded, plan);

        assert!(store.delete("dana").await.unwrap());
        assert!(!store.delete("dana").await.unwrap());
        assert!(store.load("dana").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn memory_store_keys_by_owner() {
        let store = MemoryStore::default();
        let dana = sample_plan("dana");
        let eli = sample_plan("eli");

        store.save("dana", &dana).await.unwrap();
        store.save("eli", &eli).await.unwrap();

        assert_eq!(store.load("dana").await.unwrap().unwrap().owner_id, "dana");
        assert_eq!(store.load("eli").await.unwrap().unwrap().owner_id, "eli");
    }
}
