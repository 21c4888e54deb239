use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted plan document.
///
/// One row per owner: the scheduler's `Plan` is serialized to JSON by the
/// caller and stored opaquely in `document`. This crate never interprets
/// the document's contents.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlanRecord {
    pub owner_id: String,
    pub document: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_serde_roundtrip() {
        let record = PlanRecord {
            owner_id: "alice".to_string(),
            document: serde_json::json!({"title": "plan", "total_units": 3}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&record).expect("serialize");
        let back: PlanRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.owner_id, "alice");
        assert_eq!(back.document["total_units"], 3);
    }
}
