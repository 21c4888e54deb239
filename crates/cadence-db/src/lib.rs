//! PostgreSQL persistence backend for cadence.
//!
//! Stores each user's confirmed study plan as an opaque JSONB document
//! keyed by owner id. The scheduling logic in `cadence-core` never sees
//! SQL; it goes through the `PlanStore` trait, whose Postgres
//! implementation delegates to the query functions in this crate.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
