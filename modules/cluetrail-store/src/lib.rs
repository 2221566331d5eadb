//! Postgres persistence for the buzz engine: daily counters, issued
//! clues, repeat markers, search areas, the admin-owned target
//! registry, notifications and the audit trail.

pub mod models;
pub mod store;

pub use models::{ClueRow, SearchAreaRow};
pub use store::PgBuzzStore;
