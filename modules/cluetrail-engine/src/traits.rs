//! Store and notification seams for the buzz engine.
//!
//! Implemented by `PgBuzzStore` (postgres) and by in-memory fakes in
//! the engine's integration tests.

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use cluetrail_common::{ActiveTarget, AuditEntry, ClueCategory, NewClue, NewSearchArea, SearchArea};

/// Durable state the engine reads and writes during one buzz action.
#[async_trait]
pub trait BuzzStore: Send + Sync {
    /// Atomically increment and return the user's buzz count for `day`.
    ///
    /// Must be a single store-level increment-and-return, not a
    /// read-then-write, so the daily counter invariant holds under
    /// concurrent actions from the same user.
    async fn increment_daily_counter(&self, user_id: Uuid, day: NaiveDate) -> Result<u32>;

    /// The single active target, if one is configured.
    async fn active_target(&self) -> Result<Option<ActiveTarget>>;

    /// Clue keys already shown to this user for (week, category).
    async fn used_clue_keys(
        &self,
        user_id: Uuid,
        week: u32,
        category: ClueCategory,
    ) -> Result<HashSet<String>>;

    /// Persist an issued clue. Returns the new clue's id.
    async fn insert_clue(&self, clue: &NewClue) -> Result<Uuid>;

    /// Record a clue key as used for (user, week, category).
    async fn mark_clue_used(
        &self,
        user_id: Uuid,
        week: u32,
        category: ClueCategory,
        clue_key: &str,
    ) -> Result<()>;

    /// All of a user's search areas, oldest generation first.
    async fn search_areas(&self, user_id: Uuid) -> Result<Vec<SearchArea>>;

    /// Persist a new search-area generation. Returns the new row's id.
    async fn insert_search_area(&self, area: &NewSearchArea) -> Result<Uuid>;

    /// Append one line to the reconciliation trail.
    async fn record_audit(&self, entry: &AuditEntry) -> Result<()>;
}

/// Sink for user-facing notification records.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, user_id: Uuid, title: &str, body: &str) -> Result<()>;
}

// Both seams are also implemented for Arc<T> so tests can keep a handle
// on the store for assertions after handing it to the engine.

#[async_trait]
impl<T: BuzzStore> BuzzStore for std::sync::Arc<T> {
    async fn increment_daily_counter(&self, user_id: Uuid, day: NaiveDate) -> Result<u32> {
        (**self).increment_daily_counter(user_id, day).await
    }

    async fn active_target(&self) -> Result<Option<ActiveTarget>> {
        (**self).active_target().await
    }

    async fn used_clue_keys(
        &self,
        user_id: Uuid,
        week: u32,
        category: ClueCategory,
    ) -> Result<HashSet<String>> {
        (**self).used_clue_keys(user_id, week, category).await
    }

    async fn insert_clue(&self, clue: &NewClue) -> Result<Uuid> {
        (**self).insert_clue(clue).await
    }

    async fn mark_clue_used(
        &self,
        user_id: Uuid,
        week: u32,
        category: ClueCategory,
        clue_key: &str,
    ) -> Result<()> {
        (**self).mark_clue_used(user_id, week, category, clue_key).await
    }

    async fn search_areas(&self, user_id: Uuid) -> Result<Vec<SearchArea>> {
        (**self).search_areas(user_id).await
    }

    async fn insert_search_area(&self, area: &NewSearchArea) -> Result<Uuid> {
        (**self).insert_search_area(area).await
    }

    async fn record_audit(&self, entry: &AuditEntry) -> Result<()> {
        (**self).record_audit(entry).await
    }
}

#[async_trait]
impl<T: Notifier> Notifier for std::sync::Arc<T> {
    async fn notify(&self, user_id: Uuid, title: &str, body: &str) -> Result<()> {
        (**self).notify(user_id, title, body).await
    }
}
