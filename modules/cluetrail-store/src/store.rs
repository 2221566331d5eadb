use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use cluetrail_common::{ActiveTarget, AuditEntry, ClueCategory, NewClue, NewSearchArea, SearchArea};
use cluetrail_engine::{BuzzStore, Notifier};

use crate::models::{ActiveTargetRow, ClueRow, SearchAreaRow};

/// Postgres-backed store. Cloning shares the underlying pool.
#[derive(Clone)]
pub struct PgBuzzStore {
    pool: PgPool,
}

impl PgBuzzStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run the embedded SQL migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // --- Read-side helpers for the API (not part of the engine seam) ---

    /// The user's buzz count for `day` without consuming an action.
    pub async fn current_daily_count(&self, user_id: Uuid, day: NaiveDate) -> Result<u32> {
        let count: Option<i32> = sqlx::query_scalar(
            "SELECT buzz_count FROM daily_buzz_counters WHERE user_id = $1 AND day = $2",
        )
        .bind(user_id)
        .bind(day)
        .fetch_optional(&self.pool)
        .await?;

        Ok(count.unwrap_or(0).max(0) as u32)
    }

    /// All clues issued to a user, newest first.
    pub async fn clues_for_user(&self, user_id: Uuid) -> Result<Vec<ClueRow>> {
        let rows = sqlx::query_as::<_, ClueRow>(
            r#"
            SELECT * FROM clue_records
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// A user's search-area generations, oldest first.
    pub async fn areas_for_user(&self, user_id: Uuid) -> Result<Vec<SearchAreaRow>> {
        let rows = sqlx::query_as::<_, SearchAreaRow>(
            r#"
            SELECT * FROM search_areas
            WHERE user_id = $1
            ORDER BY generation ASC, created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[async_trait]
impl BuzzStore for PgBuzzStore {
    /// Single-statement increment-and-return, so concurrent buzzes from
    /// the same user can never read a stale pre-increment count.
    async fn increment_daily_counter(&self, user_id: Uuid, day: NaiveDate) -> Result<u32> {
        let count: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO daily_buzz_counters (user_id, day, buzz_count)
            VALUES ($1, $2, 1)
            ON CONFLICT (user_id, day)
            DO UPDATE SET buzz_count = daily_buzz_counters.buzz_count + 1,
                          updated_at = now()
            RETURNING buzz_count
            "#,
        )
        .bind(user_id)
        .bind(day)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u32)
    }

    async fn active_target(&self) -> Result<Option<ActiveTarget>> {
        let row = sqlx::query_as::<_, ActiveTargetRow>(
            r#"
            SELECT id, name, brand, model, address, city, lat, lng, horsepower, color
            FROM active_targets
            WHERE is_active
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ActiveTarget::from))
    }

    async fn used_clue_keys(
        &self,
        user_id: Uuid,
        week: u32,
        category: ClueCategory,
    ) -> Result<HashSet<String>> {
        let keys: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT clue_key FROM used_clues
            WHERE user_id = $1 AND week = $2 AND category = $3
            "#,
        )
        .bind(user_id)
        .bind(week as i32)
        .bind(category.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(keys.into_iter().collect())
    }

    async fn insert_clue(&self, clue: &NewClue) -> Result<Uuid> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO clue_records
                (user_id, title_it, title_en, description_it, description_en,
                 category, week, cost_cents, is_misleading)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(clue.user_id)
        .bind(&clue.title_it)
        .bind(&clue.title_en)
        .bind(&clue.description_it)
        .bind(&clue.description_en)
        .bind(clue.category.as_str())
        .bind(clue.week as i32)
        .bind(clue.cost_cents)
        .bind(clue.is_misleading)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Idempotent: a concurrent buzz marking the same key is tolerated.
    async fn mark_clue_used(
        &self,
        user_id: Uuid,
        week: u32,
        category: ClueCategory,
        clue_key: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO used_clues (user_id, week, category, clue_key)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(week as i32)
        .bind(category.as_str())
        .bind(clue_key)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn search_areas(&self, user_id: Uuid) -> Result<Vec<SearchArea>> {
        let rows = self.areas_for_user(user_id).await?;
        Ok(rows.into_iter().map(SearchArea::from).collect())
    }

    async fn insert_search_area(&self, area: &NewSearchArea) -> Result<Uuid> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO search_areas (user_id, lat, lng, radius_km, generation, week, clue_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(area.user_id)
        .bind(area.center.lat)
        .bind(area.center.lng)
        .bind(area.radius_km)
        .bind(area.generation as i32)
        .bind(area.week as i32)
        .bind(area.clue_id)
        .fetch_one(&self.pool)
        .await?;

        // Keep the day's auxiliary map-generation tally in step. Losing
        // it is harmless, so a failed update only logs.
        let bumped = sqlx::query(
            r#"
            UPDATE daily_buzz_counters
            SET map_generations = map_generations + 1, updated_at = now()
            WHERE user_id = $1 AND day = CURRENT_DATE
            "#,
        )
        .bind(area.user_id)
        .execute(&self.pool)
        .await;
        if let Err(e) = bumped {
            warn!(user_id = %area.user_id, error = %e, "Failed to bump map_generations");
        }

        Ok(id)
    }

    async fn record_audit(&self, entry: &AuditEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_log (user_id, action, outcome, detail)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(entry.user_id)
        .bind(&entry.action)
        .bind(&entry.outcome)
        .bind(&entry.detail)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl Notifier for PgBuzzStore {
    async fn notify(&self, user_id: Uuid, title: &str, body: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (user_id, title, body)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(title)
        .bind(body)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
