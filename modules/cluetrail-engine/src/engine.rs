//! The buzz orchestration loop.
//!
//! One call per buzz action, single pass:
//! increment counter → price → select clue → persist clue →
//! optional search-area refresh → notification → audit.
//!
//! Counter increment, pricing and clue persistence are the critical
//! path; the search area and the notification are best-effort and only
//! degrade the response when they fail.

use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::HashSet;
use tracing::warn;
use uuid::Uuid;

use cluetrail_common::{AuditEntry, ClueCategory, GeoPoint, NewClue, NewSearchArea};

use crate::area;
use crate::clues::{self, SelectedClue};
use crate::error::{EngineError, Result};
use crate::pricing;
use crate::traits::{BuzzStore, Notifier};

/// One buzz action as requested by the client.
#[derive(Debug, Clone)]
pub struct BuzzRequest {
    pub user_id: Uuid,
    pub generate_map: bool,
    pub coordinates: Option<GeoPoint>,
}

/// The search-area part of a successful buzz, when requested and persisted.
#[derive(Debug, Clone, Copy)]
pub struct AreaOutcome {
    pub center: GeoPoint,
    pub radius_km: f64,
    pub generation: u32,
}

/// Everything a successful buzz produced.
#[derive(Debug, Clone)]
pub struct BuzzOutcome {
    pub clue: SelectedClue,
    pub category: ClueCategory,
    pub cost_cents: i64,
    pub area: Option<AreaOutcome>,
}

pub struct BuzzEngine<S, N> {
    store: S,
    notifier: N,
    default_center: GeoPoint,
}

impl<S: BuzzStore, N: Notifier> BuzzEngine<S, N> {
    pub fn new(store: S, notifier: N, default_center: GeoPoint) -> Self {
        Self {
            store,
            notifier,
            default_center,
        }
    }

    /// Handle one buzz action. `week` is the current mission week and
    /// `now` the request time; both come from the caller so the engine
    /// stays deterministic under test.
    pub async fn handle_buzz(
        &self,
        req: &BuzzRequest,
        week: u32,
        now: DateTime<Utc>,
    ) -> Result<BuzzOutcome> {
        let day = now.date_naive();

        // The counter advances before clue persistence. A later
        // persistence failure leaves it advanced; the audit trail is
        // the reconciliation record for that drift.
        let count = match self.store.increment_daily_counter(req.user_id, day).await {
            Ok(c) => c,
            Err(e) => {
                self.audit(req.user_id, "counter_error", Some(e.to_string()))
                    .await;
                return Err(EngineError::Database(e));
            }
        };

        let cost_cents = pricing::price_cents(count);
        if cost_cents == 0 {
            self.audit(req.user_id, "daily_ceiling", Some(format!("count {count}")))
                .await;
            return Err(EngineError::DailyCeiling);
        }

        let target = match self.store.active_target().await {
            Ok(Some(t)) => t,
            Ok(None) => {
                self.audit(req.user_id, "no_active_target", None).await;
                return Err(EngineError::NoActiveTarget);
            }
            Err(e) => {
                self.audit(req.user_id, "target_error", Some(e.to_string()))
                    .await;
                return Err(EngineError::Database(e));
            }
        };

        let category = {
            let mut rng = rand::rng();
            if rng.random_bool(0.5) {
                ClueCategory::Location
            } else {
                ClueCategory::Prize
            }
        };

        // Repeat avoidance is best-effort: if history can't be read,
        // selection proceeds against an empty set.
        let used = match self
            .store
            .used_clue_keys(req.user_id, week, category)
            .await
        {
            Ok(u) => u,
            Err(e) => {
                warn!(user_id = %req.user_id, error = %e, "Failed to load used clues");
                HashSet::new()
            }
        };

        let clue = {
            let mut rng = rand::rng();
            clues::select_clue(week, category, &target, &used, &mut rng)
        };

        // PERSIST_CLUE is the core deliverable; failure aborts the action.
        let new_clue = NewClue {
            user_id: req.user_id,
            title_it: clue.title_it.clone(),
            title_en: clue.title_en.clone(),
            description_it: clue.description_it.clone(),
            description_en: clue.description_en.clone(),
            category,
            week,
            cost_cents,
            is_misleading: clue.is_misleading,
        };
        let clue_id = match self.store.insert_clue(&new_clue).await {
            Ok(id) => id,
            Err(e) => {
                self.audit(req.user_id, "clue_persist_error", Some(e.to_string()))
                    .await;
                return Err(EngineError::Database(e));
            }
        };

        // A lost marker only degrades variety on a later buzz.
        if let Err(e) = self
            .store
            .mark_clue_used(req.user_id, week, category, &clue.key)
            .await
        {
            warn!(user_id = %req.user_id, error = %e, "Failed to mark clue as used");
        }

        let area = if req.generate_map {
            self.refresh_search_area(req, week, clue_id).await
        } else {
            None
        };

        if let Err(e) = self
            .notifier
            .notify(req.user_id, &clue.title_it, &clue.description_it)
            .await
        {
            warn!(user_id = %req.user_id, error = %e, "Failed to emit clue notification");
        }

        self.audit(
            req.user_id,
            "success",
            Some(format!("count {count}, clue {}", clue.key)),
        )
        .await;

        Ok(BuzzOutcome {
            clue,
            category,
            cost_cents,
            area,
        })
    }

    /// Compute and persist the next search-area generation. Best-effort
    /// relative to the clue: any failure is logged and reported as an
    /// absent area, never as an action failure.
    async fn refresh_search_area(
        &self,
        req: &BuzzRequest,
        week: u32,
        clue_id: Uuid,
    ) -> Option<AreaOutcome> {
        let prior = match self.store.search_areas(req.user_id).await {
            Ok(p) => p,
            Err(e) => {
                warn!(user_id = %req.user_id, error = %e, "Failed to load search areas");
                return None;
            }
        };

        let existing = prior.first().map(|a| a.center);
        let center = area::resolve_center(existing, req.coordinates, self.default_center);
        let generation = prior.len() as u32 + 1;
        let radius_km = area::radius_for_generation(generation);

        let new_area = NewSearchArea {
            user_id: req.user_id,
            center,
            radius_km,
            generation,
            week,
            clue_id: Some(clue_id),
        };
        match self.store.insert_search_area(&new_area).await {
            Ok(_) => Some(AreaOutcome {
                center,
                radius_km,
                generation,
            }),
            Err(e) => {
                warn!(user_id = %req.user_id, error = %e, "Failed to persist search area");
                None
            }
        }
    }

    /// Append to the reconciliation trail. A failed audit write is
    /// logged and never affects the action's outcome.
    async fn audit(&self, user_id: Uuid, outcome: &str, detail: Option<String>) {
        let entry = AuditEntry {
            user_id,
            action: "buzz".to_string(),
            outcome: outcome.to_string(),
            detail,
        };
        if let Err(e) = self.store.record_audit(&entry).await {
            warn!(user_id = %user_id, error = %e, "Failed to record audit entry");
        }
    }
}
