//! Integration tests for the Postgres store.
//! Requires a Postgres instance. Set DATABASE_TEST_URL or these tests are skipped.
//!
//! Tests use fresh random user ids so they can run in parallel against
//! a shared database.

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use cluetrail_common::{AuditEntry, ClueCategory, GeoPoint, NewClue, NewSearchArea};
use cluetrail_engine::{BuzzStore, Notifier};
use cluetrail_store::PgBuzzStore;

async fn test_store() -> Option<PgBuzzStore> {
    let url = std::env::var("DATABASE_TEST_URL").ok()?;
    let pool = PgPool::connect(&url).await.ok()?;
    let store = PgBuzzStore::new(pool);
    store.migrate().await.ok()?;
    Some(store)
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 3).unwrap()
}

fn new_clue(user_id: Uuid) -> NewClue {
    NewClue {
        user_id,
        title_it: "La livrea".to_string(),
        title_en: "The livery".to_string(),
        description_it: "La sua livrea è grigia.".to_string(),
        description_en: "Its livery is grey.".to_string(),
        category: ClueCategory::Prize,
        week: 4,
        cost_cents: 199,
        is_misleading: false,
    }
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn increment_returns_sequential_counts() {
    let Some(store) = test_store().await else {
        return;
    };
    let user = Uuid::new_v4();

    assert_eq!(store.increment_daily_counter(user, day()).await.unwrap(), 1);
    assert_eq!(store.increment_daily_counter(user, day()).await.unwrap(), 2);
    assert_eq!(store.increment_daily_counter(user, day()).await.unwrap(), 3);
}

#[tokio::test]
async fn counters_are_per_day() {
    let Some(store) = test_store().await else {
        return;
    };
    let user = Uuid::new_v4();
    let next_day = day().succ_opt().unwrap();

    store.increment_daily_counter(user, day()).await.unwrap();
    store.increment_daily_counter(user, day()).await.unwrap();
    assert_eq!(
        store.increment_daily_counter(user, next_day).await.unwrap(),
        1
    );
    assert_eq!(store.current_daily_count(user, day()).await.unwrap(), 2);
}

#[tokio::test]
async fn current_count_is_zero_for_unknown_user() {
    let Some(store) = test_store().await else {
        return;
    };
    assert_eq!(
        store
            .current_daily_count(Uuid::new_v4(), day())
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn used_clue_markers_round_trip() {
    let Some(store) = test_store().await else {
        return;
    };
    let user = Uuid::new_v4();

    store
        .mark_clue_used(user, 2, ClueCategory::Location, "loc-vague-north")
        .await
        .unwrap();
    // Marking twice must be a no-op, not an error.
    store
        .mark_clue_used(user, 2, ClueCategory::Location, "loc-vague-north")
        .await
        .unwrap();
    store
        .mark_clue_used(user, 2, ClueCategory::Location, "loc-vague-water")
        .await
        .unwrap();

    let used = store
        .used_clue_keys(user, 2, ClueCategory::Location)
        .await
        .unwrap();
    assert_eq!(used.len(), 2);
    assert!(used.contains("loc-vague-north"));

    // Different week and category are separate histories.
    assert!(store
        .used_clue_keys(user, 3, ClueCategory::Location)
        .await
        .unwrap()
        .is_empty());
    assert!(store
        .used_clue_keys(user, 2, ClueCategory::Prize)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn clue_insert_and_read_back() {
    let Some(store) = test_store().await else {
        return;
    };
    let user = Uuid::new_v4();

    let id = store.insert_clue(&new_clue(user)).await.unwrap();

    let clues = store.clues_for_user(user).await.unwrap();
    assert_eq!(clues.len(), 1);
    assert_eq!(clues[0].id, id);
    assert_eq!(clues[0].category, "prize");
    assert_eq!(clues[0].week, 4);
    assert_eq!(clues[0].cost_cents, 199);
}

#[tokio::test]
async fn search_areas_read_back_in_generation_order() {
    let Some(store) = test_store().await else {
        return;
    };
    let user = Uuid::new_v4();
    let center = GeoPoint {
        lat: 43.3188,
        lng: 11.3308,
    };

    for generation in [2u32, 1, 3] {
        store
            .insert_search_area(&NewSearchArea {
                user_id: user,
                center,
                radius_km: 500.0 * 0.95f64.powi(generation as i32 - 1),
                generation,
                week: 1,
                clue_id: None,
            })
            .await
            .unwrap();
    }

    let areas = store.search_areas(user).await.unwrap();
    let generations: Vec<u32> = areas.iter().map(|a| a.generation).collect();
    assert_eq!(generations, vec![1, 2, 3]);
    assert!(areas.iter().all(|a| a.center == center));
}

#[tokio::test]
async fn notification_insert_succeeds() {
    let Some(store) = test_store().await else {
        return;
    };
    let user = Uuid::new_v4();

    store
        .notify(user, "Nuovo indizio", "Un corso d'acqua scorre non lontano.")
        .await
        .unwrap();

    let count: i64 =
        sqlx::query_scalar("SELECT count(*) FROM notifications WHERE user_id = $1")
            .bind(user)
            .fetch_one(store.pool())
            .await
            .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn audit_entries_append() {
    let Some(store) = test_store().await else {
        return;
    };
    let user = Uuid::new_v4();

    store
        .record_audit(&AuditEntry {
            user_id: user,
            action: "buzz".to_string(),
            outcome: "success".to_string(),
            detail: Some("count 1".to_string()),
        })
        .await
        .unwrap();

    let count: i64 = sqlx::query_scalar("SELECT count(*) FROM audit_log WHERE user_id = $1")
        .bind(user)
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);
}
