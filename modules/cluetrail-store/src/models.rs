// Row structs for the tables the API reads back. Conversions into the
// shared domain types live here so the engine stays sqlx-free.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use cluetrail_common::{ActiveTarget, GeoPoint, SearchArea};

/// A row from the clue_records table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ClueRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title_it: String,
    pub title_en: String,
    pub description_it: String,
    pub description_en: String,
    pub category: String,
    pub week: i32,
    pub cost_cents: i64,
    pub is_misleading: bool,
    pub created_at: DateTime<Utc>,
}

/// A row from the search_areas table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SearchAreaRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub lat: f64,
    pub lng: f64,
    pub radius_km: f64,
    pub generation: i32,
    pub week: i32,
    pub clue_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<SearchAreaRow> for SearchArea {
    fn from(row: SearchAreaRow) -> Self {
        SearchArea {
            id: row.id,
            user_id: row.user_id,
            center: GeoPoint {
                lat: row.lat,
                lng: row.lng,
            },
            radius_km: row.radius_km,
            generation: row.generation as u32,
            week: row.week as u32,
            clue_id: row.clue_id,
            created_at: row.created_at,
        }
    }
}

/// A row from the active_targets table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActiveTargetRow {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    pub model: String,
    pub address: String,
    pub city: String,
    pub lat: f64,
    pub lng: f64,
    pub horsepower: Option<i32>,
    pub color: Option<String>,
}

impl From<ActiveTargetRow> for ActiveTarget {
    fn from(row: ActiveTargetRow) -> Self {
        ActiveTarget {
            id: row.id,
            name: row.name,
            brand: row.brand,
            model: row.model,
            address: row.address,
            city: row.city,
            lat: row.lat,
            lng: row.lng,
            horsepower: row.horsepower,
            color: row.color,
        }
    }
}
