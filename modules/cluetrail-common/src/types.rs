use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Geo Types ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Fallback search center when a user has no prior area and supplied
/// no coordinates (Rome).
pub const DEFAULT_CENTER: GeoPoint = GeoPoint {
    lat: 41.9028,
    lng: 12.4964,
};

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClueCategory {
    Location,
    Prize,
}

impl ClueCategory {
    /// The string stored in the `category` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClueCategory::Location => "location",
            ClueCategory::Prize => "prize",
        }
    }

    pub fn parse(s: &str) -> Option<ClueCategory> {
        match s {
            "location" => Some(ClueCategory::Location),
            "prize" => Some(ClueCategory::Prize),
            _ => None,
        }
    }
}

impl std::fmt::Display for ClueCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// --- Mission week ---

/// Integer week number since the game start date, starting at 1.
/// Actions before the start date count as week 1.
pub fn mission_week(start: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let days = (now - start).num_days();
    if days < 0 {
        return 1;
    }
    (days / 7 + 1) as u32
}

// --- Store entities ---

/// The single live prize/location record clues are derived from.
/// Owned by the external admin registry; read-only here.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveTarget {
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

/// A clue about to be persisted. Immutable once written.
#[derive(Debug, Clone)]
pub struct NewClue {
    pub user_id: Uuid,
    pub title_it: String,
    pub title_en: String,
    pub description_it: String,
    pub description_en: String,
    pub category: ClueCategory,
    pub week: u32,
    pub cost_cents: i64,
    pub is_misleading: bool,
}

/// A persisted search-area generation for a user.
#[derive(Debug, Clone)]
pub struct SearchArea {
    pub id: Uuid,
    pub user_id: Uuid,
    pub center: GeoPoint,
    pub radius_km: f64,
    pub generation: u32,
    pub week: u32,
    pub clue_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A search area about to be persisted.
#[derive(Debug, Clone)]
pub struct NewSearchArea {
    pub user_id: Uuid,
    pub center: GeoPoint,
    pub radius_km: f64,
    pub generation: u32,
    pub week: u32,
    pub clue_id: Option<Uuid>,
}

/// One line of the reconciliation trail. Every buzz action, successful
/// or not, appends exactly one entry.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub user_id: Uuid,
    pub action: String,
    pub outcome: String,
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn week_one_on_start_day() {
        assert_eq!(mission_week(utc(2025, 6, 1), utc(2025, 6, 1)), 1);
    }

    #[test]
    fn week_one_through_day_six() {
        assert_eq!(mission_week(utc(2025, 6, 1), utc(2025, 6, 7)), 1);
    }

    #[test]
    fn week_two_on_day_seven() {
        assert_eq!(mission_week(utc(2025, 6, 1), utc(2025, 6, 8)), 2);
    }

    #[test]
    fn week_four_after_three_weeks() {
        assert_eq!(mission_week(utc(2025, 6, 1), utc(2025, 6, 23)), 4);
    }

    #[test]
    fn clock_before_start_clamps_to_week_one() {
        assert_eq!(mission_week(utc(2025, 6, 1), utc(2025, 5, 20)), 1);
    }

    #[test]
    fn category_roundtrip() {
        assert_eq!(ClueCategory::parse("location"), Some(ClueCategory::Location));
        assert_eq!(ClueCategory::parse("prize"), Some(ClueCategory::Prize));
        assert_eq!(ClueCategory::parse("other"), None);
        assert_eq!(ClueCategory::Prize.as_str(), "prize");
    }
}
