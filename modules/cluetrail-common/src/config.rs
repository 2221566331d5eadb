use std::env;

use chrono::{DateTime, NaiveDate, Utc};

use crate::types::{GeoPoint, DEFAULT_CENTER};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Postgres
    pub database_url: String,

    // Web server
    pub web_host: String,
    pub web_port: u16,

    // Auth
    pub jwt_secret: String,
    pub jwt_issuer: String,

    // Game
    pub mission_start: DateTime<Utc>,
    pub default_center: GeoPoint,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            database_url: required_env("DATABASE_URL"),
            web_host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_port: env::var("WEB_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("WEB_PORT must be a number"),
            jwt_secret: required_env("JWT_SECRET"),
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "cluetrail".to_string()),
            mission_start: parse_mission_start(
                &env::var("MISSION_START").unwrap_or_else(|_| "2025-06-01".to_string()),
            ),
            default_center: GeoPoint {
                lat: parse_coord("DEFAULT_CENTER_LAT", DEFAULT_CENTER.lat),
                lng: parse_coord("DEFAULT_CENTER_LNG", DEFAULT_CENTER.lng),
            },
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

/// MISSION_START is a date (YYYY-MM-DD); the mission starts at midnight UTC.
fn parse_mission_start(s: &str) -> DateTime<Utc> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .unwrap_or_else(|_| panic!("MISSION_START must be YYYY-MM-DD, got '{s}'"));
    date.and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
        .and_utc()
}

fn parse_coord(key: &str, default: f64) -> f64 {
    match env::var(key) {
        Ok(v) => v
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be a number, got '{v}'")),
        Err(_) => default,
    }
}
