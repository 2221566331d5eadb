use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use cluetrail_common::{mission_week, GeoPoint};
use cluetrail_engine::{BuzzRequest, EngineError};

use crate::rest::authorize;
use crate::AppState;

/// Max buzz presses per user inside the sliding window, independent of
/// the daily pricing ceiling. Guards against runaway clients.
pub const RATE_LIMIT_PER_MINUTE: usize = 10;
const RATE_WINDOW_SECS: u64 = 60;

/// Wire shape kept compatible with the original client: camelCase
/// request fields, snake_case response fields plus `errorMessage`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuzzBody {
    user_id: String,
    #[serde(default)]
    generate_map: bool,
    #[serde(default)]
    prize_id: Option<String>,
    #[serde(default)]
    coordinates: Option<Coordinates>,
}

#[derive(Deserialize, Clone, Copy)]
pub struct Coordinates {
    lat: f64,
    lng: f64,
}

/// Uniform response body. Business failures are `success:false` with a
/// 200 status; only authorization and rate limiting use non-200.
#[derive(Serialize, Default)]
pub struct BuzzResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clue_text: Option<String>,
    pub buzz_cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<bool>,
    #[serde(rename = "errorMessage", skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

fn failure(message: &str) -> Json<BuzzResponse> {
    Json(BuzzResponse {
        success: false,
        error: Some(true),
        error_message: Some(message.to_string()),
        ..Default::default()
    })
}

/// Check rate limit for a user. Returns true if the press is allowed.
/// Prunes expired entries and records the new press if allowed.
pub fn check_rate_limit(entries: &mut Vec<Instant>, now: Instant, max_per_window: usize) -> bool {
    let cutoff = now - std::time::Duration::from_secs(RATE_WINDOW_SECS);
    entries.retain(|t| *t > cutoff);
    if entries.len() >= max_per_window {
        return false;
    }
    entries.push(now);
    true
}

/// Prune users with no presses left in the window, so the limiter map
/// does not grow without bound.
pub fn prune_empty_entries(limiter: &mut std::collections::HashMap<uuid::Uuid, Vec<Instant>>) {
    let cutoff = Instant::now() - std::time::Duration::from_secs(RATE_WINDOW_SECS);
    limiter.retain(|_, entries| {
        entries.retain(|t| *t > cutoff);
        !entries.is_empty()
    });
}

pub async fn api_buzz(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<BuzzBody>,
) -> Response {
    let user_id = match authorize(&state, &headers, &body.user_id) {
        Ok(u) => u,
        Err(r) => return r,
    };

    if body.prize_id.is_some() {
        // Target selection is server-side; the client hint is ignored.
        warn!(user_id = %user_id, "prize_id supplied by client; ignoring");
    }

    {
        let mut limiter = state.rate_limiter.lock().await;
        if limiter.len() > 10_000 {
            prune_empty_entries(&mut limiter);
        }
        let entries = limiter.entry(user_id).or_default();
        if !check_rate_limit(entries, Instant::now(), RATE_LIMIT_PER_MINUTE) {
            return (
                StatusCode::TOO_MANY_REQUESTS,
                failure("Troppi buzz in poco tempo. Riprova tra qualche istante."),
            )
                .into_response();
        }
    }

    let now = chrono::Utc::now();
    let week = mission_week(state.config.mission_start, now);
    let req = BuzzRequest {
        user_id,
        generate_map: body.generate_map,
        coordinates: body.coordinates.map(|c| GeoPoint {
            lat: c.lat,
            lng: c.lng,
        }),
    };

    match state.engine.handle_buzz(&req, week, now).await {
        Ok(outcome) => {
            info!(
                user_id = %user_id,
                cost_cents = outcome.cost_cents,
                category = %outcome.category,
                map = outcome.area.is_some(),
                "Buzz handled"
            );
            Json(BuzzResponse {
                success: true,
                clue_text: Some(outcome.clue.description_it),
                buzz_cost: outcome.cost_cents as f64 / 100.0,
                radius_km: outcome.area.map(|a| a.radius_km),
                lat: outcome.area.map(|a| a.center.lat),
                lng: outcome.area.map(|a| a.center.lng),
                generation_number: outcome.area.map(|a| a.generation),
                error: None,
                error_message: None,
            })
            .into_response()
        }
        Err(EngineError::DailyCeiling) => {
            failure("Hai raggiunto il limite giornaliero di buzz.").into_response()
        }
        Err(EngineError::NoActiveTarget) => {
            failure("Nessuna missione attiva al momento.").into_response()
        }
        Err(EngineError::Database(e)) => {
            warn!(user_id = %user_id, error = %e, "Buzz action failed");
            failure("Si è verificato un errore. Nessun addebito effettuato.").into_response()
        }
    }
}
