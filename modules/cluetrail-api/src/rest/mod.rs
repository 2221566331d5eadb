pub mod buzz;

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::jwt::bearer_token;
use crate::AppState;

// --- Query structs ---

#[derive(Deserialize)]
pub struct UserQuery {
    user_id: String,
}

// --- Auth helper ---

/// Verify the bearer credential and that its subject matches the
/// requested user id exactly. Authorization failures are the only
/// non-200 outcomes in this API apart from the rate limiter.
pub fn authorize(state: &AppState, headers: &HeaderMap, user_id: &str) -> Result<Uuid, Response> {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token);

    let Some(token) = token else {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"error": "Missing bearer token"})),
        )
            .into_response());
    };

    let claims = match state.jwt.verify_token(token) {
        Ok(c) => c,
        Err(_) => {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({"error": "Invalid token"})),
            )
                .into_response());
        }
    };

    if claims.sub != user_id {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"error": "Token subject does not match user"})),
        )
            .into_response());
    }

    Uuid::parse_str(user_id).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Invalid user id"})),
        )
            .into_response()
    })
}

// --- Handlers ---

/// Preview of the next buzz price without consuming an action.
pub async fn api_buzz_price(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<UserQuery>,
) -> Response {
    let user_id = match authorize(&state, &headers, &params.user_id) {
        Ok(u) => u,
        Err(r) => return r,
    };

    let day = chrono::Utc::now().date_naive();
    match state.store.current_daily_count(user_id, day).await {
        Ok(count) => {
            let cents = cluetrail_engine::price_cents(count + 1);
            Json(serde_json::json!({
                "daily_count": count,
                "next_cost": cents as f64 / 100.0,
                "blocked": cents == 0,
            }))
            .into_response()
        }
        Err(e) => {
            warn!(user_id = %user_id, error = %e, "Failed to load daily count");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// The caller's issued clues, newest first.
pub async fn api_clues(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<UserQuery>,
) -> Response {
    let user_id = match authorize(&state, &headers, &params.user_id) {
        Ok(u) => u,
        Err(r) => return r,
    };

    match state.store.clues_for_user(user_id).await {
        Ok(clues) => Json(clues).into_response(),
        Err(e) => {
            warn!(user_id = %user_id, error = %e, "Failed to load clues");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// The caller's search-area generations, oldest first, for map rendering.
pub async fn api_areas(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<UserQuery>,
) -> Response {
    let user_id = match authorize(&state, &headers, &params.user_id) {
        Ok(u) => u,
        Err(r) => return r,
    };

    match state.store.areas_for_user(user_id).await {
        Ok(areas) => Json(areas).into_response(),
        Err(e) => {
            warn!(user_id = %user_id, error = %e, "Failed to load search areas");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
