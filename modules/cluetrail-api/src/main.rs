use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use axum::{
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tokio::sync::Mutex;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use cluetrail_common::Config;
use cluetrail_engine::BuzzEngine;
use cluetrail_store::PgBuzzStore;

mod jwt;
mod rest;

use jwt::JwtService;

pub struct AppState {
    pub engine: BuzzEngine<PgBuzzStore, PgBuzzStore>,
    pub store: PgBuzzStore,
    pub jwt: JwtService,
    pub config: Config,
    pub rate_limiter: Mutex<HashMap<Uuid, Vec<Instant>>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("cluetrail=info".parse()?))
        .init();

    let config = Config::from_env();

    let pool = PgPool::connect(&config.database_url).await?;
    let store = PgBuzzStore::new(pool);
    store.migrate().await?;

    let engine = BuzzEngine::new(store.clone(), store.clone(), config.default_center);
    let jwt = JwtService::new(&config.jwt_secret, config.jwt_issuer.clone());

    let host = config.web_host.clone();
    let port = config.web_port;

    let state = Arc::new(AppState {
        engine,
        store,
        jwt,
        config,
        rate_limiter: Mutex::new(HashMap::new()),
    });

    let app = Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        // REST API
        .route("/api/buzz", post(rest::buzz::api_buzz))
        .route("/api/buzz/price", get(rest::api_buzz_price))
        .route("/api/clues", get(rest::api_clues))
        .route("/api/areas", get(rest::api_areas))
        .with_state(state)
        // CORS
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Every response is personal: no caching
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        // Logging layer: method + path + status + latency only
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        );

    let addr = format!("{host}:{port}");
    info!("Cluetrail API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
