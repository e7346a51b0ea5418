use super::auth_gate;
use super::handlers;
use super::state::{AppState, StatisticsState};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}

/// Router for the relay service.
pub fn create_router(state: AppState) -> Router {
    let protected = auth_gate::protect(
        Router::new().route("/api/rotate", post(handlers::rotate)),
        state.auth.tokens.clone(),
    );

    Router::new()
        .route("/health", get(handlers::health))
        .route("/login", post(handlers::login))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors())
        .with_state(state)
}

/// Router for the downstream statistics service.
pub fn create_statistics_router(state: StatisticsState) -> Router {
    let protected = auth_gate::protect(
        Router::new().route("/api/statistics", post(handlers::calculate_statistics)),
        state.auth.tokens.clone(),
    );

    Router::new()
        .route("/health", get(handlers::health))
        .route("/login", post(handlers::login))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors())
        .with_state(state)
}
