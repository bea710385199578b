use axum::extract::DefaultBodyLimit;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer, Config};
use crate::handlers::{create_event, health_check, list_events};
use crate::state::AppState;

pub fn create_routes(state: AppState, config: &Config) -> Router {
    let body_limit = match config.max_body_bytes {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };

    let router = Router::new()
        .route("/health", get(health_check))
        .route("/api/events", get(list_events).post(create_event))
        .layer(body_limit)
        .with_state(state);

    create_security_headers_layer(router, config.production)
        .layer(create_cors_layer(&config.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
}
