pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::matching::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/vocabulary", get(handlers::handle_vocabulary))
        .route("/api/v1/normalize", post(handlers::handle_normalize))
        .route("/api/v1/skills/extract", post(handlers::handle_extract))
        .route("/api/v1/score", post(handlers::handle_score))
        .route("/api/v1/shortlist", post(handlers::handle_shortlist))
        .route(
            "/api/v1/shortlist/upload",
            post(handlers::handle_shortlist_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .with_state(state)
}
