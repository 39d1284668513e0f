//! Route definitions

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Search
        .route("/search", post(handlers::search))
        // Knowledge base
        .route("/knowledge/search", post(handlers::knowledge_search))
        .route("/knowledge/semantic", post(handlers::semantic_search))
        .route("/knowledge/stats", get(handlers::knowledge_stats))
        .route("/documents", post(handlers::create_document))
        // Introspection
        .route("/providers", get(handlers::providers))
        .route("/stats", get(handlers::stats))
        .route("/health", get(handlers::health))
        // Middleware
        .layer(cors)
        .with_state(state)
}
