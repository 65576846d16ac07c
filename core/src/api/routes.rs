//! API Routes
//!
//! Router configuration for the HTTP API.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use super::handlers::{self, ApiState};

/// Create the API router with all routes
pub fn create_router(state: ApiState) -> Router {
    let mut router = Router::new()
        // Health & Status
        .route("/health", get(handlers::health))
        .route("/status", get(handlers::status))
        // Account reads
        .route("/balance", post(handlers::get_balance))
        // Transitions
        .route("/burn", post(handlers::burn))
        .route("/mint", post(handlers::mint));

    // Owner endpoints are only routed when the admin API is enabled
    if state.admin_api {
        router = router.route("/bootstrap", post(handlers::bootstrap));
    }

    router
        // CORS
        .layer(CorsLayer::permissive())
        .with_state(state)
}
