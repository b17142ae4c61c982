use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session. Logout lives here too: it must work for a
/// session whose role tag is unrecognised, which the authenticated layer rejects.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /api/login
        // Exchanges an email or employee id plus password for session cookies.
        .route("/api/login", post(handlers::login))
        // POST /api/logout
        // Clears both session cookies.
        .route("/api/logout", post(handlers::logout))
}
