use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch},
};

/// Authenticated Router Module
///
/// Endpoints for any signed-in role. The router is wrapped in the authentication layer,
/// so handlers always receive an `AuthSession` with a recognised role.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /api/session
        // Role, default landing path and header menu for the current session.
        .route("/api/session", get(handlers::get_session))
        // PATCH /api/change-password
        // Shared by every role. A successful change ends the session.
        .route("/api/change-password", patch(handlers::change_password))
}
