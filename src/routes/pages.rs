use crate::{AppState, gate, handlers};
use axum::{Router, routing::get};

/// Pages Router Module
///
/// The browser-addressable path space. Every GET that no other router claims falls
/// through to the session gate, which either renders the page or redirects.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        // GET /logout
        // Menu entry target: clears the session and redirects to the login screen.
        .route(gate::LOGOUT_PATH, get(handlers::logout_redirect))
        .fallback(get(handlers::navigate))
}
