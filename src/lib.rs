use axum::{
    extract::{FromRef, Request},
    http::HeaderName,
    Router,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Session model and the gate that routes on it.
pub mod role;
pub mod session;
pub mod gate;

// Browser and backend integration.
pub mod auth;
pub mod auth_api;
pub mod cookies;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;

// Routing segregation (Public, Authenticated, Pages).
pub mod routes;
use routes::{authenticated, pages, public};
use auth::AuthSession;

// --- Public Re-exports ---

pub use auth_api::{AuthApiState, HttpAuthApi, LocalAuthApi};
pub use config::AppConfig;

/// ApiDoc
///
/// OpenAPI document for the JSON endpoints, served at `/api-docs/openapi.json`.
/// Browser paths are not documented here; they answer with a page or a redirect.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login, handlers::logout, handlers::get_session, handlers::change_password
    ),
    components(
        schemas(
            models::LoginForm, models::ChangePasswordForm, models::LoginOutcome,
            models::NextLocation, models::SessionView, role::Role, role::HeaderVariant,
            role::MenuItem, gate::Page, gate::Screen, gate::AdminSection, gate::AdminSections,
        )
    ),
    tags(
        (name = "redeemx-portal", description = "RedeemX session-gated portal")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared, immutable state handed to every request: the authentication backend and
/// the loaded configuration. The session itself is never stored here; it travels with
/// each request in its cookies.
#[derive(Clone)]
pub struct AppState {
    pub auth_api: AuthApiState,
    pub config: AppConfig,
}

impl FromRef<AppState> for AuthApiState {
    fn from_ref(app_state: &AppState) -> AuthApiState {
        app_state.auth_api.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Rejects requests to the authenticated routes unless `AuthSession` can be extracted,
/// i.e. the cookies hold a token with a recognised role. Rejection is a plain 401.
async fn auth_middleware(
    _session: AuthSession,
    request: Request,
    next: Next,
) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routers, the authentication layer and the observability stack.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware
                ))
        )
        // Everything else is a browser path handled by the session gate.
        .merge(pages::page_routes())
        .with_state(state);

    base_router
        .layer(
             ServiceBuilder::new()
                 .layer(SetRequestIdLayer::new(
                     x_request_id.clone(),
                     MakeRequestUuid,
                 ))
                 .layer(
                     TraceLayer::new_for_http()
                         .make_span_with(trace_span_logger)
                         .on_response(
                             DefaultOnResponse::new()
                                 .level(Level::INFO)
                                 .latency_unit(tower_http::LatencyUnit::Millis)
                         )
                 )
                 .layer(PropagateRequestIdLayer::new(x_request_id))
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for `TraceLayer` carrying the request id so every log line of a request
/// can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
