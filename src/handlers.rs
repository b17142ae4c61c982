use crate::{
    auth::{AuthSession, BrowserSession},
    auth_api::AuthApiState,
    cookies::CookieStorage,
    error::{AppError, AuthApiError},
    gate::{self, Navigation},
    models::{
        ApiResponse, ChangePasswordForm, Credentials, LoginForm, LoginOutcome, NextLocation,
        SessionView,
    },
    session::AccessState,
};
use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::Uri,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

/// PageQuery
///
/// Query parameters understood by the page fallback.
#[derive(Deserialize)]
pub struct PageQuery {
    /// Active sub-view of the admin home screen (dashboard, users, vendors, reports, change_password).
    pub section: Option<String>,
}

// --- Browser Paths ---

/// navigate
///
/// Fallback for every browser path. Resolves the request against the session found in
/// the cookies: a reachable path renders its page, anything else is redirected.
/// The session is only read here, never written.
pub async fn navigate(
    session: BrowserSession,
    uri: Uri,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Response {
    let section = query.ok().and_then(|Query(q)| q.section);
    let state = session.state();

    match gate::resolve_with_section(state, uri.path(), section.as_deref()) {
        Navigation::Render(page) => Json(page).into_response(),
        Navigation::Redirect(to) => {
            tracing::debug!(from = %uri.path(), to, ?state, "redirecting");
            Redirect::to(to).into_response()
        }
    }
}

/// logout_redirect
///
/// Browser-addressable logout: clears the session and lands on the login screen.
pub async fn logout_redirect(session: BrowserSession) -> (CookieStorage, Redirect) {
    let (cookies, next) = end_session(session);
    (cookies, Redirect::to(next))
}

// --- Session API ---

/// login
///
/// [Public Route] Exchanges credentials for a session. The identifier is sent to the
/// backend as an email when it looks like one, otherwise as an employee id.
///
/// On success the token and role tag are written to the session cookies together.
/// A role tag the portal does not recognise is still persisted, but the client is sent
/// back to the login screen with an inline error.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginForm,
    responses(
        (status = 200, description = "Logged in", body = LoginOutcome),
        (status = 400, description = "Missing fields or credentials rejected"),
        (status = 502, description = "Backend unreachable")
    )
)]
pub async fn login(
    State(auth_api): State<AuthApiState>,
    BrowserSession(mut session): BrowserSession,
    form: Result<Json<LoginForm>, JsonRejection>,
) -> Result<(CookieStorage, Json<ApiResponse<LoginOutcome>>), AppError> {
    let Json(form) = form.map_err(|e| {
        tracing::debug!(error = %e, "unreadable login form");
        AppError::Invalid("Please enter your email or employee id and password.")
    })?;
    let credentials = Credentials::from(form);
    tracing::debug!(user = %credentials.identifier(), "login attempt");

    let grant = auth_api.login(credentials).await.map_err(|e| {
        tracing::warn!(error = %e, "login failed");
        e
    })?;

    if grant.token.is_empty() {
        tracing::warn!("login grant carried no token");
        return Err(AuthApiError::Malformed("empty token in login grant".to_string()).into());
    }

    let state = session.establish(&grant.token, &grant.user_type);
    let body = match state {
        AccessState::Authenticated(role) => {
            tracing::info!(%role, "login success");
            ApiResponse::ok(
                LoginOutcome {
                    role: Some(role),
                    redirect_to: role.capability().default_path.to_string(),
                },
                "Login success",
            )
        }
        _ => {
            tracing::warn!(user_type = %grant.user_type, "login returned an unrecognised role");
            ApiResponse {
                data: Some(LoginOutcome {
                    role: None,
                    redirect_to: gate::LOGIN_PATH.to_string(),
                }),
                message: String::new(),
                error: "Unrecognized user role.".to_string(),
            }
        }
    };

    Ok((session.into_storage(), Json(body)))
}

/// logout
///
/// [Public Route] Clears both session cookies, whatever state the session was in.
#[utoipa::path(
    post,
    path = "/api/logout",
    responses((status = 200, description = "Logged out", body = NextLocation))
)]
pub async fn logout(session: BrowserSession) -> (CookieStorage, Json<ApiResponse<NextLocation>>) {
    let (cookies, next) = end_session(session);
    let body = ApiResponse::ok(
        NextLocation {
            redirect_to: next.to_string(),
        },
        "Logged out",
    );
    (cookies, Json(body))
}

fn end_session(BrowserSession(mut session): BrowserSession) -> (CookieStorage, &'static str) {
    if let Some(role) = session.state().role() {
        tracing::info!(%role, "logout");
    }
    session.clear();
    (session.into_storage(), gate::LOGIN_PATH)
}

/// get_session
///
/// [Authenticated Route] Role, landing path and header menu of the current session.
#[utoipa::path(
    get,
    path = "/api/session",
    responses(
        (status = 200, description = "Current session", body = SessionView),
        (status = 401, description = "No usable session")
    )
)]
pub async fn get_session(AuthSession { role, .. }: AuthSession) -> Json<ApiResponse<SessionView>> {
    Json(ApiResponse::ok(SessionView::from(role), ""))
}

/// change_password
///
/// [Authenticated Route] Validates the new password locally, then asks the backend to
/// change it using the session's bearer token. A completed change ends the session;
/// a failed one leaves it intact.
#[utoipa::path(
    patch,
    path = "/api/change-password",
    request_body = ChangePasswordForm,
    responses(
        (status = 200, description = "Password changed, session cleared", body = NextLocation),
        (status = 400, description = "Validation failed or rejected by the backend"),
        (status = 401, description = "No usable session")
    )
)]
pub async fn change_password(
    State(auth_api): State<AuthApiState>,
    AuthSession { role, mut session }: AuthSession,
    form: Result<Json<ChangePasswordForm>, JsonRejection>,
) -> Result<(CookieStorage, Json<ApiResponse<NextLocation>>), AppError> {
    let Json(form) = form.map_err(|e| {
        tracing::debug!(error = %e, "unreadable password change form");
        AppError::Invalid("Please fill in all the password fields.")
    })?;
    form.validate().map_err(AppError::Invalid)?;

    let token = session.token().unwrap_or_default().to_string();
    tracing::info!(%role, "password change attempt");

    let message = auth_api
        .change_password(&token, form.into())
        .await
        .map_err(|e| {
            tracing::warn!(%role, error = %e, "password change failed");
            e
        })?;

    tracing::info!(%role, "password changed, ending session");
    session.clear();

    let message = if message.is_empty() {
        "Password changed successfully!".to_string()
    } else {
        message
    };
    let body = ApiResponse::ok(
        NextLocation {
            redirect_to: gate::LOGIN_PATH.to_string(),
        },
        message,
    );
    Ok((session.into_storage(), Json(body)))
}
