use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
};

use crate::{
    config::AppConfig,
    cookies::CookieStorage,
    role::Role,
    session::{AccessState, SessionProvider},
};

/// BrowserSession
///
/// The session carried by the current request, whatever its state. Extraction never
/// fails: a request without cookies simply yields an unauthenticated session.
///
/// Handlers mutate the session through the wrapped provider and return
/// `into_cookies()` in their response so the browser persists the change.
pub struct BrowserSession(pub SessionProvider<CookieStorage>);

impl BrowserSession {
    pub fn state(&self) -> AccessState {
        self.0.state()
    }

    pub fn into_cookies(self) -> CookieStorage {
        self.0.into_storage()
    }
}

impl<S> FromRequestParts<S> for BrowserSession
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let cookies = CookieStorage::from_request_parts(parts, state).await?;
        Ok(BrowserSession(SessionProvider::new(cookies)))
    }
}

/// AuthSession
///
/// A session holding a token AND a recognised role. Used by the JSON endpoints that
/// require a signed-in user.
///
/// Rejection: `401 Unauthorized` when the token is missing or the role tag is unknown.
/// The cookies are left untouched in both cases.
pub struct AuthSession {
    pub role: Role,
    pub session: SessionProvider<CookieStorage>,
}

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let BrowserSession(session) = match BrowserSession::from_request_parts(parts, state).await {
            Ok(session) => session,
            Err(never) => match never {},
        };

        match session.state() {
            AccessState::Authenticated(role) => Ok(AuthSession { role, session }),
            AccessState::UnknownRole => {
                tracing::warn!("session token present with unrecognised role tag");
                Err(StatusCode::UNAUTHORIZED)
            }
            AccessState::Unauthenticated => Err(StatusCode::UNAUTHORIZED),
        }
    }
}
