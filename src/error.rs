use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::ApiResponse;

/// AuthApiError
///
/// Failures talking to the authentication backend.
#[derive(Error, Debug)]
pub enum AuthApiError {
    /// The backend answered and refused the request. Carries its user-facing message.
    #[error("{0}")]
    Rejected(String),

    #[error("No response from server. Please try again later.")]
    Unreachable(#[source] reqwest::Error),

    #[error("An error occurred while processing your request. Please try again.")]
    Malformed(String),
}

/// AppError
///
/// Errors surfaced by the JSON endpoints as an inline message in the response envelope.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Backend(#[from] AuthApiError),

    #[error("{0}")]
    Invalid(&'static str),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Backend(AuthApiError::Rejected(_)) => StatusCode::BAD_REQUEST,
            AppError::Backend(AuthApiError::Unreachable(_)) => StatusCode::BAD_GATEWAY,
            AppError::Backend(AuthApiError::Malformed(_)) => StatusCode::BAD_GATEWAY,
            AppError::Invalid(_) => StatusCode::BAD_REQUEST,
        };

        (status, Json(ApiResponse::<()>::error(self.to_string()))).into_response()
    }
}
