use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::AuthApiError,
    models::{ApiResponse, ChangePasswordRequest, Credentials, LoginGrant},
    role::Role,
};

const LOGIN_REJECTED: &str = "Invalid Username or Password";
const CHANGE_PASSWORD_REJECTED: &str = "Something went wrong.";

/// AuthApi
///
/// The two backend calls that touch the session: exchanging credentials for a token,
/// and changing the password of the account behind a token. Everything else the
/// screens display comes from endpoints this service never calls.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: Credentials) -> Result<LoginGrant, AuthApiError>;

    /// Returns the backend's confirmation message.
    async fn change_password(
        &self,
        token: &str,
        request: ChangePasswordRequest,
    ) -> Result<String, AuthApiError>;
}

/// AuthApiState
///
/// Shared handle to the configured backend.
pub type AuthApiState = Arc<dyn AuthApi>;

// --- Remote Backend ---

/// HttpAuthApi
///
/// Talks to the points backend over HTTP. No timeout or retry is layered on top of the
/// client defaults: a failed call is reported once and the caller decides what to show.
#[derive(Clone)]
pub struct HttpAuthApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuthApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Maps a backend response onto the envelope, turning error statuses into `Rejected`.
async fn read_envelope<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
    rejected_default: &str,
) -> Result<ApiResponse<T>, AuthApiError> {
    let status = response.status();
    let body = response.text().await.map_err(AuthApiError::Unreachable)?;

    if !status.is_success() {
        let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(&body)
            .ok()
            .map(|envelope| envelope.error)
            .filter(|error| !error.is_empty())
            .unwrap_or_else(|| rejected_default.to_string());
        return Err(AuthApiError::Rejected(message));
    }

    serde_json::from_str(&body).map_err(|e| AuthApiError::Malformed(e.to_string()))
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, credentials: Credentials) -> Result<LoginGrant, AuthApiError> {
        let response = self
            .client
            .post(self.url("/api/v1/auth/login"))
            .json(&credentials)
            .send()
            .await
            .map_err(AuthApiError::Unreachable)?;

        let envelope: ApiResponse<LoginGrant> = read_envelope(response, LOGIN_REJECTED).await?;
        envelope
            .data
            .ok_or_else(|| AuthApiError::Malformed("login response without data".to_string()))
    }

    async fn change_password(
        &self,
        token: &str,
        request: ChangePasswordRequest,
    ) -> Result<String, AuthApiError> {
        let response = self
            .client
            .patch(self.url("/api/v1/user/change-password"))
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
            .map_err(AuthApiError::Unreachable)?;

        // 401 carries no envelope when the bearer token is rejected outright.
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(AuthApiError::Rejected("You are not authorized".to_string()));
        }

        let envelope: ApiResponse<serde_json::Value> =
            read_envelope(response, CHANGE_PASSWORD_REJECTED).await?;
        Ok(envelope.message)
    }
}

// --- Local Development Backend ---

/// LocalClaims
///
/// Token payload issued by `LocalAuthApi`, shaped like the backend's access tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct LocalClaims {
    pub email: String,
    pub user_id: Uuid,
    pub is_admin: bool,
    pub is_user: bool,
    pub is_vendor: bool,
    pub exp: usize,
    pub iat: usize,
}

/// LocalAccount
///
/// An account known to the development backend.
#[derive(Debug, Clone)]
pub struct LocalAccount {
    pub id: Uuid,
    pub email: String,
    pub emp_id: String,
    pub password: String,
    pub role: Role,
}

impl LocalAccount {
    pub fn new(email: &str, emp_id: &str, password: &str, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.to_string(),
            emp_id: emp_id.to_string(),
            password: password.to_string(),
            role,
        }
    }
}

/// LocalAuthApi
///
/// In-process stand-in for the backend, selected with `AUTH_BACKEND=local` so the portal
/// can run without the points service. Tokens are HS256 JWTs valid for 24 hours.
/// Passwords are held in memory as given: development and tests only.
#[derive(Clone)]
pub struct LocalAuthApi {
    accounts: Arc<RwLock<Vec<LocalAccount>>>,
    secret: String,
}

impl LocalAuthApi {
    pub fn new(secret: &str, accounts: Vec<LocalAccount>) -> Self {
        Self {
            accounts: Arc::new(RwLock::new(accounts)),
            secret: secret.to_string(),
        }
    }

    /// One account per role, for local runs.
    pub fn seeded(secret: &str) -> Self {
        Self::new(
            secret,
            vec![
                LocalAccount::new("admin@redeemx.local", "ADM001", "Admin@1234", Role::Admin),
                LocalAccount::new("vendor@redeemx.local", "VEN001", "Vendor@1234", Role::Vendor),
                LocalAccount::new("user@redeemx.local", "EMP001", "User@1234", Role::User),
            ],
        )
    }

    fn issue_token(&self, account: &LocalAccount) -> Result<String, AuthApiError> {
        let now = Utc::now();
        let claims = LocalClaims {
            email: account.email.clone(),
            user_id: account.id,
            is_admin: account.role == Role::Admin,
            is_user: account.role == Role::User,
            is_vendor: account.role == Role::Vendor,
            iat: now.timestamp() as usize,
            exp: (now + Duration::hours(24)).timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthApiError::Malformed(e.to_string()))
    }

    fn verify_token(&self, token: &str) -> Result<LocalClaims, AuthApiError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        decode::<LocalClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|_| AuthApiError::Rejected("You are not authorized".to_string()))
    }
}

#[async_trait]
impl AuthApi for LocalAuthApi {
    async fn login(&self, credentials: Credentials) -> Result<LoginGrant, AuthApiError> {
        let accounts = self.accounts.read().await;
        let account = accounts
            .iter()
            .find(|a| {
                credentials.email.as_deref() == Some(a.email.as_str())
                    || credentials.emp_id.as_deref() == Some(a.emp_id.as_str())
            })
            .ok_or_else(|| AuthApiError::Rejected("Invalid Email/Employee Id".to_string()))?;

        if account.password != credentials.password {
            return Err(AuthApiError::Rejected("Invalid Password".to_string()));
        }

        Ok(LoginGrant {
            token: self.issue_token(account)?,
            user_type: account.role.as_tag().to_string(),
        })
    }

    async fn change_password(
        &self,
        token: &str,
        request: ChangePasswordRequest,
    ) -> Result<String, AuthApiError> {
        let claims = self.verify_token(token)?;

        let mut accounts = self.accounts.write().await;
        let account = accounts
            .iter_mut()
            .find(|a| a.id == claims.user_id)
            .ok_or_else(|| AuthApiError::Rejected("User not found".to_string()))?;

        if account.password != request.old_password {
            return Err(AuthApiError::Rejected(
                "Incorrect current password".to_string(),
            ));
        }

        account.password = request.new_password;
        Ok("Password updated successfully".to_string())
    }
}
