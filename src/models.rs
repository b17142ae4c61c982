use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::role::{HeaderVariant, MenuItem, Role};

// --- Response Envelope ---

/// ApiResponse
///
/// The `{data, message, error}` envelope shared with the points backend. Exactly one of
/// `data`/`message` or `error` is meaningful for a given response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub error: String,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data: Some(data),
            message: message.into(),
            error: String::new(),
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self {
            data: None,
            message: String::new(),
            error: error.into(),
        }
    }
}

// --- Request Payloads (Input Schemas) ---

/// LoginForm
///
/// What the login screen submits: a single identifier field that may hold either an
/// email address or an employee id.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginForm {
    #[schema(example = "jane@example.com")]
    pub identifier: String,
    pub password: String,
}

/// Credentials
///
/// The body sent to the backend's login endpoint. Only one of `email` / `emp_id` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emp_id: Option<String>,
    pub password: String,
}

impl Credentials {
    pub fn from_identifier(identifier: &str, password: &str) -> Self {
        let identifier = identifier.trim().to_string();
        let (email, emp_id) = if looks_like_email(&identifier) {
            (Some(identifier), None)
        } else {
            (None, Some(identifier))
        };
        Self {
            email,
            emp_id,
            password: password.to_string(),
        }
    }

    /// The identifier used for log lines.
    pub fn identifier(&self) -> &str {
        self.email
            .as_deref()
            .or(self.emp_id.as_deref())
            .unwrap_or_default()
    }
}

impl From<LoginForm> for Credentials {
    fn from(form: LoginForm) -> Self {
        Credentials::from_identifier(&form.identifier, &form.password)
    }
}

/// Same check the login screen applies to decide between email and employee id.
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern is valid"));

fn looks_like_email(input: &str) -> bool {
    EMAIL_PATTERN.is_match(input)
}

/// ChangePasswordForm
///
/// Input payload for PATCH /api/change-password.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ChangePasswordForm {
    pub old_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

impl ChangePasswordForm {
    /// Checks the new password against the policy and the confirmation field.
    /// Returns the message shown inline on the form.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !meets_password_policy(&self.new_password) {
            return Err("New password does not meet all the conditions.");
        }
        if self.new_password != self.confirm_new_password {
            return Err("New Password and Confirm New Password do not match.");
        }
        Ok(())
    }
}

/// At least 8 characters with an uppercase letter, a lowercase letter, a digit and
/// one of `@$!%*?&`.
pub fn meets_password_policy(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| "@$!%*?&".contains(c))
}

/// ChangePasswordRequest
///
/// The body the backend expects for a password change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

impl From<ChangePasswordForm> for ChangePasswordRequest {
    fn from(form: ChangePasswordForm) -> Self {
        Self {
            old_password: form.old_password,
            new_password: form.new_password,
        }
    }
}

// --- Backend Grants ---

/// LoginGrant
///
/// `data` of a successful backend login. `user_type` is kept as the raw tag so that
/// an unrecognised value can still be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginGrant {
    pub token: String,
    pub user_type: String,
}

// --- Output Schemas ---

/// LoginOutcome
///
/// Where the client should navigate after a login attempt that reached the backend.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginOutcome {
    pub role: Option<Role>,
    pub redirect_to: String,
}

/// NextLocation
///
/// Returned by logout and password change: the path the client moves to next.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NextLocation {
    pub redirect_to: String,
}

/// SessionView
///
/// The authenticated session as seen by a header shell.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SessionView {
    pub role: Role,
    pub default_path: String,
    pub header: HeaderVariant,
    pub menu: Vec<MenuItem>,
}

impl From<Role> for SessionView {
    fn from(role: Role) -> Self {
        let capability = role.capability();
        Self {
            role,
            default_path: capability.default_path.to_string(),
            header: capability.header,
            menu: capability.menu_items(),
        }
    }
}
