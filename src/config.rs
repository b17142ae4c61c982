use std::env;

/// AppConfig
///
/// Immutable configuration loaded once at startup and shared through the application
/// state. Handlers and extractors pull it out with `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format, cookie hardening and backend choice.
    pub env: Env,
    // Base URL of the points backend (login and change-password endpoints live under it).
    pub api_base_url: String,
    // Which authentication backend the portal talks to.
    pub auth_backend: AuthBackend,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Lifetime of the session cookies. Matches the backend's 24h token lifetime by default.
    pub session_max_age_secs: u64,
    // Adds the `Secure` attribute to session cookies.
    pub secure_cookies: bool,
    // Signing secret for tokens issued by the local development backend.
    pub jwt_secret: String,
}

/// Env
///
/// Runtime context: local development or production.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// AuthBackend
///
/// `Remote` calls the points backend over HTTP; `Local` serves logins from an in-process
/// account list so the portal can be exercised without it.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum AuthBackend {
    Remote,
    Local,
}

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_SESSION_MAX_AGE_SECS: u64 = 24 * 60 * 60;
const LOCAL_JWT_SECRET: &str = "redeemx-local-development-secret";

impl Default for AppConfig {
    /// Non-panicking configuration for tests: local environment, local backend.
    fn default() -> Self {
        Self {
            env: Env::Local,
            api_base_url: "http://localhost:8000".to_string(),
            auth_backend: AuthBackend::Local,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            session_max_age_secs: DEFAULT_SESSION_MAX_AGE_SECS,
            secure_cookies: false,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics in production when `API_BASE_URL` is missing, and in any environment when
    /// `SESSION_MAX_AGE_SECS` is set but not a number.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let session_max_age_secs = env::var("SESSION_MAX_AGE_SECS")
            .map(|raw| {
                raw.parse()
                    .expect("FATAL: SESSION_MAX_AGE_SECS must be a number of seconds")
            })
            .unwrap_or(DEFAULT_SESSION_MAX_AGE_SECS);

        match env {
            Env::Local => {
                let auth_backend = match env::var("AUTH_BACKEND").as_deref() {
                    Ok("remote") => AuthBackend::Remote,
                    _ => AuthBackend::Local,
                };
                Self {
                    env: Env::Local,
                    api_base_url: env::var("API_BASE_URL")
                        .unwrap_or_else(|_| "http://localhost:8000".to_string()),
                    auth_backend,
                    bind_addr,
                    session_max_age_secs,
                    secure_cookies: env::var("SECURE_COOKIES").is_ok_and(|v| v == "true"),
                    jwt_secret: env::var("JWT_SECRET")
                        .unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
                }
            }
            // Production always talks to the real backend over hardened cookies.
            Env::Production => Self {
                env: Env::Production,
                api_base_url: env::var("API_BASE_URL")
                    .expect("FATAL: API_BASE_URL required in prod"),
                auth_backend: AuthBackend::Remote,
                bind_addr,
                session_max_age_secs,
                secure_cookies: true,
                jwt_secret: String::new(),
            },
        }
    }
}
