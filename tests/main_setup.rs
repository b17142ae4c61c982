use redeemx_portal::{
    AppConfig,
    config::{AuthBackend, Env},
};
use serial_test::serial;
use std::{env, panic};

// --- Setup/Teardown Utilities ---

const CONFIG_VARS: [&str; 7] = [
    "APP_ENV",
    "API_BASE_URL",
    "AUTH_BACKEND",
    "BIND_ADDR",
    "SESSION_MAX_AGE_SECS",
    "SECURE_COOKIES",
    "JWT_SECRET",
];

/// Runs `test` with only the given variables set, restoring the environment afterward.
fn run_with_env<T, R>(vars: &[(&str, &str)], test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|&var| (var, env::var(var).ok()))
        .collect();

    unsafe {
        for var in CONFIG_VARS {
            env::remove_var(var);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }
    }

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals.into_iter().rev() {
        unsafe {
            if let Some(val) = original_value {
                env::set_var(key, val);
            } else {
                env::remove_var(key);
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_app_config_production_fail_fast() {
    let result = panic::catch_unwind(|| {
        run_with_env(&[("APP_ENV", "production")], AppConfig::load)
    });

    assert!(
        result.is_err(),
        "Production config loading should panic without API_BASE_URL"
    );
}

#[test]
#[serial]
fn test_app_config_production_is_hardened() {
    let config = run_with_env(
        &[
            ("APP_ENV", "production"),
            ("API_BASE_URL", "https://points.example.com"),
            ("AUTH_BACKEND", "local"),
        ],
        AppConfig::load,
    );

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.api_base_url, "https://points.example.com");
    // The local backend can never be selected in production.
    assert_eq!(config.auth_backend, AuthBackend::Remote);
    assert!(config.secure_cookies);
}

#[test]
#[serial]
fn test_app_config_local_env_defaults() {
    let config = run_with_env(&[("APP_ENV", "local")], AppConfig::load);

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.auth_backend, AuthBackend::Local);
    assert_eq!(config.bind_addr, "0.0.0.0:3000");
    assert_eq!(config.session_max_age_secs, 86400);
    assert!(!config.secure_cookies);
    assert_eq!(config.jwt_secret, AppConfig::default().jwt_secret);
}

#[test]
#[serial]
fn test_app_config_local_overrides() {
    let config = run_with_env(
        &[
            ("AUTH_BACKEND", "remote"),
            ("API_BASE_URL", "http://10.0.0.5:8000"),
            ("SESSION_MAX_AGE_SECS", "600"),
            ("SECURE_COOKIES", "true"),
        ],
        AppConfig::load,
    );

    assert_eq!(config.auth_backend, AuthBackend::Remote);
    assert_eq!(config.api_base_url, "http://10.0.0.5:8000");
    assert_eq!(config.session_max_age_secs, 600);
    assert!(config.secure_cookies);
}

#[test]
#[serial]
fn test_app_config_rejects_non_numeric_max_age() {
    let result = panic::catch_unwind(|| {
        run_with_env(&[("SESSION_MAX_AGE_SECS", "a day")], AppConfig::load)
    });

    assert!(result.is_err());
}
