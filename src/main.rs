use redeemx_portal::{
    AppState,
    auth_api::{AuthApiState, HttpAuthApi, LocalAuthApi},
    config::{AppConfig, AuthBackend, Env},
    create_router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, initialises logging, picks the authentication backend and
/// serves the portal.
#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "redeemx_portal=debug,tower_http=info".into());

    // Pretty output for humans locally, JSON for log aggregation in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    let auth_api: AuthApiState = match config.auth_backend {
        AuthBackend::Remote => {
            tracing::info!(base_url = %config.api_base_url, "using remote authentication backend");
            Arc::new(HttpAuthApi::new(&config.api_base_url))
        }
        AuthBackend::Local => {
            tracing::warn!("using local development authentication backend with seeded accounts");
            Arc::new(LocalAuthApi::seeded(&config.jwt_secret))
        }
    };

    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState { auth_api, config });

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind the HTTP listener. Check BIND_ADDR.");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at: http://{}/swagger-ui", bind_addr);

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly");
}
