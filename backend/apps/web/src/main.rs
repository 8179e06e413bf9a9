//! Web Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but request-level
//! errors should use `auth::AuthError` / `kernel::error::AppError`.

use anyhow::Context;
use auth::{AuthConfig, PgAuthRepository, auth_router};
use axum::{Router, routing::get};
use base64::Engine;
use base64::engine::general_purpose;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:4000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "web=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;
    let max_connections = env_or("DB_MAX_CONNECTIONS", 5)?;
    let acquire_timeout = env_or("DB_ACQUIRE_TIMEOUT_SECS", 5)?;

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(acquire_timeout))
        .connect(&database_url)
        .await
        .context("failed to connect to database")?;

    tracing::info!(max_connections, "Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Startup cleanup: remove expired sessions; new sessions sweep again later
    // Errors here should not prevent server startup
    let repo = PgAuthRepository::new(pool.clone());
    match repo.cleanup_expired().await {
        Ok(deleted) => tracing::info!(sessions_deleted = deleted, "Startup session cleanup done"),
        Err(e) => tracing::warn!(
            error = %e,
            "Session cleanup failed, continuing anyway"
        ),
    }

    let auth_config = load_auth_config()?;

    // Build router
    let app = Router::new()
        .route("/ping", get(|| async { "OK" }))
        .merge(auth_router(repo, auth_config)?)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = env::var("LISTEN_ADDR")
        .unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string())
        .parse()
        .context("LISTEN_ADDR must be a socket address")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Auth configuration from the environment
///
/// Debug builds fall back to a random session secret; release builds
/// refuse to start without `SESSION_SECRET`.
fn load_auth_config() -> anyhow::Result<AuthConfig> {
    let mut config = match env::var("SESSION_SECRET") {
        Ok(secret_b64) => AuthConfig {
            session_secret: decode_secret(&secret_b64)?,
            cookie_secure: !cfg!(debug_assertions),
            ..AuthConfig::default()
        },
        Err(_) if cfg!(debug_assertions) => {
            tracing::warn!("SESSION_SECRET not set, using a random secret");
            AuthConfig::development()
        }
        Err(_) => anyhow::bail!("SESSION_SECRET must be set in production"),
    };

    if let Ok(pepper) = env::var("PASSWORD_PEPPER") {
        config.password_pepper = Some(pepper.into_bytes());
    }

    Ok(config)
}

fn decode_secret(secret_b64: &str) -> anyhow::Result<[u8; 32]> {
    let bytes = general_purpose::STANDARD
        .decode(secret_b64.trim())
        .context("SESSION_SECRET must be base64")?;

    bytes
        .try_into()
        .map_err(|b: Vec<u8>| anyhow::anyhow!("SESSION_SECRET must be 32 bytes, got {}", b.len()))
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("{key} has an invalid value")),
        Err(_) => Ok(default),
    }
}
