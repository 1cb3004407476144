//! HTTP server initialization and runtime setup.
//!
//! Connects to PostgreSQL and Redis, applies migrations, wires services into
//! [`AppState`] and serves until SIGINT or SIGTERM.

use crate::application::services::{AuthService, AuthSettings, LinkService};
use crate::config::Config;
use crate::domain::repositories::{AccountRepository, LinkRepository};
use crate::infrastructure::cache::{RedisSessionStore, SessionStore};
use crate::infrastructure::persistence::{PgAccountRepository, PgLinkRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

/// Opens the Postgres pool with the configured limits.
///
/// # Errors
///
/// Returns an error if no connection can be established.
pub async fn connect_database(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Redis session store
/// - Link and auth services
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database or Redis connection fails
/// - Migrations fail
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_database(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to apply migrations")?;
    tracing::info!("Migrations applied");

    let sessions: Arc<dyn SessionStore> = Arc::new(
        RedisSessionStore::connect(&config.redis_url)
            .await
            .context("Failed to connect to Redis")?,
    );

    let pool_arc = Arc::new(pool.clone());
    let link_repository: Arc<dyn LinkRepository> =
        Arc::new(PgLinkRepository::new(pool_arc.clone()));
    let account_repository: Arc<dyn AccountRepository> =
        Arc::new(PgAccountRepository::new(pool_arc));

    let link_service = Arc::new(LinkService::new(
        link_repository,
        config.short_code_strategy,
        config.short_code_encoder()?,
    ));
    let auth_service = Arc::new(AuthService::new(
        account_repository,
        sessions.clone(),
        AuthSettings {
            secret: config.jwt_secret.clone(),
            access_token_ttl_hours: config.jwt_expiration_hours,
            refresh_token_ttl: config.refresh_token_ttl()?,
            bcrypt_cost: config.bcrypt_cost,
        },
    ));
    tracing::info!(strategy = %config.short_code_strategy, "Services ready");

    let state = AppState::new(link_service, auth_service, sessions);
    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
