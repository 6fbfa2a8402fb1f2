//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache setup, service wiring, and the Axum
//! server lifecycle.

use crate::config::Config;
use crate::domain::clock::SystemClock;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::mail::{LogMailer, Mailer, SmtpMailer, SmtpSettings};
use crate::infrastructure::persistence::{PgLinkRepository, PgUserRepository};
use crate::routes::app_router;
use crate::state::{AppState, Backends};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Redis cache (or NullCache fallback)
/// - SMTP mailer (or LogMailer fallback when `SMTP_HOST` is unset)
/// - Services and shared state
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - The SMTP relay is configured but unreachable
/// - The signing secret is rejected
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to migrate")?;

    let cache: Arc<dyn CacheService> = if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                Arc::new(NullCache::new())
            }
        }
    } else {
        tracing::info!("Cache disabled (NullCache)");
        Arc::new(NullCache::new())
    };

    let mailer = build_mailer(&config).await?;

    let pool = Arc::new(pool);
    let backends = Backends {
        users: Arc::new(PgUserRepository::new(pool.clone())),
        links: Arc::new(PgLinkRepository::new(pool.clone())),
        cache,
        mailer,
        clock: Arc::new(SystemClock),
    };

    let state = AppState::new(&config, backends).context("Failed to initialize services")?;

    let app = app_router(state, Duration::from_secs(config.request_timeout_seconds));

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    pool.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

/// Selects SMTP delivery when configured, otherwise the log mailer.
///
/// A configured relay must accept a connection before the server starts.
async fn build_mailer(config: &Config) -> Result<Arc<dyn Mailer>> {
    let Some(host) = &config.smtp_host else {
        tracing::warn!("SMTP_HOST not set, outgoing mail will be logged but not delivered");
        return Ok(Arc::new(LogMailer::new(config.mail_from.clone())));
    };

    let credentials = config
        .smtp_username
        .clone()
        .zip(config.smtp_password.clone());

    let mailer = SmtpMailer::new(SmtpSettings {
        host: host.clone(),
        port: config.smtp_port,
        credentials,
        from: config.mail_from.clone(),
        timeout: Duration::from_secs(config.mail_timeout_seconds),
    })
    .context("Invalid SMTP configuration")?;

    mailer
        .verify_connection()
        .await
        .with_context(|| format!("Failed to connect to SMTP relay {}:{}", host, config.smtp_port))?;
    tracing::info!("Mail delivery enabled (SMTP {}:{})", host, config.smtp_port);

    Ok(Arc::new(mailer))
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
///
/// If a handler cannot be installed the error is logged and that signal is
/// ignored; the other one still stops the server.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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
