use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokenward_core::memory_store::MemorySessionStore;
use tokenward_core::notify::Notifier;
use tokenward_core::session::SessionStore;
use tokenward_events::{EmailConfig, EmailNotifier, LogNotifier};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tokenward_api::auth::jwt::JwtSigner;
use tokenward_api::auth::secret_hash::SecretHasher;
use tokenward_api::auth::service::TokenService;
use tokenward_api::background;
use tokenward_api::config::ServerConfig;
use tokenward_api::notifications::NotificationDispatcher;
use tokenward_api::router::build_app_router;
use tokenward_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "tokenward_api=debug,tower_http=debug".into()),
    );
    if json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Invalid server configuration")?;
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Session store ---
    let cleanup_cancel = CancellationToken::new();
    let mut cleanup_handle = None;

    let store: Arc<dyn SessionStore> = match &config.database_url {
        Some(database_url) => {
            let pool = tokenward_db::create_pool(database_url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Database connection pool created");

            tokenward_db::health_check(&pool)
                .await
                .context("Database health check failed")?;
            tracing::info!("Database health check passed");

            tokenward_db::run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");

            if config.session_cleanup_interval_secs > 0 {
                cleanup_handle = Some(tokio::spawn(background::session_cleanup::run(
                    pool.clone(),
                    Duration::from_secs(config.session_cleanup_interval_secs),
                    cleanup_cancel.clone(),
                )));
            }

            Arc::new(tokenward_db::PgSessionStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, sessions are kept in memory and lost on restart");
            Arc::new(MemorySessionStore::new())
        }
    };

    // --- Notifications ---
    let notifier: Arc<dyn Notifier> = match EmailConfig::from_env() {
        Some(email_config) => {
            tracing::info!(smtp_host = %email_config.smtp_host, "Email notifications enabled");
            Arc::new(EmailNotifier::new(email_config).context("Invalid SMTP configuration")?)
        }
        None => {
            tracing::info!("SMTP not configured, address change notices are logged only");
            Arc::new(LogNotifier)
        }
    };
    let notifications = NotificationDispatcher::new(notifier, config.alert_recipient.clone());

    // --- Token service ---
    let hasher = SecretHasher::new(&config.hashing).context("Invalid Argon2 parameters")?;
    let refresh_lifetime = config
        .jwt
        .refresh_lifetime()
        .context("Invalid refresh lifetime")?;
    let tokens = Arc::new(TokenService::new(
        JwtSigner::new(&config.jwt),
        hasher,
        Arc::clone(&store),
        notifications.clone(),
        refresh_lifetime,
    ));

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        tokens,
        store,
        notifications: notifications.clone(),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let ip: IpAddr = config
        .host
        .parse()
        .with_context(|| format!("Invalid HOST address {:?}", config.host))?;
    let addr = SocketAddr::new(ip, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    cleanup_cancel.cancel();
    if let Some(handle) = cleanup_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        tracing::info!("Session cleanup job stopped");
    }

    let drained = notifications
        .drain(Duration::from_secs(config.shutdown_timeout_secs))
        .await;
    if drained {
        tracing::info!("Pending notifications delivered");
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
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

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
