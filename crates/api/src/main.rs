use std::net::SocketAddr;
use std::sync::Arc;

use maxpizza_core::notifier::Notifier;
use maxpizza_core::AuthCoordinator;
use maxpizza_db::{PgAccountStore, PgSessionStore};
use maxpizza_mailer::{LogNotifier, SmtpNotifier};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use maxpizza_api::config::ServerConfig;
use maxpizza_api::router::build_app_router;
use maxpizza_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "maxpizza_api=debug,maxpizza_core=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().expect("Invalid server configuration");
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = maxpizza_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    maxpizza_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    maxpizza_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Notifier ---
    let notifier: Arc<dyn Notifier> = match &config.email {
        Some(email) => {
            tracing::info!(smtp_host = %email.smtp_host, "SMTP activation mail enabled");
            Arc::new(SmtpNotifier::new(email.clone()).expect("Invalid SMTP configuration"))
        }
        None => {
            tracing::warn!("SMTP_HOST not set; activation links will only be logged");
            Arc::new(LogNotifier)
        }
    };

    // --- Auth ---
    let auth = AuthCoordinator::new(
        config.auth.clone(),
        Arc::new(PgAccountStore::new(pool.clone())),
        Arc::new(PgSessionStore::new(pool)),
        notifier,
    )
    .expect("Invalid auth configuration");

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        auth: Arc::new(auth),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
