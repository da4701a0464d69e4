//! Server binary: config, database, admin bootstrap, sweeper, serve.

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chit_api::{auth, build_router, ApiConfig, AppState, JwtManager};
use chit_core::UserRole;
use chit_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chit_api=info,chit_db=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::load()?;
    info!(port = config.http_port, db = %config.database_path, "Starting Chit API");

    let db = Database::new(DbConfig::new(&config.database_path)).await?;

    bootstrap_admin(&db, &config).await?;

    // Sweep runs once immediately, then every interval
    tokio::spawn(chit_api::sweeper::run(db.clone(), config.sweep_interval_secs));

    let state = AppState::new(
        db,
        JwtManager::new(config.jwt_secret.clone(), config.jwt_lifetime_secs),
    );
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Creates the initial admin account on an empty user table.
async fn bootstrap_admin(
    db: &Database,
    config: &ApiConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    if db.users().count().await? > 0 {
        return Ok(());
    }

    let hash = auth::hash_password(&config.admin_password)?;
    db.users()
        .create(&config.admin_username, &hash, UserRole::Admin, None)
        .await?;

    warn!(
        username = %config.admin_username,
        "Bootstrapped initial admin account; change its password"
    );
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl-C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => warn!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
