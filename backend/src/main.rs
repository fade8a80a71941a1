//! Main entry point for the Kit-Chan events backend.
//!
//! Initializes logging, loads configuration, opens and migrates the database,
//! then serves the router until Ctrl-C or SIGTERM.

use anyhow::{Context, Result};
use kitchan_backend::{build_router, config::Config, database::Database};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,kitchan_backend=debug")),
        )
        .init();

    let config = Config::from_env().context("failed to load configuration")?;
    let db = Database::new(&config)
        .await
        .context("failed to connect to the database")?;
    db.migrate().await?;

    let port = config.server_port;
    let app = build_router(db.pool().clone(), config);

    let bind_address = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {}", bind_address))?;

    info!("Starting Kit-Chan events server on port {}", port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut signal) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            signal.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
