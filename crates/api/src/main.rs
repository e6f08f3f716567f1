use anyhow::{Context, Result};
use tracing::info;

use compliance_os_api::{app, config, middleware};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = config::Config::load().context("Failed to load configuration")?;

    middleware::logging::init_logging(&config.logging)
        .context("Failed to initialize logging")?;
    middleware::init_metrics().context("Failed to install metrics recorder")?;

    info!("Starting Compliance OS API v{}", env!("CARGO_PKG_VERSION"));

    let pool = persistence::db::create_pool(&config.database.to_pool_config()).await?;

    info!("Running database migrations...");
    persistence::db::run_migrations(&pool).await?;
    info!("Migrations completed");

    let addr = config.socket_addr()?;
    let app = app::create_app(config, pool);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
