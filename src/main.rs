use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use school_directory::config::AppConfig;
use school_directory::database::{self, DatabaseManager, PgSchoolRepository};
use school_directory::server::{create_router, AppState};
use school_directory::storage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, IMAGE_STORAGE, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    info!("Starting school directory in {:?} mode", config.environment);
    info!("Database target: {}", database::describe_target(&config.database));

    if let Err(e) = DatabaseManager::ensure_database(&config.database).await {
        warn!("Could not ensure database exists: {}", e);
    }

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    DatabaseManager::initialize_schema(&pool)
        .await
        .context("failed to initialize schema")?;

    let images = storage::from_config(&config).context("invalid image storage configuration")?;
    info!("Image storage: {}", images.kind());

    let port = config.api.port;
    let schools = Arc::new(PgSchoolRepository::new(pool.clone()));
    let app = create_router(AppState::new(config, schools, images));

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("School directory listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    pool.close().await;
    info!("Database pool closed");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
