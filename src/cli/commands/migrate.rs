use serde_json::json;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::{self, DatabaseManager};

/// Run the same bootstrap the server performs at startup
pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let config = AppConfig::from_env()?;
    let target = database::describe_target(&config.database);

    DatabaseManager::ensure_database(&config.database).await?;
    let pool = DatabaseManager::connect(&config.database).await?;
    DatabaseManager::initialize_schema(&pool).await?;
    pool.close().await;

    output_success(
        &output_format,
        &format!("Schools table ready on {}", target),
        Some(json!({ "database": target })),
    )
}
