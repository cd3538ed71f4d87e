use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::config::DatabaseConfig;

/// Errors from the database layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Invalid database name: {0}")]
    InvalidDatabaseName(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

const CREATE_SCHOOLS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS schools (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        address TEXT NOT NULL,
        city TEXT NOT NULL,
        state TEXT NOT NULL,
        contact BIGINT NOT NULL,
        image TEXT,
        email_id TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

const CREATE_SCHOOLS_CREATED_AT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS schools_created_at_idx ON schools (created_at DESC, id DESC)";

/// Builds the connection pool and bootstraps the schema. The pool is handed
/// to its owner; nothing here is process-global.
pub struct DatabaseManager;

impl DatabaseManager {
    /// Maintenance database used for administrative statements
    const ADMIN_DB_NAME: &'static str = "postgres";

    /// Open the bounded application pool. Callers beyond `max_connections`
    /// wait up to `connection_timeout` seconds for a free connection.
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = Self::connection_url(config)?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url.as_str())
            .await?;

        info!(
            "Created database pool for: {} (max_connections={})",
            Self::database_name(&url).unwrap_or_default(),
            config.max_connections
        );
        Ok(pool)
    }

    /// Create the configured database when it does not exist yet.
    pub async fn ensure_database(config: &DatabaseConfig) -> Result<(), DatabaseError> {
        let url = Self::connection_url(config)?;
        let database = Self::database_name(&url).ok_or(DatabaseError::ConfigMissing("DB_NAME"))?;
        if database == Self::ADMIN_DB_NAME {
            return Ok(());
        }
        if !Self::is_valid_db_name(&database) {
            return Err(DatabaseError::InvalidDatabaseName(database));
        }

        let admin_pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(Self::admin_url(&url).as_str())
            .await?;

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pg_database WHERE datname = $1")
            .bind(&database)
            .fetch_one(&admin_pool)
            .await?;

        if count.0 == 0 {
            let query = format!("CREATE DATABASE {}", Self::quote_identifier(&database));
            sqlx::query(&query).execute(&admin_pool).await?;
            info!("Created database {}", database);
        }

        admin_pool.close().await;
        Ok(())
    }

    /// Create the schools table (and its listing index) if missing
    pub async fn initialize_schema(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query(CREATE_SCHOOLS_TABLE).execute(pool).await?;
        sqlx::query(CREATE_SCHOOLS_CREATED_AT_INDEX).execute(pool).await?;
        info!("Schools table created/exists");
        Ok(())
    }

    /// Resolve the connection URL from `DATABASE_URL` or the discrete settings
    pub fn connection_url(config: &DatabaseConfig) -> Result<Url, DatabaseError> {
        let mut url = match &config.url {
            Some(raw) => Url::parse(raw).map_err(|_| DatabaseError::InvalidDatabaseUrl)?,
            None => {
                let host = config.host.as_deref().ok_or(DatabaseError::ConfigMissing("DB_HOST"))?;
                let name = config.name.as_deref().ok_or(DatabaseError::ConfigMissing("DB_NAME"))?;

                let mut url = Url::parse("postgres://localhost").map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
                url.set_host(Some(host)).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
                url.set_port(Some(config.port)).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
                url.set_path(&format!("/{}", name));
                if let Some(user) = &config.user {
                    url.set_username(user).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
                }
                if let Some(password) = &config.password {
                    url.set_password(Some(password)).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
                }
                url
            }
        };

        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(DatabaseError::InvalidDatabaseUrl);
        }

        let has_sslmode = url.query_pairs().any(|(k, _)| k == "sslmode");
        if config.ssl && !has_sslmode {
            url.query_pairs_mut().append_pair("sslmode", "require");
        }

        Ok(url)
    }

    /// Same server and credentials, pointed at the maintenance database
    fn admin_url(url: &Url) -> Url {
        let mut admin = url.clone();
        admin.set_path(&format!("/{}", Self::ADMIN_DB_NAME));
        admin
    }

    fn database_name(url: &Url) -> Option<String> {
        let name = url.path().trim_start_matches('/');
        (!name.is_empty()).then(|| name.to_string())
    }

    /// Quote SQL identifier to prevent injection
    fn quote_identifier(name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Accepts [a-zA-Z_][a-zA-Z0-9_]* up to Postgres' 63-byte identifier limit
    fn is_valid_db_name(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return false,
        }
        name.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}

/// Log-safe description of where the pool will connect (no credentials)
pub fn describe_target(config: &DatabaseConfig) -> String {
    match DatabaseManager::connection_url(config) {
        Ok(url) => format!(
            "{}:{}/{}",
            url.host_str().unwrap_or("?"),
            url.port().unwrap_or(5432),
            url.path().trim_start_matches('/')
        ),
        Err(e) => {
            warn!("Database configuration incomplete: {}", e);
            "<unconfigured>".to_string()
        }
    }
}
