use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

use crate::services::school_service::MAX_IMAGE_BYTES;

/// Errors raised while assembling configuration from the environment
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub images: ImageConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

/// Connection either through a single URI (`url`) or discrete settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(skip_serializing)]
    pub url: Option<String>,
    pub host: Option<String>,
    pub user: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub name: Option<String>,
    pub port: u16,
    pub ssl: bool,
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection before failing
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageStorageMode {
    Local,
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    pub storage: ImageStorageMode,
    /// Directory served as static files; local uploads land in `<public_dir>/schoolImages`
    pub public_dir: PathBuf,
    /// Present only in remote mode
    pub cloudinary: Option<CloudinaryConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    #[serde(skip_serializing)]
    pub api_secret: String,
    pub folder: String,
    pub api_base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

pub const LOCAL_IMAGE_DIR: &str = "schoolImages";
const DEFAULT_CLOUDINARY_FOLDER: &str = "schoolImages";
const DEFAULT_CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com/v1_1";

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (the process
    /// environment in production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_overrides(&lookup)
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // Database overrides
        self.database.url = non_empty("DATABASE_URL");
        self.database.host = non_empty("DB_HOST");
        self.database.user = non_empty("DB_USER");
        self.database.password = lookup("DB_PASSWORD");
        self.database.name = non_empty("DB_NAME");
        if let Some(v) = non_empty("DB_PORT") {
            self.database.port = v.parse().map_err(|_| ConfigError::Invalid { name: "DB_PORT", value: v })?;
        }
        if let Some(v) = non_empty("DB_SSL") {
            self.database.ssl = parse_flag(&v).unwrap_or(self.database.ssl);
        }
        if let Some(v) = non_empty("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = non_empty("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Some(v) = non_empty("SCHOOLS_PORT").or_else(|| non_empty("PORT")) {
            self.api.port = v.parse().map_err(|_| ConfigError::Invalid { name: "PORT", value: v })?;
        }
        if let Some(v) = non_empty("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = parse_flag(&v).unwrap_or(self.api.enable_request_logging);
        }
        if let Some(v) = non_empty("API_MAX_REQUEST_SIZE_BYTES") {
            // Multipart overhead rides on top of the image, so the body limit
            // must leave room for a maximum-size image
            self.api.max_request_size_bytes = match v.parse::<usize>() {
                Ok(limit) if limit > MAX_IMAGE_BYTES => limit,
                _ => return Err(ConfigError::Invalid { name: "API_MAX_REQUEST_SIZE_BYTES", value: v }),
            };
        }

        // Image storage overrides
        if let Some(v) = non_empty("PUBLIC_DIR") {
            self.images.public_dir = PathBuf::from(v);
        }
        if let Some(v) = non_empty("IMAGE_STORAGE") {
            self.images.storage = match v.trim().to_ascii_lowercase().as_str() {
                "local" => ImageStorageMode::Local,
                "remote" | "cloudinary" => ImageStorageMode::Remote,
                _ => return Err(ConfigError::Invalid { name: "IMAGE_STORAGE", value: v }),
            };
        }
        if self.images.storage == ImageStorageMode::Remote {
            let require = |key: &'static str| non_empty(key).ok_or(ConfigError::Missing(key));
            self.images.cloudinary = Some(CloudinaryConfig {
                cloud_name: require("CLOUDINARY_CLOUD_NAME")?,
                api_key: require("CLOUDINARY_API_KEY")?,
                api_secret: require("CLOUDINARY_API_SECRET")?,
                folder: non_empty("CLOUDINARY_FOLDER").unwrap_or_else(|| DEFAULT_CLOUDINARY_FOLDER.to_string()),
                api_base: non_empty("CLOUDINARY_API_BASE")
                    .map(|v| v.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_CLOUDINARY_API_BASE.to_string()),
            });
        }

        Ok(self)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout: 30,
                ..DatabaseConfig::empty()
            },
            images: ImageConfig::local("public"),
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                ssl: true,
                max_connections: 10,
                connection_timeout: 10,
                ..DatabaseConfig::empty()
            },
            images: ImageConfig::local("public"),
            api: ApiConfig {
                port: 3000,
                enable_request_logging: false,
                max_request_size_bytes: 8 * 1024 * 1024, // 8MB
            },
        }
    }

    /// Directory local-mode uploads are written to and served from
    pub fn local_image_dir(&self) -> PathBuf {
        self.images.public_dir.join(LOCAL_IMAGE_DIR)
    }
}

impl DatabaseConfig {
    fn empty() -> Self {
        Self {
            url: None,
            host: None,
            user: None,
            password: None,
            name: None,
            port: 5432,
            ssl: false,
            max_connections: 10,
            connection_timeout: 30,
        }
    }
}

impl ImageConfig {
    pub fn local(public_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage: ImageStorageMode::Local,
            public_dir: public_dir.into(),
            cloudinary: None,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
