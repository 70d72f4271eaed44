//! Configuration management for the Depot server

use std::env;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory uploaded files are written into.
    pub upload_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Token signing secret. Required and must be non-empty; it is never
    /// logged.
    pub secret: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("AUTH_SECRET must be set to a non-empty value")]
    MissingSecret,
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

impl Config {
    /// Load configuration from the environment. Everything has a default
    /// except the signing secret, which must be present and non-empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = env::var("AUTH_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingSecret)?;

        let port = match env::var("DEPOT_PORT") {
            Ok(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "DEPOT_PORT",
                value,
            })?,
            Err(_) => 8000,
        };

        Ok(Config {
            server: ServerConfig {
                host: env::var("DEPOT_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port,
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://depot.db".to_string()),
            },
            storage: StorageConfig {
                upload_dir: env::var("UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("uploads")),
            },
            auth: AuthConfig { secret },
        })
    }
}
