use std::env;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("STORAGE must be \"mongo\" or \"memory\", got {0:?}")]
    InvalidStorage(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    Mongo { uri: String, database: String },
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub frontend_origin: String,
    pub storage: StorageConfig,
    /// `APP_ENV=production`; silences client-side error logging.
    pub production: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            frontend_origin: "http://localhost:3000".to_string(),
            storage: StorageConfig::Memory,
            production: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any variable source.
    pub fn from_lookup<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let storage = match var("STORAGE").as_deref().unwrap_or("mongo") {
            "mongo" => StorageConfig::Mongo {
                uri: var("MONGO_URI").ok_or(ConfigError::Missing("MONGO_URI"))?,
                database: var("DATABASE_NAME").unwrap_or_else(|| "tasks_db".to_string()),
            },
            "memory" => StorageConfig::Memory,
            other => return Err(ConfigError::InvalidStorage(other.to_string())),
        };

        Ok(Self {
            bind_addr: var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            frontend_origin: var("FRONTEND_ORIGIN").unwrap_or(defaults.frontend_origin),
            storage,
            production: var("APP_ENV").map_or(false, |v| v.eq_ignore_ascii_case("production")),
        })
    }
}
