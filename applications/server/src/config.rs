/// Server configuration
use crate::error::{Result, ServerError};
use encore_storage::{OrderingConfig, PoolConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_ordering")]
    pub ordering: OrderingSettings,

    #[serde(default = "default_auth")]
    pub auth: AuthSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long SQLite waits on another writer before reporting busy
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrderingSettings {
    /// Bound on waiting for a container's lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthSettings {
    pub jwt_secret: String,

    #[serde(default = "default_jwt_expiration_hours")]
    pub jwt_expiration_hours: u64,
}

impl ServerConfig {
    /// Load configuration from file and environment
    ///
    /// Reads `path` if given, otherwise `config.toml` when present, then
    /// applies `ENCORE_` environment overrides such as
    /// `ENCORE_AUTH__JWT_SECRET` or `ENCORE_ORDERING__LOCK_TIMEOUT_MS`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("ENCORE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ServerError::Config(
                "JWT secret is required (set ENCORE_AUTH__JWT_SECRET)".to_string(),
            ));
        }

        if self.ordering.lock_timeout_ms == 0 {
            return Err(ServerError::Config(
                "ordering.lock_timeout_ms must be greater than zero".to_string(),
            ));
        }

        if self.storage.max_connections == 0 {
            return Err(ServerError::Config(
                "storage.max_connections must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            max_connections: self.storage.max_connections,
            busy_timeout: Duration::from_millis(self.storage.busy_timeout_ms),
            ..PoolConfig::default()
        }
    }

    pub fn ordering_config(&self) -> OrderingConfig {
        OrderingConfig {
            lock_timeout: Duration::from_millis(self.ordering.lock_timeout_ms),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        host: default_host(),
        port: default_port(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        database_url: default_database_url(),
        max_connections: default_max_connections(),
        busy_timeout_ms: default_busy_timeout_ms(),
    }
}

fn default_database_url() -> String {
    "sqlite://./data/encore.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_busy_timeout_ms() -> u64 {
    30_000
}

fn default_ordering() -> OrderingSettings {
    OrderingSettings {
        lock_timeout_ms: default_lock_timeout_ms(),
    }
}

fn default_lock_timeout_ms() -> u64 {
    5_000
}

fn default_auth() -> AuthSettings {
    AuthSettings {
        jwt_secret: String::new(),
        jwt_expiration_hours: default_jwt_expiration_hours(),
    }
}

fn default_jwt_expiration_hours() -> u64 {
    24
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            storage: default_storage(),
            ordering: default_ordering(),
            auth: default_auth(),
        }
    }
}
