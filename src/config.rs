//! Service configuration
//!
//! Values come from a TOML file when one is present, then from the
//! environment variables the deployment sets (`DB_HOST`, `LOG_DIR`, ...).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener
    pub http: HttpConfig,
    /// MySQL connection
    pub database: DatabaseConfig,
    /// Console and event log output
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub bind_address: String,
    /// Listening port
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Schema name
    pub name: String,
    /// Upper bound on pooled connections
    pub max_connections: u32,
    /// How long a request waits for a pooled connection
    pub acquire_timeout_secs: u64,
    /// Abort startup when the `users` table cannot be created
    pub strict_bootstrap: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory holding the JSON event log
    pub log_dir: PathBuf,
    /// Event log file name inside `log_dir`
    pub file_name: String,
    /// Console level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            name: "crud_app".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 30,
            strict_bootstrap: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("/var/logs/crud"),
            file_name: "app.log".to_string(),
            level: "info".to_string(),
        }
    }
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

impl LoggingConfig {
    /// Full path of the event log file
    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join(&self.file_name)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::FileRead(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load from file (if any), apply environment overrides, then validate
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match find_config_file() {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from environment-style variables
    ///
    /// `lookup` is `std::env::var` in production; tests pass a map.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("DB_HOST") {
            self.database.host = host;
        }
        if let Some(port) = lookup("DB_PORT") {
            self.database.port = parse_env("DB_PORT", &port)?;
        }
        if let Some(user) = lookup("DB_USER") {
            self.database.user = user;
        }
        if let Some(password) = lookup("DB_PASSWORD") {
            self.database.password = password;
        }
        if let Some(name) = lookup("DB_NAME") {
            self.database.name = name;
        }
        if let Some(dir) = lookup("LOG_DIR") {
            self.logging.log_dir = PathBuf::from(dir);
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(port) = lookup("PORT") {
            self.http.port = parse_env("PORT", &port)?;
        }
        Ok(())
    }

    /// Check the configuration for values the service cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.bind_address.is_empty() {
            return Err(ConfigError::Validation("bind address must not be empty".to_string()));
        }
        if self.http.port == 0 {
            return Err(ConfigError::Validation("http port must be greater than 0".to_string()));
        }

        if self.database.host.is_empty() {
            return Err(ConfigError::Validation("database host must not be empty".to_string()));
        }
        if self.database.name.is_empty() {
            return Err(ConfigError::Validation("database name must not be empty".to_string()));
        }
        if self.database.port == 0 {
            return Err(ConfigError::Validation(
                "database port must be greater than 0".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Validation(
                "max_connections must be greater than 0".to_string(),
            ));
        }

        if self.logging.file_name.is_empty() {
            return Err(ConfigError::Validation("log file name must not be empty".to_string()));
        }
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "invalid log level: {}, expected one of {:?}",
                self.logging.level, valid_levels
            )));
        }

        Ok(())
    }
}

fn find_config_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CONFIG_PATH") {
        return Some(PathBuf::from(path));
    }

    ["config.toml", "./config/config.toml"]
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Env(format!("{key}={value}")))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(String),
    #[error("failed to parse config file: {0}")]
    Parse(String),
    #[error("invalid environment value: {0}")]
    Env(String),
    #[error("invalid configuration: {0}")]
    Validation(String),
}
