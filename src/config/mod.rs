//! Configuration management
//!
//! Configuration is loaded from a YAML file (`config.yml` by default) and can
//! be overridden by `RENTMOLDOVA_*` environment variables. Missing values are
//! filled with defaults, so an absent file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins. Empty means any origin (without credentials).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL or file path
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite:data/rentmoldova.db?mode=rwc".to_string()
}

/// In-memory cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached entries
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
    /// Cache TTL in seconds
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_max_capacity(),
            ttl_seconds: default_ttl(),
        }
    }
}

fn default_max_capacity() -> u64 {
    10_000
}

fn default_ttl() -> u64 {
    300
}

/// Authentication and session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Session validity window in days
    #[serde(default = "default_session_days")]
    pub session_days: i64,
    /// Whether the session cookie carries the `Secure` attribute
    #[serde(default = "default_cookie_secure")]
    pub cookie_secure: bool,
    /// Endpoint of the external identity provider used by session exchange
    #[serde(default = "default_identity_url")]
    pub identity_url: String,
    /// Allow any authenticated user to promote themselves to admin
    #[serde(default)]
    pub allow_self_promotion: bool,
    /// Admin account created at startup when missing
    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_days: default_session_days(),
            cookie_secure: default_cookie_secure(),
            identity_url: default_identity_url(),
            allow_self_promotion: false,
            bootstrap_admin: None,
        }
    }
}

fn default_session_days() -> i64 {
    7
}

fn default_cookie_secure() -> bool {
    true
}

fn default_identity_url() -> String {
    "https://demobackend.emergentagent.com/auth/v1/env/oauth/session-data".to_string()
}

/// Credentials for the startup admin account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapAdmin {
    pub phone: String,
    pub password: String,
    #[serde(default = "default_admin_name")]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

fn default_admin_name() -> String {
    "Administrator".to_string()
}

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Load configuration from file.
    ///
    /// A missing or empty file yields the default configuration.
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file, then apply environment overrides:
    /// - RENTMOLDOVA_HOST
    /// - RENTMOLDOVA_PORT
    /// - RENTMOLDOVA_DATABASE_URL
    /// - RENTMOLDOVA_IDENTITY_URL
    /// - RENTMOLDOVA_ALLOW_SELF_PROMOTION
    pub fn load_with_env(path: &std::path::Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("RENTMOLDOVA_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("RENTMOLDOVA_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(url) = std::env::var("RENTMOLDOVA_DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(url) = std::env::var("RENTMOLDOVA_IDENTITY_URL") {
            self.auth.identity_url = url;
        }
        if let Ok(flag) = std::env::var("RENTMOLDOVA_ALLOW_SELF_PROMOTION") {
            match flag.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.auth.allow_self_promotion = true,
                "0" | "false" | "no" => self.auth.allow_self_promotion = false,
                _ => {}
            }
        }
    }

    /// Reject values the service cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be greater than 0".to_string(),
            ));
        }
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "database.url cannot be empty".to_string(),
            ));
        }
        if self.auth.session_days <= 0 {
            return Err(ConfigError::ValidationError(
                "auth.session_days must be at least 1".to_string(),
            ));
        }
        if let Some(admin) = &self.auth.bootstrap_admin {
            if admin.phone.trim().is_empty() || admin.password.is_empty() {
                return Err(ConfigError::ValidationError(
                    "auth.bootstrap_admin requires phone and password".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared by every test that touches RENTMOLDOVA_* variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
