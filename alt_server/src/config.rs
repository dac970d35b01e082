//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use altairis::db::DatabaseConfig;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Security configuration
    pub security: SecurityConfig,
    /// Allowed cross-origin caller list (empty = permissive, dev only)
    pub cors_allowed_origins: Vec<String>,
    /// Object storage configuration
    pub storage: StorageConfig,
    /// Optional Prometheus scrape listener address
    pub metrics_bind: Option<SocketAddr>,
}

/// Security-related configuration
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Access token signing secret (required)
    pub access_secret: String,
    /// Refresh token signing secret (required, disjoint from access)
    pub refresh_secret: String,
    /// Password hashing pepper (required)
    pub password_pepper: String,
}

/// Local object storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory uploaded objects are written to
    pub upload_dir: PathBuf,
    /// Base URL prefixed onto stored object paths to form durable URLs
    pub public_base_url: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        // Bind address
        let bind = bind_override
            .or_else(|| {
                std::env::var("SERVER_BIND")
                    .ok()
                    .and_then(|s| s.parse().ok())
            })
            .unwrap_or_else(|| {
                "127.0.0.1:5005"
                    .parse()
                    .expect("Default bind address is valid")
            });

        // Database configuration
        let database_url = database_url_override
            .or_else(|| std::env::var("DATABASE_URL").ok())
            .unwrap_or_else(|| "postgres://postgres@localhost/altairis_db".to_string());

        let database = DatabaseConfig {
            database_url,
            max_connections: parse_env_or("DB_MAX_CONNECTIONS", 20),
            min_connections: parse_env_or("DB_MIN_CONNECTIONS", 5),
            connection_timeout_secs: parse_env_or("DB_CONNECTION_TIMEOUT_SECS", 5),
            idle_timeout_secs: parse_env_or("DB_IDLE_TIMEOUT_SECS", 300),
            max_lifetime_secs: parse_env_or("DB_MAX_LIFETIME_SECS", 1800),
        };

        // Security configuration (REQUIRED)
        let access_secret = std::env::var("ACCESS_SECRET").map_err(|_| {
            ConfigError::MissingRequired {
                var: "ACCESS_SECRET".to_string(),
                hint: "Generate with: openssl rand -hex 32".to_string(),
            }
        })?;

        let refresh_secret = std::env::var("REFRESH_SECRET").map_err(|_| {
            ConfigError::MissingRequired {
                var: "REFRESH_SECRET".to_string(),
                hint: "Generate with: openssl rand -hex 32".to_string(),
            }
        })?;

        let password_pepper = std::env::var("PASSWORD_PEPPER").map_err(|_| {
            ConfigError::MissingRequired {
                var: "PASSWORD_PEPPER".to_string(),
                hint: "Generate with: openssl rand -hex 16".to_string(),
            }
        })?;

        let security = SecurityConfig {
            access_secret,
            refresh_secret,
            password_pepper,
        };

        // Cross-origin callers, comma separated
        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .ok()
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let storage = StorageConfig {
            upload_dir: PathBuf::from(
                std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
            ),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5005".to_string()),
        };

        let metrics_bind = std::env::var("METRICS_BIND")
            .ok()
            .and_then(|s| s.parse().ok());

        let config = ServerConfig {
            bind,
            database,
            security,
            cors_allowed_origins,
            storage,
            metrics_bind,
        };
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration after loading
    ///
    /// # Errors
    ///
    /// Returns error if a secret is too short or the secrets are not disjoint
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.access_secret.len() < 32 {
            return Err(ConfigError::Invalid {
                var: "ACCESS_SECRET".to_string(),
                reason: "Must be at least 32 characters (128-bit security)".to_string(),
            });
        }

        if self.security.refresh_secret.len() < 32 {
            return Err(ConfigError::Invalid {
                var: "REFRESH_SECRET".to_string(),
                reason: "Must be at least 32 characters (128-bit security)".to_string(),
            });
        }

        // The two-token design depends on the secrets being disjoint.
        if self.security.access_secret == self.security.refresh_secret {
            return Err(ConfigError::Invalid {
                var: "REFRESH_SECRET".to_string(),
                reason: "Must differ from ACCESS_SECRET".to_string(),
            });
        }

        if self.security.password_pepper.len() < 16 {
            return Err(ConfigError::Invalid {
                var: "PASSWORD_PEPPER".to_string(),
                reason: "Must be at least 16 characters (64-bit security)".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
