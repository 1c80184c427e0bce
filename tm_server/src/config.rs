//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tournamate::{
    auth::MIN_SECRET_LEN, chat::DEFAULT_MAX_MESSAGE_LEN, db::DatabaseConfig,
    events::DEFAULT_WEBHOOK_TIMEOUT, tournament::RetryPolicy,
};

const DEFAULT_BIND: &str = "127.0.0.1:8080";
const MAX_CODE_ATTEMPTS: u32 = 100;

/// Where tournaments are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// PostgreSQL through `DATABASE_URL`
    Postgres,
    /// Process memory; data is lost on restart
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend: {other}")),
        }
    }
}

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Storage backend
    pub storage: StorageBackend,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Apply the schema at startup
    pub auto_migrate: bool,
    /// Token verification configuration
    pub auth: AuthConfig,
    /// Registration code retry policy
    pub codes: RetryPolicy,
    /// Automation webhook, if any
    pub webhook: Option<WebhookConfig>,
    /// Longest accepted chat message
    pub chat_max_message_len: usize,
    /// Prometheus exporter address, if metrics are enabled
    pub metrics_bind: Option<SocketAddr>,
}

/// Token verification configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 secret shared with the identity provider (required)
    pub jwt_secret: String,
    /// Expected `aud` claim
    pub jwt_audience: Option<String>,
}

/// Automation webhook configuration
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub url: String,
    /// Sent as a bearer token
    pub secret: Option<String>,
    pub timeout: Duration,
}

/// Values given on the command line, taking precedence over the environment
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub bind: Option<SocketAddr>,
    pub database_url: Option<String>,
    pub in_memory: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(overrides: CliOverrides) -> Result<Self, ConfigError> {
        Self::from_lookup(overrides, |key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup` instead of the process environment
    pub fn from_lookup<F>(overrides: CliOverrides, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        // Bind address
        let bind = match overrides.bind {
            Some(bind) => bind,
            None => {
                let raw = env
                    .get("SERVER_BIND")
                    .unwrap_or_else(|| DEFAULT_BIND.to_string());
                parse_value("SERVER_BIND", &raw)?
            }
        };

        // Storage
        let storage = if overrides.in_memory {
            StorageBackend::Memory
        } else {
            env.parse_or("STORAGE_BACKEND", StorageBackend::Postgres)?
        };

        // Database configuration
        let defaults = DatabaseConfig::development();
        let database_url = overrides
            .database_url
            .or_else(|| env.get("DATABASE_URL"))
            .unwrap_or(defaults.database_url);

        let database = DatabaseConfig {
            database_url,
            max_connections: env.parse_or("DB_MAX_CONNECTIONS", defaults.max_connections)?,
            min_connections: env.parse_or("DB_MIN_CONNECTIONS", defaults.min_connections)?,
            connection_timeout_secs: env
                .parse_or("DB_CONNECTION_TIMEOUT_SECS", defaults.connection_timeout_secs)?,
            idle_timeout_secs: env.parse_or("DB_IDLE_TIMEOUT_SECS", defaults.idle_timeout_secs)?,
            max_lifetime_secs: env.parse_or("DB_MAX_LIFETIME_SECS", defaults.max_lifetime_secs)?,
        };
        let auto_migrate = env.parse_or("DB_AUTO_MIGRATE", true)?;

        // Security configuration (REQUIRED)
        let jwt_secret = env
            .get("JWT_SECRET")
            .ok_or_else(|| ConfigError::MissingRequired {
                var: "JWT_SECRET".to_string(),
                hint: "Use the identity provider's HS256 secret (openssl rand -hex 32 for local use)"
                    .to_string(),
            })?;
        let auth = AuthConfig {
            jwt_secret,
            jwt_audience: env.get("JWT_AUDIENCE"),
        };

        // Registration codes
        let codes = RetryPolicy {
            max_attempts: env.parse_or("CODE_MAX_ATTEMPTS", RetryPolicy::default().max_attempts)?,
            backoff: Duration::from_millis(env.parse_or("CODE_RETRY_BACKOFF_MS", 0)?),
        };

        // Webhook
        let webhook = match env.get("WEBHOOK_URL") {
            Some(url) => Some(WebhookConfig {
                url,
                secret: env.get("WEBHOOK_SECRET"),
                timeout: match env.get("WEBHOOK_TIMEOUT_MS") {
                    Some(raw) => Duration::from_millis(parse_value("WEBHOOK_TIMEOUT_MS", &raw)?),
                    None => DEFAULT_WEBHOOK_TIMEOUT,
                },
            }),
            None => None,
        };

        let chat_max_message_len = env.parse_or("CHAT_MAX_MESSAGE_LEN", DEFAULT_MAX_MESSAGE_LEN)?;

        let metrics_bind = match env.get("METRICS_BIND") {
            Some(raw) => Some(parse_value("METRICS_BIND", &raw)?),
            None => None,
        };

        Ok(ServerConfig {
            bind,
            storage,
            database,
            auto_migrate,
            auth,
            codes,
            webhook,
            chat_max_message_len,
            metrics_bind,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid {
                var: "JWT_SECRET".to_string(),
                reason: format!("Must be at least {MIN_SECRET_LEN} characters"),
            });
        }

        if self.codes.max_attempts == 0 || self.codes.max_attempts > MAX_CODE_ATTEMPTS {
            return Err(ConfigError::Invalid {
                var: "CODE_MAX_ATTEMPTS".to_string(),
                reason: format!("Must be between 1 and {MAX_CODE_ATTEMPTS}"),
            });
        }

        if self.chat_max_message_len == 0 {
            return Err(ConfigError::Invalid {
                var: "CHAT_MAX_MESSAGE_LEN".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.storage == StorageBackend::Postgres {
            if self.database.max_connections == 0 {
                return Err(ConfigError::Invalid {
                    var: "DB_MAX_CONNECTIONS".to_string(),
                    reason: "Must be greater than 0".to_string(),
                });
            }

            if self.database.min_connections > self.database.max_connections {
                return Err(ConfigError::Invalid {
                    var: "DB_MIN_CONNECTIONS".to_string(),
                    reason: format!(
                        "Cannot exceed max connections ({})",
                        self.database.max_connections
                    ),
                });
            }
        }

        if let Some(webhook) = &self.webhook {
            if !webhook.url.starts_with("http://") && !webhook.url.starts_with("https://") {
                return Err(ConfigError::Invalid {
                    var: "WEBHOOK_URL".to_string(),
                    reason: "Must be an http:// or https:// URL".to_string(),
                });
            }
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

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Non-empty value of `key`
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Parse `key` when set, otherwise use `default`
    fn parse_or<T: FromStr>(&self, key: &str, default: T) -> Result<T, ConfigError> {
        match self.get(key) {
            Some(raw) => parse_value(key, &raw),
            None => Ok(default),
        }
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Invalid {
        var: key.to_string(),
        reason: format!("Cannot parse {raw:?}"),
    })
}
