use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::recommendations::ReasonLocale;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub storage: StorageConfig,
    pub access: AccessConfig,
    pub reason_locale: ReasonLocale,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let database_path =
            env::var("APP_DATABASE_PATH").unwrap_or_else(|_| "roro.db".to_string());
        let table_prefix = env::var("APP_TABLE_PREFIX").unwrap_or_else(|_| "wp_".to_string());
        validate_table_prefix(&table_prefix)?;

        let admin_token = env::var("APP_ADMIN_TOKEN")
            .ok()
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());

        let reason_locale = match env::var("APP_REASON_LOCALE") {
            Ok(raw) => ReasonLocale::parse(&raw).ok_or(ConfigError::InvalidLocale(raw))?,
            Err(_) => ReasonLocale::default(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            storage: StorageConfig {
                database_path,
                table_prefix,
            },
            access: AccessConfig { admin_token },
            reason_locale,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Location of the relational snapshot and the table naming scheme inside it.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub database_path: String,
    pub table_prefix: String,
}

/// Credentials gating administrator-only endpoints.
#[derive(Debug, Clone, Default)]
pub struct AccessConfig {
    pub admin_token: Option<String>,
}

/// Table prefixes are interpolated into SQL identifiers, so only word characters pass.
pub fn validate_table_prefix(prefix: &str) -> Result<(), ConfigError> {
    if prefix
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
    {
        Ok(())
    } else {
        Err(ConfigError::InvalidTablePrefix(prefix.to_string()))
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTablePrefix(String),
    InvalidLocale(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTablePrefix(value) => write!(
                f,
                "APP_TABLE_PREFIX '{value}' may only contain ASCII letters, digits, and '_'"
            ),
            ConfigError::InvalidLocale(value) => {
                write!(f, "APP_REASON_LOCALE '{value}' must be one of: ja, en")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidTablePrefix(_)
            | ConfigError::InvalidLocale(_) => None,
        }
    }
}
