//! Process configuration.
//!
//! Everything comes from environment variables, with a `.env` file picked
//! up in development. A missing required variable or a value that fails to
//! parse aborts startup; silently running with a half-applied config is
//! worse than not starting.

use std::env;
use std::str::FromStr;

const DEFAULT_APP_NAME: &str = "campus-chat";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_DB_MIN_CONNECTIONS: u32 = 5;
const DEFAULT_REDIS_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_REQUESTS_PER_SECOND: u32 = 10;
const DEFAULT_BURST: u32 = 50;
const DEFAULT_UPLOAD_DIR: &str = "./uploads";
const DEFAULT_PUBLIC_BASE_URL: &str = "/files";
const DEFAULT_MAX_FILE_SIZE_MB: u32 = 10;
const DEFAULT_TEMP_URL_TTL_SECONDS: u64 = 300;
const DEFAULT_MAX_CONTENT_LENGTH: usize = 5000;

const DEFAULT_ATTACHMENT_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/webp",
    "application/pdf",
    "text/plain",
];

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub gateway: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
    pub chat: ChatConfig,
    pub snowflake: SnowflakeConfig,
}

impl AppConfig {
    /// Load the whole configuration from the environment.
    ///
    /// # Errors
    /// Fails on a missing required variable or an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A .env file is a development convenience; absence is normal
        let _ = dotenvy::dotenv();

        Ok(Self {
            app: AppSettings::from_env()?,
            api: ServerConfig::from_env("API_HOST", "API_PORT")?,
            gateway: ServerConfig::from_env("GATEWAY_HOST", "GATEWAY_PORT")?,
            database: DatabaseConfig::from_env()?,
            redis: RedisConfig::from_env()?,
            rate_limit: RateLimitConfig::from_env()?,
            cors: CorsConfig::from_env(),
            storage: StorageConfig::from_env()?,
            chat: ChatConfig::from_env()?,
            snowflake: SnowflakeConfig::from_env()?,
        })
    }
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

impl AppSettings {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            name: var_or("APP_NAME", DEFAULT_APP_NAME),
            env: parsed_or("APP_ENV", Environment::default())?,
        })
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            other => Err(other.to_string()),
        }
    }
}

/// Bind address for one of the two listeners (REST API, gateway)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    fn from_env(host_var: &'static str, port_var: &'static str) -> Result<Self, ConfigError> {
        Ok(Self {
            host: var_or(host_var, DEFAULT_HOST),
            port: required_parsed(port_var)?,
        })
    }

    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// PostgreSQL settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl DatabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: required("DATABASE_URL")?,
            max_connections: parsed_or("DATABASE_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?,
            min_connections: parsed_or("DATABASE_MIN_CONNECTIONS", DEFAULT_DB_MIN_CONNECTIONS)?,
        })
    }
}

/// Redis settings
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    pub max_connections: u32,
}

impl RedisConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: required("REDIS_URL")?,
            max_connections: parsed_or("REDIS_MAX_CONNECTIONS", DEFAULT_REDIS_MAX_CONNECTIONS)?,
        })
    }
}

/// REST rate limiting
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst: u32,
}

impl RateLimitConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            requests_per_second: parsed_or(
                "RATE_LIMIT_REQUESTS_PER_SECOND",
                DEFAULT_REQUESTS_PER_SECOND,
            )?,
            burst: parsed_or("RATE_LIMIT_BURST", DEFAULT_BURST)?,
        })
    }
}

/// CORS allow-list; empty means same-origin only
#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    fn from_env() -> Self {
        Self {
            allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|raw| csv(&raw))
                .unwrap_or_default(),
        }
    }
}

/// Attachment storage settings.
///
/// `max_file_size_mb` is the single attachment ceiling; uploads and message
/// attachment validation both enforce it.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub upload_dir: String,
    pub public_base_url: String,
    pub max_file_size_mb: u32,
    pub temp_url_ttl_seconds: u64,
}

impl StorageConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            upload_dir: var_or("UPLOAD_DIR", DEFAULT_UPLOAD_DIR),
            public_base_url: var_or("PUBLIC_BASE_URL", DEFAULT_PUBLIC_BASE_URL),
            max_file_size_mb: parsed_or("MAX_FILE_SIZE_MB", DEFAULT_MAX_FILE_SIZE_MB)?,
            temp_url_ttl_seconds: parsed_or("TEMP_URL_TTL_SECONDS", DEFAULT_TEMP_URL_TTL_SECONDS)?,
        })
    }

    /// Ceiling in bytes
    #[must_use]
    pub fn max_file_size_bytes(&self) -> u64 {
        u64::from(self.max_file_size_mb) * 1024 * 1024
    }
}

/// Messaging limits
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub max_content_length: usize,
    pub allowed_attachment_types: Vec<String>,
}

impl ChatConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            max_content_length: parsed_or("CHAT_MAX_CONTENT_LENGTH", DEFAULT_MAX_CONTENT_LENGTH)?,
            allowed_attachment_types: env::var("CHAT_ALLOWED_ATTACHMENT_TYPES")
                .map(|raw| csv(&raw))
                .unwrap_or_else(|_| {
                    DEFAULT_ATTACHMENT_TYPES.iter().map(ToString::to_string).collect()
                }),
        })
    }

    /// Check a declared MIME type against the allow-list
    #[must_use]
    pub fn is_allowed_type(&self, content_type: &str) -> bool {
        self.allowed_attachment_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(content_type))
    }
}

/// Snowflake ID generator settings
#[derive(Debug, Clone)]
pub struct SnowflakeConfig {
    pub worker_id: u16,
}

impl SnowflakeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            worker_id: parsed_or("WORKER_ID", 0)?,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

fn required_parsed<T: FromStr>(name: &'static str) -> Result<T, ConfigError> {
    let raw = required(name)?;
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name, raw))
}

fn var_or(name: &'static str, fallback: &str) -> String {
    env::var(name).unwrap_or_else(|_| fallback.to_string())
}

/// Parse an optional variable, erroring on garbage rather than
/// falling back to the default
fn parsed_or<T: FromStr>(name: &'static str, fallback: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        Err(_) => Ok(fallback),
    }
}

fn csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}
