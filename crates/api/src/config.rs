//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `NEWSDESK_DATABASE_URL` - `SQLite` connection string (falls back to `DATABASE_URL`)
//! - `NEWSDESK_JWT_SECRET` - Token signing secret (min 32 chars, high entropy)
//! - `NEWSDESK_ADMIN_EMAIL` - Email of the configured administrator
//! - `NEWSDESK_ADMIN_PASSWORD` - Password of the configured administrator
//!
//! ## Optional
//! - `NEWSDESK_HOST` - Bind address (default: 127.0.0.1)
//! - `NEWSDESK_PORT` - Listen port (default: 3000)
//! - `NEWSDESK_DB_MAX_CONNECTIONS` - Pool size (default: 10)
//! - `NEWSDESK_JWT_ISSUER` - Token issuer (default: newsdesk)
//! - `NEWSDESK_JWT_AUDIENCE` - Token audience (default: newsdesk)
//! - `NEWSDESK_TOKEN_TTL_HOURS` - Token lifetime in hours (default: 168, seven days)
//! - `NEWSDESK_ADMIN_NAME` - Display name of the configured administrator (default: Administrator)
//! - `NEWSDESK_CORS_ORIGINS` - Comma-separated allowed origins (default: any)
//! - `NEWSDESK_LOG_FORMAT` - `json` for structured logs, anything else for pretty output
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sentry sample rates (default: 1.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use chrono::Duration;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use newsdesk_core::Email;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24 * 7;
const DEFAULT_ADMIN_NAME: &str = "Administrator";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `SQLite` database connection URL
    pub database_url: SecretString,
    /// Maximum number of pooled database connections
    pub db_max_connections: u32,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Bearer token settings
    pub jwt: JwtConfig,
    /// The administrator identity that lives in configuration, not in the database
    pub admin: ConfiguredAdmin,
    /// Allowed CORS origins; empty means any origin
    pub cors_origins: Vec<String>,
    /// Emit JSON logs instead of pretty output
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Bearer token configuration.
///
/// Implements `Debug` manually to redact the signing secret.
#[derive(Clone)]
pub struct JwtConfig {
    /// HS256 signing secret
    pub secret: SecretString,
    /// `iss` claim written and required on every token
    pub issuer: String,
    /// `aud` claim written and required on every token
    pub audience: String,
    /// Token lifetime
    pub ttl: Duration,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Administrator identity defined by deployment configuration.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct ConfiguredAdmin {
    /// Sign-in email, matched case-insensitively
    pub email: Email,
    /// Sign-in password, matched exactly
    pub password: SecretString,
    /// Display name returned by the profile endpoint
    pub name: String,
}

impl std::fmt::Debug for ConfiguredAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfiguredAdmin")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("name", &self.name)
            .finish()
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("NEWSDESK_DATABASE_URL")?;
        let db_max_connections = parse_env("NEWSDESK_DB_MAX_CONNECTIONS", "10")?;
        let host = parse_env("NEWSDESK_HOST", "127.0.0.1")?;
        let port = parse_env("NEWSDESK_PORT", "3000")?;

        let jwt = JwtConfig::from_env()?;
        let admin = ConfiguredAdmin::from_env()?;

        let cors_origins = get_optional_env("NEWSDESK_CORS_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .unwrap_or_default();
        let log_json = get_optional_env("NEWSDESK_LOG_FORMAT")
            .is_some_and(|format| format.eq_ignore_ascii_case("json"));

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            db_max_connections,
            host,
            port,
            jwt,
            admin,
            cors_origins,
            log_json,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = get_validated_secret("NEWSDESK_JWT_SECRET")?;
        validate_secret_length(&secret, "NEWSDESK_JWT_SECRET")?;

        let ttl_hours: i64 = parse_env(
            "NEWSDESK_TOKEN_TTL_HOURS",
            &DEFAULT_TOKEN_TTL_HOURS.to_string(),
        )?;
        if ttl_hours <= 0 {
            return Err(ConfigError::InvalidEnvVar(
                "NEWSDESK_TOKEN_TTL_HOURS".to_string(),
                "must be a positive number of hours".to_string(),
            ));
        }

        Ok(Self {
            secret,
            issuer: get_env_or_default("NEWSDESK_JWT_ISSUER", "newsdesk"),
            audience: get_env_or_default("NEWSDESK_JWT_AUDIENCE", "newsdesk"),
            ttl: Duration::hours(ttl_hours),
        })
    }
}

impl ConfiguredAdmin {
    fn from_env() -> Result<Self, ConfigError> {
        let raw_email = get_required_env("NEWSDESK_ADMIN_EMAIL")?;
        let email = Email::parse(&raw_email).map_err(|e| {
            ConfigError::InvalidEnvVar("NEWSDESK_ADMIN_EMAIL".to_string(), e.to_string())
        })?;

        let password = get_required_env("NEWSDESK_ADMIN_PASSWORD")?;
        if password.is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "NEWSDESK_ADMIN_PASSWORD".to_string(),
                "cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            email,
            password: SecretString::from(password),
            name: get_env_or_default("NEWSDESK_ADMIN_NAME", DEFAULT_ADMIN_NAME),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL` (what sqlx tooling reads).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Split a comma-separated origin list, dropping blanks.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

/// Validate that a signing secret meets minimum length requirements.
fn validate_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
