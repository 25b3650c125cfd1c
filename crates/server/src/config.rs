//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ACCESS_TOKEN_SECRET` - Session token signing secret (min 32 chars, high entropy)
//! - `DB_USER` - Database user (unless `DATABASE_URL` is set or the memory store is used)
//! - `DB_PASS` - Database password (same conditions as `DB_USER`)
//!
//! ## Optional
//! - `DATABASE_URL` - Full `PostgreSQL` connection string, overrides the `DB_*` parts
//! - `DB_HOST` - Database host (default: localhost)
//! - `DB_PORT` - Database port (default: 5432)
//! - `DB_NAME` - Database name (default: `contest_db`)
//! - `CONTEST_STORE` - Document store backend, `postgres` or `memory` (default: postgres)
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 5000)
//! - `APP_ENV` - `production` or `development` (default: development)
//! - `CORS_ORIGIN` - The single origin allowed to call the API (default: <http://localhost:5173>)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderValue;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_TOKEN_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
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

/// Deployment environment.
///
/// Only controls the flags on the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" | "test" => Ok(Self::Development),
            other => Err(ConfigError::InvalidEnvVar(
                "APP_ENV".to_string(),
                format!("expected production or development, got {other:?}"),
            )),
        }
    }

    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Where the `PostgreSQL` document store lives.
///
/// Implements `Debug` manually to redact credentials.
#[derive(Clone)]
pub enum DatabaseConfig {
    /// A complete connection string.
    Url(SecretString),
    /// Individual connection parts.
    Parts {
        host: String,
        port: u16,
        name: String,
        user: String,
        password: SecretString,
    },
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(_) => f.debug_tuple("Url").field(&"[REDACTED]").finish(),
            Self::Parts {
                host,
                port,
                name,
                user,
                ..
            } => f
                .debug_struct("Parts")
                .field("host", host)
                .field("port", port)
                .field("name", name)
                .field("user", user)
                .field("password", &"[REDACTED]")
                .finish(),
        }
    }
}

/// Which document store backend to use.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    Postgres(DatabaseConfig),
    /// Process-local store for development; data is lost on restart.
    Memory,
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Document store backend
    pub store: StoreConfig,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// The one origin allowed to make credentialed cross-origin requests
    pub cors_origin: HeaderValue,
    /// Session token signing secret
    pub token_secret: SecretString,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the token secret fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ServerConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(&lookup);

        let store = match vars.or_default("CONTEST_STORE", "postgres").as_str() {
            "postgres" => StoreConfig::Postgres(database_config(&vars)?),
            "memory" => StoreConfig::Memory,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "CONTEST_STORE".to_string(),
                    format!("expected postgres or memory, got {other:?}"),
                ));
            }
        };

        let host = vars
            .or_default("HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_string(), e.to_string()))?;
        let port = vars
            .or_default("PORT", "5000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;
        let environment = Environment::parse(&vars.or_default("APP_ENV", "development"))?;
        let cors_origin = HeaderValue::from_str(&vars.or_default(
            "CORS_ORIGIN",
            "http://localhost:5173",
        ))
        .map_err(|e| ConfigError::InvalidEnvVar("CORS_ORIGIN".to_string(), e.to_string()))?;

        let token_secret = vars.validated_secret("ACCESS_TOKEN_SECRET")?;
        validate_token_secret(&token_secret, "ACCESS_TOKEN_SECRET")?;

        Ok(Self {
            store,
            host,
            port,
            environment,
            cors_origin,
            token_secret,
            sentry_dsn: vars.optional("SENTRY_DSN"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl DatabaseConfig {
    /// Load only the database connection settings.
    ///
    /// Used by tooling that talks to the store without serving requests.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `DB_USER`/`DB_PASS` are missing (and no
    /// `DATABASE_URL` is set) or `DB_PORT` is not a port number.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the database settings through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`DatabaseConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        database_config(&Vars(&lookup))
    }
}

fn database_config(vars: &Vars<'_>) -> Result<DatabaseConfig, ConfigError> {
    if let Some(url) = vars.optional("DATABASE_URL") {
        return Ok(DatabaseConfig::Url(SecretString::from(url)));
    }

    let port = vars
        .or_default("DB_PORT", "5432")
        .parse::<u16>()
        .map_err(|e| ConfigError::InvalidEnvVar("DB_PORT".to_string(), e.to_string()))?;

    Ok(DatabaseConfig::Parts {
        host: vars.or_default("DB_HOST", "localhost"),
        port,
        name: vars.or_default("DB_NAME", "contest_db"),
        user: vars.required("DB_USER")?,
        password: SecretString::from(vars.required("DB_PASS")?),
    })
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup with the usual required/optional/default accessors.
struct Vars<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Vars<'_> {
    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        (self.0)(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional variable.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        (self.0)(key).unwrap_or_else(|| default.to_string())
    }

    /// Load and validate a secret.
    fn validated_secret(&self, key: &str) -> Result<SecretString, ConfigError> {
        let value = self.required(key)?;
        validate_secret_strength(&value, key)?;
        Ok(SecretString::from(value))
    }
}

/// Validate that a token secret meets minimum length requirements.
fn validate_token_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_TOKEN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_TOKEN_SECRET_LENGTH,
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
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
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
