//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MISE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `MISE_JWT_SECRET` - Token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `MISE_HOST` - Bind address (default: 127.0.0.1)
//! - `MISE_PORT` - Listen port (default: 3000)
//! - `MISE_JWT_TTL_MINUTES` - Token lifetime (default: 720)
//! - `MISE_JWT_ISSUER` - Token issuer claim (default: mise)
//! - `MISE_CORS_ORIGINS` - Comma separated list of allowed browser origins
//! - `MISE_LOG_JSON` - Emit JSON logs when set to `1` or `true`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - 0.0 to 1.0
//!
//! ## Optional (TLS)
//! - `MISE_TLS_CERT` - PEM-encoded certificate chain
//! - `MISE_TLS_KEY` - PEM-encoded private key

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_JWT_TTL_MINUTES: i64 = 720;
const DEFAULT_JWT_ISSUER: &str = "mise";

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

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Bearer token settings
    pub jwt: JwtConfig,
    /// Browser origins allowed to call the API; empty disables CORS headers
    pub cors_origins: Vec<String>,
    /// Emit JSON formatted logs
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
    /// TLS configuration for HTTPS (optional)
    pub tls: Option<TlsConfig>,
}

/// Bearer token configuration.
///
/// Implements `Debug` manually to redact the signing secret.
#[derive(Clone)]
pub struct JwtConfig {
    /// HMAC signing secret
    pub secret: SecretString,
    /// Token lifetime in minutes
    pub ttl_minutes: i64,
    /// `iss` claim written to and required on every token
    pub issuer: String,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("ttl_minutes", &self.ttl_minutes)
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = get_signing_secret("MISE_JWT_SECRET")?;

        let ttl_minutes = get_env_or_default(
            "MISE_JWT_TTL_MINUTES",
            &DEFAULT_JWT_TTL_MINUTES.to_string(),
        )
        .parse::<i64>()
        .map_err(|e| ConfigError::InvalidEnvVar("MISE_JWT_TTL_MINUTES".to_string(), e.to_string()))?;
        if ttl_minutes <= 0 {
            return Err(ConfigError::InvalidEnvVar(
                "MISE_JWT_TTL_MINUTES".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            secret,
            ttl_minutes,
            issuer: get_env_or_default("MISE_JWT_ISSUER", DEFAULT_JWT_ISSUER),
        })
    }
}

/// TLS configuration for HTTPS.
#[derive(Clone)]
pub struct TlsConfig {
    /// PEM-encoded certificate chain
    pub cert_pem: String,
    /// PEM-encoded private key
    pub key_pem: SecretString,
}

impl std::fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsConfig")
            .field("cert_pem", &"[CERTIFICATE]")
            .field("key_pem", &"[REDACTED]")
            .finish()
    }
}

impl TlsConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let cert_pem = get_optional_env("MISE_TLS_CERT");
        let key_pem = get_optional_env("MISE_TLS_KEY");

        match (cert_pem, key_pem) {
            (Some(cert), Some(key)) => Ok(Some(Self {
                cert_pem: cert,
                key_pem: SecretString::from(key),
            })),
            (None, None) => Ok(None),
            _ => Err(ConfigError::InvalidEnvVar(
                "MISE_TLS_*".to_string(),
                "Both MISE_TLS_CERT and MISE_TLS_KEY must be set together".to_string(),
            )),
        }
    }
}

impl ServerConfig {
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

        let database_url = get_database_url("MISE_DATABASE_URL")?;
        let host = get_env_or_default("MISE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("MISE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("MISE_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("MISE_PORT".to_string(), e.to_string()))?;
        let jwt = JwtConfig::from_env()?;
        let cors_origins = parse_origins(&get_env_or_default("MISE_CORS_ORIGINS", ""));
        let log_json = get_optional_env("MISE_LOG_JSON").is_some_and(|v| parse_flag(&v));

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.1);
        let tls = TlsConfig::from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            jwt,
            cors_origins,
            log_json,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
            tls,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Load only the database URL, for tools that do not serve HTTP.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if neither `MISE_DATABASE_URL` nor
/// `DATABASE_URL` is set.
pub fn database_url_from_env() -> Result<SecretString, ConfigError> {
    let _ = dotenvy::dotenv();
    get_database_url("MISE_DATABASE_URL")
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
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
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Split a comma separated origin list, dropping blanks and trailing slashes.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

/// Bits of information per character, from character frequencies.
fn bits_per_char(s: &str) -> f64 {
    let mut counts: HashMap<char, u32> = HashMap::new();
    let mut total = 0_u32;
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }

    let total = f64::from(total);
    counts
        .values()
        .map(|&count| {
            let p = f64::from(count) / total;
            -p * p.log2()
        })
        .sum()
}

/// Reject signing secrets that are short, look like a placeholder, or are
/// too repetitive to be random.
fn check_signing_secret(key: &str, value: &str) -> Result<(), ConfigError> {
    let insecure = |reason: String| -> Result<(), ConfigError> {
        Err(ConfigError::InsecureSecret(key.to_string(), reason))
    };

    let length = value.chars().count();
    if length < MIN_JWT_SECRET_LENGTH {
        return insecure(format!(
            "must be at least {MIN_JWT_SECRET_LENGTH} characters (got {length})"
        ));
    }

    let lower = value.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(**p)) {
        return insecure(format!("looks like a placeholder (contains '{pattern}')"));
    }

    let entropy = bits_per_char(value);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return insecure(format!(
            "too repetitive ({entropy:.2} bits/char, need {MIN_ENTROPY_BITS_PER_CHAR:.1}); generate it randomly"
        ));
    }

    Ok(())
}

/// Load a signing secret and check it.
fn get_signing_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    check_signing_secret(key, &value)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const KEY: &str = "MISE_JWT_SECRET";

    #[test]
    fn test_bits_per_char() {
        assert!(bits_per_char("").abs() < f64::EPSILON);
        assert!(bits_per_char("aaaaaaa").abs() < f64::EPSILON);
        assert!((bits_per_char("abab") - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_signing_secret_too_short() {
        assert!(matches!(
            check_signing_secret(KEY, "aB3$xY9!"),
            Err(ConfigError::InsecureSecret(_, _))
        ));
    }

    #[test]
    fn test_signing_secret_placeholder() {
        let err = check_signing_secret(KEY, "your-signing-key-goes-here-0123456789").unwrap_err();
        assert!(err.to_string().contains("placeholder"));
        assert!(check_signing_secret(KEY, "CHANGEME-q8Vf3nL0pZ7xW2rT9yK4mB6cH1").is_err());
    }

    #[test]
    fn test_signing_secret_repetitive() {
        let err = check_signing_secret(KEY, &"ab".repeat(20)).unwrap_err();
        assert!(err.to_string().contains("repetitive"));
    }

    #[test]
    fn test_signing_secret_accepts_random() {
        assert!(check_signing_secret(KEY, "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%").is_ok());
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins(" https://ops.example.org/ ,,http://localhost:5173"),
            vec!["https://ops.example.org", "http://localhost:5173"]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag("TRUE"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("nope"));
    }

    #[test]
    fn test_jwt_config_debug_redacts_secret() {
        let config = JwtConfig {
            secret: SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6"),
            ttl_minutes: 60,
            issuer: "mise".to_string(),
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("aB3$"));
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            database_url: SecretString::from("postgres://localhost/mise"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            jwt: JwtConfig {
                secret: SecretString::from("k".repeat(32)),
                ttl_minutes: DEFAULT_JWT_TTL_MINUTES,
                issuer: DEFAULT_JWT_ISSUER.to_string(),
            },
            cors_origins: Vec::new(),
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
            tls: None,
        };
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
    }
}
