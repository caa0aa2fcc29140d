//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `RESTCTL_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `RESTCTL_` override YAML values
//! 3. **DATABASE_URL** - Special case: overrides `database.url` if set
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `RESTCTL_AUTH__LOCKOUT__MAX_FAILURES=5` sets the `auth.lockout.max_failures` field.
//!
//! ## Configuration Structure
//!
//! - **Server**: `host`, `port` - HTTP server binding configuration
//! - **Database**: `database.url`, `database.pool` - SQLite connection settings
//! - **Root User**: `admin_username`, `admin_email`, `admin_password` - Initial root user
//! - **Security**: `secret_key`, `auth.security` - JWT signing and CORS settings
//! - **Lockout**: `auth.lockout.max_failures` - Failed logins before an account is locked
//! - **Request logging**: `request_logging` - Audit log toggles, exclusions and retention
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! # Override server port
//! RESTCTL_PORT=8080
//!
//! # Set database connection (preferred method)
//! DATABASE_URL="sqlite://restctl.db?mode=rwc"
//!
//! # Override nested values
//! RESTCTL_REQUEST_LOGGING__ENABLED=false
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::errors::Error;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "RESTCTL_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// All fields have defaults defined in the `Default` implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Set from the DATABASE_URL environment variable, folded into `database.url` on load
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    /// Database connection settings
    pub database: DatabaseConfig,
    /// Username of the initial root user
    pub admin_username: String,
    /// Email address of the initial root user
    pub admin_email: String,
    /// Password of the initial root user. No root user is created when unset.
    pub admin_password: Option<String>,
    /// Secret key for JWT signing (required)
    pub secret_key: Option<String>,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Request and login audit logging
    pub request_logging: RequestLoggingConfig,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// SQLite connection string, e.g. `sqlite://restctl.db?mode=rwc`
    pub url: String,
    pub pool: PoolSettings,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://restctl.db?mode=rwc".to_string(),
            pool: PoolSettings::default(),
        }
    }
}

/// Connection pool settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolSettings {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections to maintain
    pub min_connections: u32,
    /// Maximum time to wait for a connection (seconds)
    pub acquire_timeout_secs: u64,
    /// Time before idle connections are closed (seconds, 0 = never)
    pub idle_timeout_secs: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 0,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    pub security: SecurityConfig,
    pub password: PasswordConfig,
    pub lockout: LockoutConfig,
}

/// Security configuration for JWT and CORS.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecurityConfig {
    /// JWT token expiry duration
    #[serde(with = "humantime_serde")]
    pub jwt_expiry: Duration,
    /// CORS configuration for browser clients
    pub cors: CorsConfig,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_expiry: Duration::from_secs(60 * 60),
            cors: CorsConfig::default(),
        }
    }
}

/// Password hashing and validation rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasswordConfig {
    /// Minimum password length
    pub min_length: usize,
    /// Argon2 memory cost in KiB
    pub argon2_memory_kib: u32,
    /// Argon2 iterations
    pub argon2_iterations: u32,
    /// Argon2 parallelism
    pub argon2_parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 8,
            argon2_memory_kib: 19456,
            argon2_iterations: 2,
            argon2_parallelism: 1,
        }
    }
}

/// Account lockout after repeated failed logins.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LockoutConfig {
    /// Number of recorded failures that locks the account (0 disables locking)
    pub max_failures: u32,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self { max_failures: 10 }
    }
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests
    pub allowed_origins: Vec<CorsOrigin>,
    /// Allow credentials in CORS requests
    pub allow_credentials: bool,
    /// Cache preflight requests for this many seconds
    pub max_age: Option<u64>,
    /// Custom headers to expose to the browser
    pub exposed_headers: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![CorsOrigin::Wildcard],
            allow_credentials: false,
            max_age: Some(3600),
            exposed_headers: vec!["x-api-version".to_string()],
        }
    }
}

/// An allowed CORS origin: `*` or an absolute URL such as `https://app.example.com`.
#[derive(Debug, Clone)]
pub enum CorsOrigin {
    Wildcard,
    Url(Url),
}

impl<'de> Deserialize<'de> for CorsOrigin {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == "*" {
            return Ok(CorsOrigin::Wildcard);
        }
        Url::parse(&raw).map(CorsOrigin::Url).map_err(serde::de::Error::custom)
    }
}

impl Serialize for CorsOrigin {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CorsOrigin::Wildcard => serializer.serialize_str("*"),
            CorsOrigin::Url(url) => serializer.serialize_str(url.as_str()),
        }
    }
}

/// Request and login audit logging.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RequestLoggingConfig {
    /// Persist a row in `log_requests` for every handled request
    pub enabled: bool,
    /// Path prefixes that are never logged
    pub ignored_routes: Vec<String>,
    /// Request bodies longer than this many characters are truncated before storage
    pub max_content_length: usize,
    /// Log rows older than this are removed by the cleanup task
    #[serde(with = "humantime_serde")]
    pub retention: Duration,
    /// How often the cleanup task runs
    #[serde(with = "humantime_serde")]
    pub cleanup_interval: Duration,
}

impl Default for RequestLoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ignored_routes: vec!["/healthz".to_string(), "/version".to_string(), "/docs".to_string()],
            max_content_length: 4096,
            retention: Duration::from_secs(90 * 24 * 60 * 60),
            cleanup_interval: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            database_url: None,
            database: DatabaseConfig::default(),
            admin_username: "root".to_string(),
            admin_email: "root@localhost".to_string(),
            admin_password: None,
            secret_key: None,
            auth: AuthConfig::default(),
            request_logging: RequestLoggingConfig::default(),
            enable_otel_export: false,
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let mut config: Self = Self::figment(args).extract()?;

        if let Some(url) = config.database_url.take() {
            config.database.url = url;
        }

        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Check the configuration for missing or inconsistent values, reporting every problem found.
    pub fn validate(&self) -> Result<(), Error> {
        let problems = self.problems();
        if problems.is_empty() {
            return Ok(());
        }

        Err(Error::Internal {
            operation: format!("validate configuration: {}", problems.join("; ")),
        })
    }

    fn problems(&self) -> Vec<&'static str> {
        const MIN_JWT_EXPIRY: Duration = Duration::from_secs(5 * 60);
        const MAX_JWT_EXPIRY: Duration = Duration::from_secs(30 * 24 * 60 * 60);

        let security = &self.auth.security;
        let mut problems = Vec::new();

        if self.secret_key.as_deref().is_none_or(str::is_empty) {
            problems.push("secret_key is not configured, set RESTCTL_SECRET_KEY or add secret_key to the config file");
        }
        if self.auth.password.min_length == 0 {
            problems.push("auth.password.min_length must be at least 1");
        }
        if security.jwt_expiry < MIN_JWT_EXPIRY {
            problems.push("auth.security.jwt_expiry is too short (minimum 5 minutes)");
        }
        if security.jwt_expiry > MAX_JWT_EXPIRY {
            problems.push("auth.security.jwt_expiry is too long (maximum 30 days)");
        }
        if security.cors.allowed_origins.is_empty() {
            problems.push("auth.security.cors.allowed_origins needs at least one origin");
        }
        if security.cors.allow_credentials && security.cors.allowed_origins.iter().any(|o| matches!(o, CorsOrigin::Wildcard)) {
            problems.push("auth.security.cors cannot combine the wildcard origin '*' with allow_credentials");
        }
        if self.request_logging.cleanup_interval.is_zero() {
            problems.push("request_logging.cleanup_interval must be positive");
        }

        problems
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can override specific values
            .merge(Env::prefixed("RESTCTL_").split("__"))
            .merge(Env::raw().only(&["DATABASE_URL"]))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn args(path: &str) -> Args {
        Args {
            config: path.to_string(),
            validate: false,
        }
    }

    #[test]
    fn test_yaml_config() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
secret_key: hello
port: 9000
admin_username: boss
request_logging:
  ignored_routes: ["/healthz"]
  retention: 7d
auth:
  lockout:
    max_failures: 3
"#,
            )?;

            let config = Config::load(&args("test.yaml"))?;

            assert_eq!(config.port, 9000);
            assert_eq!(config.admin_username, "boss");
            assert_eq!(config.request_logging.ignored_routes, vec!["/healthz".to_string()]);
            assert_eq!(config.request_logging.retention, Duration::from_secs(7 * 24 * 60 * 60));
            // Untouched values keep their defaults
            assert_eq!(config.request_logging.max_content_length, 4096);
            assert_eq!(config.auth.lockout.max_failures, 3);
            assert_eq!(config.auth.security.jwt_expiry, Duration::from_secs(3600));

            Ok(())
        });
    }

    #[test]
    fn test_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file("test.yaml", "secret_key: hello\nport: 9000\n")?;

            jail.set_env("RESTCTL_HOST", "127.0.0.1");
            jail.set_env("RESTCTL_PORT", "8080");
            jail.set_env("RESTCTL_AUTH__SECURITY__JWT_EXPIRY", "2h");
            jail.set_env("DATABASE_URL", "sqlite://other.db");

            let config = Config::load(&args("test.yaml"))?;

            assert_eq!(config.host, "127.0.0.1");
            assert_eq!(config.port, 8080);
            assert_eq!(config.auth.security.jwt_expiry, Duration::from_secs(2 * 60 * 60));
            assert_eq!(config.database.url, "sqlite://other.db");
            assert!(config.database_url.is_none());

            Ok(())
        });
    }

    #[test]
    fn test_unknown_fields_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("test.yaml", "secret_key: hello\nnot_a_field: 1\n")?;

            assert!(Config::load(&args("test.yaml")).is_err());
            Ok(())
        });
    }

    #[test]
    fn test_cors_origins_parse() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
secret_key: hello
auth:
  security:
    cors:
      allowed_origins: ["*", "https://app.example.com"]
"#,
            )?;

            let config = Config::load(&args("test.yaml"))?;
            let origins = &config.auth.security.cors.allowed_origins;
            assert!(matches!(origins[0], CorsOrigin::Wildcard));
            assert!(matches!(&origins[1], CorsOrigin::Url(url) if url.as_str() == "https://app.example.com/"));

            Ok(())
        });
    }

    #[test]
    fn test_config_validation_missing_secret() {
        let config = Config::default();

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("secret_key is not configured"));
    }

    #[test]
    fn test_config_validation_jwt_expiry_bounds() {
        let mut config = Config {
            secret_key: Some("test-key".to_string()),
            ..Default::default()
        };

        config.auth.security.jwt_expiry = Duration::from_secs(60);
        assert!(config.validate().unwrap_err().to_string().contains("too short"));

        config.auth.security.jwt_expiry = Duration::from_secs(86400 * 31);
        assert!(config.validate().unwrap_err().to_string().contains("too long"));
    }

    #[test]
    fn test_config_validation_wildcard_with_credentials() {
        let mut config = Config {
            secret_key: Some("test-key".to_string()),
            ..Default::default()
        };
        config.auth.security.cors.allow_credentials = true;

        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("wildcard"));
    }

    #[test]
    fn test_config_validation_reports_every_problem() {
        let mut config = Config::default();
        config.auth.security.cors.allowed_origins.clear();

        let message = config.validate().unwrap_err().to_string();
        assert!(message.contains("secret_key"));
        assert!(message.contains("allowed_origins"));
    }

    #[test]
    fn test_invalid_cors_origin_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                "secret_key: hello\nauth:\n  security:\n    cors:\n      allowed_origins: [\"not a url\"]\n",
            )?;

            assert!(Config::load(&args("test.yaml")).is_err());
            Ok(())
        });
    }

    #[test]
    fn test_config_validation_valid_config() {
        let config = Config {
            secret_key: Some("test-secret-key".to_string()),
            ..Default::default()
        };

        assert!(config.validate().is_ok());
    }
}
