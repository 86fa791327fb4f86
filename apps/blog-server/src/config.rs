//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use blog_infra::auth::{DEFAULT_SECRET, JwtConfig};
#[cfg(feature = "postgres")]
use blog_infra::database::DatabaseConfig;

use crate::telemetry::TelemetryConfig;

/// Longest session lifetime accepted from `JWT_EXPIRATION_HOURS` (one year).
const MAX_SESSION_HOURS: i64 = 24 * 365;

/// Session cookie settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    /// Mark the cookie `Secure` (HTTPS only).
    pub secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "blog_session".to_string(),
            secure: false,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    /// Apply pending migrations before serving.
    pub auto_migrate: bool,
    pub jwt: JwtConfig,
    pub session: SessionConfig,
    pub telemetry: TelemetryConfig,
    pub production: bool,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        #[cfg(feature = "postgres")]
        let database = lookup("DATABASE_URL").map(|url| DatabaseConfig {
            url,
            max_connections: parsed(&lookup, "DB_MAX_CONNECTIONS", 10),
            min_connections: parsed(&lookup, "DB_MIN_CONNECTIONS", 1),
        });

        let jwt = JwtConfig {
            secret: lookup("JWT_SECRET").unwrap_or_else(|| DEFAULT_SECRET.to_string()),
            expiration_hours: parsed(&lookup, "JWT_EXPIRATION_HOURS", 24_i64)
                .clamp(1, MAX_SESSION_HOURS),
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "blog".to_string()),
        };

        let session = SessionConfig {
            secure: flag(&lookup, "SESSION_COOKIE_SECURE", false),
            ..SessionConfig::default()
        };

        Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parsed(&lookup, "PORT", 8080),
            #[cfg(feature = "postgres")]
            database,
            auto_migrate: flag(&lookup, "AUTO_MIGRATE", false),
            jwt,
            session,
            telemetry: TelemetryConfig::from_lookup(&lookup),
            production: lookup("RUST_ENV")
                .map(|v| v == "production" || v == "prod")
                .unwrap_or(false),
        }
    }

    /// Log configuration that is unsafe outside development.
    /// Call after telemetry is initialized.
    pub fn warn_insecure_defaults(&self) {
        if self.jwt.uses_default_secret() {
            if self.production {
                tracing::error!(
                    "SECURITY: Using default JWT secret in production! Set JWT_SECRET environment variable."
                );
            } else {
                tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
            }
        }
        if self.production && !self.session.secure {
            tracing::warn!("Session cookie is not marked Secure. Set SESSION_COOKIE_SECURE=true.");
        }
    }
}

/// Parse `key`, falling back to `default` when unset or malformed.
pub(crate) fn parsed<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key).and_then(|s| s.parse().ok()).unwrap_or(default)
}

/// Boolean switch: `false`/`0` disable, anything else set enables.
pub(crate) fn flag<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "no" | ""))
        .unwrap_or(default)
}
