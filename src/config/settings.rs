//! Application settings loaded from environment variables.

use std::env;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, DEFAULT_SESSION_TTL_DAYS,
    MAX_SESSION_TTL_DAYS, MIN_SESSION_SECRET_LENGTH,
};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    session_secret: String,
    pub session_ttl_days: i64,
    pub session_cookie_secure: bool,
    pub server_host: String,
    pub server_port: u16,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("session_secret", &"[REDACTED]")
            .field("session_ttl_days", &self.session_ttl_days)
            .field("session_cookie_secure", &self.session_cookie_secure)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if SESSION_SECRET is not set in release builds, or is too short.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let session_secret = env::var("SESSION_SECRET").unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                tracing::warn!("SESSION_SECRET not set, using insecure default for development");
                "dev-session-secret-minimum-32-chars!".to_string()
            } else {
                panic!("SESSION_SECRET environment variable must be set in production");
            }
        });

        if session_secret.len() < MIN_SESSION_SECRET_LENGTH {
            panic!(
                "SESSION_SECRET must be at least {} characters long",
                MIN_SESSION_SECRET_LENGTH
            );
        }

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            session_secret,
            session_ttl_days: parse_session_ttl_days(env::var("SESSION_TTL_DAYS").ok().as_deref()),
            session_cookie_secure: env::var("SESSION_COOKIE_SECURE")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
        }
    }

    /// Build a configuration directly, bypassing the environment.
    ///
    /// Used by tests and embedding callers. The secret is not length-checked here.
    pub fn new(database_url: impl Into<String>, session_secret: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            session_secret: session_secret.into(),
            session_ttl_days: DEFAULT_SESSION_TTL_DAYS,
            session_cookie_secure: false,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
        }
    }

    /// Get session secret bytes for cookie signing/verification.
    pub fn session_secret_bytes(&self) -> &[u8] {
        self.session_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Parse `SESSION_TTL_DAYS`.
///
/// Missing, unparseable and non-positive values fall back to the default.
/// Values above `MAX_SESSION_TTL_DAYS` are capped.
fn parse_session_ttl_days(raw: Option<&str>) -> i64 {
    let Some(days) = raw
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|days| *days > 0)
    else {
        return DEFAULT_SESSION_TTL_DAYS;
    };

    if days > MAX_SESSION_TTL_DAYS {
        tracing::warn!(
            requested = days,
            max = MAX_SESSION_TTL_DAYS,
            "SESSION_TTL_DAYS too large, capping"
        );
        return MAX_SESSION_TTL_DAYS;
    }

    days
}
