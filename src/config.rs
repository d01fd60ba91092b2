//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Maximum number of stored keys, 0 = unbounded
    pub lru_depth: usize,
    /// Directory holding `users.dat`
    pub users_path: PathBuf,
    /// Secret used to sign bearer tokens
    pub jwt_secret: String,
    /// Lifetime of issued bearer tokens in minutes
    pub token_expiration_minutes: i64,
    /// Delay between the store stopping and the server being told to close
    pub shutdown_grace_ms: u64,
    /// Optional directory for a `store.log` file next to console output
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `LRU_DEPTH` - Maximum stored keys, 0 for unbounded (default: 0)
    /// - `USERS_PATH` - User database directory (default: cache)
    /// - `JWT_SECRET` - Token signing secret (default: my_secret_key)
    /// - `TOKEN_EXPIRATION_MINUTES` - Token lifetime (default: 30)
    /// - `SHUTDOWN_GRACE_MS` - Shutdown grace period (default: 500)
    /// - `LOG_DIR` - Directory for store.log (default: unset, console only)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            lru_depth: parse_var("LRU_DEPTH").unwrap_or(defaults.lru_depth),
            users_path: env::var("USERS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.users_path),
            jwt_secret: env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            token_expiration_minutes: parse_var("TOKEN_EXPIRATION_MINUTES")
                .unwrap_or(defaults.token_expiration_minutes),
            shutdown_grace_ms: parse_var("SHUTDOWN_GRACE_MS")
                .unwrap_or(defaults.shutdown_grace_ms),
            log_dir: env::var("LOG_DIR").ok().map(PathBuf::from),
        }
    }

    /// Shutdown grace period as a Duration.
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8080,
            lru_depth: 0,
            users_path: PathBuf::from("cache"),
            jwt_secret: "my_secret_key".to_string(),
            token_expiration_minutes: 30,
            shutdown_grace_ms: 500,
            log_dir: None,
        }
    }
}
