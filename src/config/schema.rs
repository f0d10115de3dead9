//! Configuration schema definitions

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Upper bound for `auth.token_ttl_hours` (ten years)
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365 * 10;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,
}

impl Config {
    /// Reject values that parse but cannot be used
    pub fn validate(&self) -> Result<()> {
        self.auth.validate()
    }
}

/// Server configuration for the HTTP API and views
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    4173
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Session and token settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Lifetime of an issued token
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,

    /// Simulated latency of the credential check
    #[serde(default = "default_login_latency_ms")]
    pub login_latency_ms: u64,

    /// Persistent storage key holding the token
    #[serde(default = "default_token_key")]
    pub token_key: String,

    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Where authenticated users land after a role mismatch
    #[serde(default = "default_landing_path")]
    pub landing_path: String,
}

fn default_token_ttl_hours() -> i64 {
    24
}

fn default_login_latency_ms() -> u64 {
    500
}

fn default_token_key() -> String {
    "auth_token".to_string()
}

fn default_login_path() -> String {
    "/login".to_string()
}

fn default_landing_path() -> String {
    "/dashboard".to_string()
}

impl AuthConfig {
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&self.token_ttl_hours) {
            return Err(Error::Config(format!(
                "auth.token_ttl_hours must be between 1 and {}, got {}",
                MAX_TOKEN_TTL_HOURS, self.token_ttl_hours
            )));
        }
        Ok(())
    }

    pub fn token_ttl(&self) -> Result<chrono::Duration> {
        self.validate()?;
        chrono::TimeDelta::try_hours(self.token_ttl_hours)
            .ok_or_else(|| Error::Config("auth.token_ttl_hours is out of range".to_string()))
    }

    /// Cookie `Max-Age` matching the token lifetime; 0 when the TTL is unusable
    pub fn token_max_age_secs(&self) -> i64 {
        self.token_ttl().map_or(0, |ttl| ttl.num_seconds())
    }

    pub fn login_latency(&self) -> Duration {
        Duration::from_millis(self.login_latency_ms)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl_hours: default_token_ttl_hours(),
            login_latency_ms: default_login_latency_ms(),
            token_key: default_token_key(),
            login_path: default_login_path(),
            landing_path: default_landing_path(),
        }
    }
}

/// Persistent key-value storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from(".leap/local_storage.json")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

/// Toast notification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Broadcast channel capacity; slow subscribers drop the oldest toasts
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    #[serde(default = "default_success_ms")]
    pub success_ms: u64,

    #[serde(default = "default_info_ms")]
    pub info_ms: u64,

    #[serde(default = "default_warning_ms")]
    pub warning_ms: u64,

    #[serde(default = "default_error_ms")]
    pub error_ms: u64,
}

fn default_capacity() -> usize {
    64
}

fn default_success_ms() -> u64 {
    3000
}

fn default_info_ms() -> u64 {
    3000
}

fn default_warning_ms() -> u64 {
    4000
}

fn default_error_ms() -> u64 {
    5000
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            success_ms: default_success_ms(),
            info_ms: default_info_ms(),
            warning_ms: default_warning_ms(),
            error_ms: default_error_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 4173);
        assert_eq!(config.auth.token_key, "auth_token");
        assert_eq!(config.auth.token_ttl_hours, 24);
        assert_eq!(config.auth.login_latency(), Duration::from_millis(500));
        assert_eq!(config.auth.landing_path, "/dashboard");
        assert_eq!(config.notifications.error_ms, 5000);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [auth]
            login_latency_ms = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.auth.login_latency_ms, 0);
        assert_eq!(config.auth.login_path, "/login");
        assert_eq!(config.auth.token_ttl().unwrap(), chrono::Duration::hours(24));
        assert_eq!(config.auth.token_max_age_secs(), 24 * 60 * 60);
    }

    #[test]
    fn test_token_ttl_bounds() {
        for hours in [0, -1, MAX_TOKEN_TTL_HOURS + 1, 10_000_000_000, i64::MAX] {
            let auth = AuthConfig {
                token_ttl_hours: hours,
                ..AuthConfig::default()
            };
            assert!(matches!(auth.validate(), Err(Error::Config(_))), "{}", hours);
            assert!(auth.token_ttl().is_err());
            assert_eq!(auth.token_max_age_secs(), 0);
        }

        for hours in [1, 24, MAX_TOKEN_TTL_HOURS] {
            let auth = AuthConfig {
                token_ttl_hours: hours,
                ..AuthConfig::default()
            };
            assert!(auth.validate().is_ok());
            assert_eq!(auth.token_ttl().unwrap(), chrono::Duration::hours(hours));
        }
    }
}
