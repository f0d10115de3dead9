//! Configuration loading and environment variable interpolation

use crate::error::{Error, Result};
use regex::Regex;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::Config;

pub const CONFIG_FILENAME: &str = "leap.toml";

/// Load configuration from leap.toml
pub fn load_config() -> Result<Config> {
    let config_path = find_config_file()?;
    load_config_from_path(&config_path)
}

/// Load configuration, falling back to defaults when no leap.toml exists
pub fn load_config_or_default() -> Result<Config> {
    match load_config() {
        Err(Error::ConfigNotFound) => {
            tracing::debug!("No {} found, using defaults", CONFIG_FILENAME);
            Ok(Config::default())
        }
        other => other,
    }
}

/// Load configuration from a specific path
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|_| Error::ConfigNotFound)?;
    let content = interpolate_env_vars(&content)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Write configuration to a specific path
pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
    fs::write(path, content)?;
    Ok(())
}

/// Find the configuration file, searching upward from current directory
fn find_config_file() -> Result<PathBuf> {
    let mut current = env::current_dir().map_err(|e| Error::Config(e.to_string()))?;

    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Ok(config_path);
        }

        if !current.pop() {
            return Err(Error::ConfigNotFound);
        }
    }
}

/// Interpolate environment variables in the format ${VAR_NAME} or ${VAR_NAME:-default}
fn interpolate_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
        .map_err(|e| Error::Config(format!("Bad interpolation pattern: {}", e)))?;

    Ok(re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");

        env::var(var_name).unwrap_or_else(|_| default.to_string())
    })
    .to_string())
}

/// Generate a default configuration file content
pub fn default_config_content() -> &'static str {
    r#"# LEAP Configuration

[server]
host = "${LEAP_HOST:-127.0.0.1}"
port = 4173

[auth]
# Issued tokens expire after this many hours
token_ttl_hours = 24
# Simulated latency of the credential check
login_latency_ms = 500
# Persistent storage key holding the session token
token_key = "auth_token"
login_path = "/login"
landing_path = "/dashboard"

[storage]
# Persistent key-value file (the CLI keeps its session token here)
path = ".leap/local_storage.json"

[notifications]
capacity = 64
success_ms = 3000
info_ms = 3000
warning_ms = 4000
error_ms = 5000
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_interpolation() {
        env::set_var("LEAP_TEST_VAR", "hello");
        let content = "value = \"${LEAP_TEST_VAR}\"";
        let result = interpolate_env_vars(content).unwrap();
        assert_eq!(result, "value = \"hello\"");
        env::remove_var("LEAP_TEST_VAR");
    }

    #[test]
    fn test_env_interpolation_with_default() {
        let content = "value = \"${LEAP_NONEXISTENT_VAR:-default_value}\"";
        let result = interpolate_env_vars(content).unwrap();
        assert_eq!(result, "value = \"default_value\"");
    }

    #[test]
    fn test_default_content_parses() {
        let content = interpolate_env_vars(default_config_content()).unwrap();
        let config: Config = toml::from_str(&content).unwrap();
        assert_eq!(config.auth.token_key, "auth_token");
        assert_eq!(config.server.port, 4173);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        let mut config = Config::default();
        config.auth.login_latency_ms = 0;

        save_config(&config, &path).unwrap();
        let loaded = load_config_from_path(&path).unwrap();
        assert_eq!(loaded.auth.login_latency_ms, 0);
    }

    #[test]
    fn test_missing_file_is_config_not_found() {
        let result = load_config_from_path(Path::new("/nonexistent/leap.toml"));
        assert!(matches!(result, Err(Error::ConfigNotFound)));
    }

    #[test]
    fn test_unusable_token_ttl_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);

        for ttl in ["0", "-1", "10000000000"] {
            fs::write(&path, format!("[auth]\ntoken_ttl_hours = {}\n", ttl)).unwrap();
            let result = load_config_from_path(&path);
            assert!(matches!(result, Err(Error::Config(_))), "ttl {}", ttl);
        }

        fs::write(&path, "[auth]\ntoken_ttl_hours = 1\n").unwrap();
        assert_eq!(load_config_from_path(&path).unwrap().auth.token_ttl_hours, 1);
    }
}
