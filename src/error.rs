//! Error types for LEAP

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Unknown role '{0}'")]
    UnknownRole(String),

    #[error("Malformed token: {0}")]
    TokenMalformed(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("User '{0}' not found")]
    UnknownUser(String),

    #[error("Access denied: role '{role}' may not open '{path}'")]
    AccessDenied { role: String, path: String },

    #[error("Invalid report filters: {0}")]
    InvalidFilters(String),

    #[error("Login superseded by a newer session action")]
    LoginSuperseded,

    #[error("Config file not found. Run 'leap init' first.")]
    ConfigNotFound,

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the error means "the caller is not authenticated"
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            Error::Unauthenticated
                | Error::InvalidCredentials
                | Error::TokenMalformed(_)
                | Error::TokenExpired
                | Error::UnknownUser(_)
        )
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
