use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CourtsideError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to read config file at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Unknown column: {0}")]
    UnknownColumn(String),
}

impl CourtsideError {
    /// The view renders network failures and server errors identically;
    /// this is the single message the cache stores for a failed key.
    pub fn display_message(&self) -> String {
        match self {
            CourtsideError::Http(_) | CourtsideError::Api { .. } => {
                format!("Failed to fetch teams: {self}")
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CourtsideError>;
