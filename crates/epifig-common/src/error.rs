//! Error types and utilities for EpiFig

use thiserror::Error;

/// Result type alias for EpiFig operations
pub type Result<T> = std::result::Result<T, EpiFigError>;

/// Main error type for EpiFig operations
#[derive(Error, Debug)]
pub enum EpiFigError {
    /// The feature service could not be reached or its payload could not be decoded
    #[error("Retrieval error: {message}")]
    Retrieval {
        message: String,
        status_code: Option<u16>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A dataset is missing an expected column or has inconsistent rows
    #[error("Schema error: {message}")]
    Schema {
        message: String,
        column: Option<String>,
    },

    /// A join was requested on a column absent from one side
    #[error("Join key error: column '{column}' missing from {side} dataset")]
    JoinKey { column: String, side: String },

    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EpiFigError {
    /// Create a new retrieval error
    pub fn retrieval(msg: impl Into<String>) -> Self {
        Self::Retrieval {
            message: msg.into(),
            status_code: None,
            source: None,
        }
    }

    /// Create a new retrieval error with the HTTP status that caused it
    pub fn retrieval_with_status(msg: impl Into<String>, status: u16) -> Self {
        Self::Retrieval {
            message: msg.into(),
            status_code: Some(status),
            source: None,
        }
    }

    /// Create a new retrieval error with source
    pub fn retrieval_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Retrieval {
            message: msg.into(),
            status_code: None,
            source: Some(Box::new(source)),
        }
    }

    /// Create a new schema error
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema {
            message: msg.into(),
            column: None,
        }
    }

    /// Create a new schema error naming the offending column
    pub fn schema_column(msg: impl Into<String>, column: impl Into<String>) -> Self {
        Self::Schema {
            message: msg.into(),
            column: Some(column.into()),
        }
    }

    /// Create a new join key error
    pub fn join_key(column: impl Into<String>, side: impl Into<String>) -> Self {
        Self::JoinKey {
            column: column.into(),
            side: side.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// HTTP status attached to a retrieval failure, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Retrieval { status_code, .. } => *status_code,
            _ => None,
        }
    }
}

/// Convert from reqwest::Error to EpiFigError
impl From<reqwest::Error> for EpiFigError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::retrieval_with_source("Request timeout", err)
        } else if err.is_connect() {
            Self::retrieval_with_source("Connection failed", err)
        } else if err.is_status() {
            let status_code = err.status().map(|s| s.as_u16()).unwrap_or(0);
            Self::Retrieval {
                message: format!("HTTP error: {}", status_code),
                status_code: Some(status_code),
                source: Some(Box::new(err)),
            }
        } else if err.is_decode() {
            Self::retrieval_with_source("Response body could not be decoded", err)
        } else {
            Self::retrieval_with_source("Network request failed", err)
        }
    }
}

/// Convert from serde_yaml::Error to EpiFigError
impl From<serde_yaml::Error> for EpiFigError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::config_with_source("YAML parsing error", err)
    }
}
