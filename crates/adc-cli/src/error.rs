//! CLI error types.

use adc_client::ClientError;
use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Directory client error.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Entry not found.
    #[error("{kind} not found: {target}")]
    NotFound {
        /// Entity kind.
        kind: &'static str,
        /// Lookup target.
        target: String,
    },

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
