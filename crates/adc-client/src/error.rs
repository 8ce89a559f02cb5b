//! Client error types.

use adc_directory::DirectoryError;
use thiserror::Error;

/// Errors returned by [`crate::DirectoryClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request was rejected before any directory call.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The group targeted by a membership change does not exist.
    #[error("group '{0}' not found by id")]
    GroupNotFound(String),

    /// A directory operation failed.
    #[error("{operation} failed for '{target}': {source}")]
    Directory {
        /// Operation name.
        operation: &'static str,
        /// Target DN, id or filter.
        target: String,
        /// Underlying directory error.
        #[source]
        source: DirectoryError,
    },

    /// Resolving a member id failed during a membership change.
    #[error("can't resolve member '{id}': {source}")]
    MemberResolution {
        /// The member id being resolved.
        id: String,
        /// Underlying lookup error.
        #[source]
        source: Box<ClientError>,
    },

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// I/O error while loading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A background task failed.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ClientError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Wraps a directory error with operation context.
    #[must_use]
    pub fn directory(
        operation: &'static str,
        target: impl Into<String>,
        source: DirectoryError,
    ) -> Self {
        Self::Directory {
            operation,
            target: target.into(),
            source,
        }
    }

    /// Returns the underlying directory error, if any.
    #[must_use]
    pub fn directory_error(&self) -> Option<&DirectoryError> {
        match self {
            Self::Directory { source, .. } => Some(source),
            Self::MemberResolution { source, .. } => source.directory_error(),
            _ => None,
        }
    }

    /// Checks if the root cause is a transient connection failure.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.directory_error()
            .is_some_and(DirectoryError::is_transient)
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
