//! Directory error types.
//!
//! ## Security Note
//!
//! Error messages must not leak bind credentials. Bind DNs may appear,
//! passwords never do.

use thiserror::Error;

/// LDAP result code for invalid credentials.
pub const RC_INVALID_CREDENTIALS: u32 = 49;

/// LDAP result codes treated as transient connection failures.
///
/// 51 (busy), 52 (unavailable), 81 (server down).
pub const TRANSIENT_RESULT_CODES: [u32; 3] = [51, 52, 81];

/// Errors reported by a directory capability.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Invalid configuration of the directory connection.
    #[error("directory configuration error: {0}")]
    Configuration(String),

    /// The connection to the directory failed or was lost.
    ///
    /// This is the transient class: the session layer rebinds and retries
    /// once when it sees it.
    #[error("directory connection failed: {0}")]
    Connection(String),

    /// Bind failed for a reason other than bad credentials.
    #[error("directory bind failed: {0}")]
    Bind(String),

    /// Bind rejected the supplied credentials.
    #[error("invalid credentials for {0}")]
    InvalidCredentials(String),

    /// Any other failure reported by the directory server.
    #[error("directory protocol error (code {code}): {message}")]
    Protocol {
        /// LDAP result code.
        code: u32,
        /// Diagnostic message from the server.
        message: String,
    },

    /// A paged search exceeded the configured page ceiling.
    #[error("paged search exceeded the limit of {0} pages")]
    PageLimitExceeded(usize),

    /// An operation was attempted without a bound session.
    #[error("no bound directory session")]
    NotBound,

    /// Internal error.
    #[error("internal directory error: {0}")]
    Internal(String),
}

impl DirectoryError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a protocol error from an LDAP result code and message.
    #[must_use]
    pub fn protocol(code: u32, message: impl Into<String>) -> Self {
        Self::Protocol {
            code,
            message: message.into(),
        }
    }

    /// Classifies an LDAP result code.
    ///
    /// Transient codes become [`DirectoryError::Connection`], everything
    /// else is a [`DirectoryError::Protocol`].
    #[must_use]
    pub fn from_result_code(code: u32, message: impl Into<String>) -> Self {
        let message = message.into();
        if TRANSIENT_RESULT_CODES.contains(&code) {
            Self::Connection(format!("server returned code {code}: {message}"))
        } else {
            Self::protocol(code, message)
        }
    }

    /// Checks if this failure should trigger a rebind and retry.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Checks if this is an authentication failure.
    #[must_use]
    pub const fn is_auth_error(&self) -> bool {
        matches!(self, Self::InvalidCredentials(_) | Self::Bind(_))
    }
}

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

impl From<ldap3::LdapError> for DirectoryError {
    fn from(err: ldap3::LdapError) -> Self {
        use ldap3::LdapError as E;

        match err {
            E::LdapResult { result } => Self::from_result_code(result.rc, result.text),
            E::Io { .. }
            | E::OpSend { .. }
            | E::ResultRecv { .. }
            | E::Timeout { .. }
            | E::EndOfStream => Self::Connection(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}
