//! Error types for management API operations.
//!
//! Every failure surfaced by a management client falls into one of four
//! kinds: the request could not be built, the transport failed (including
//! deadline expiry), the agent answered with an unexpected status, or the
//! status body could not be decoded.

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for management API operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The endpoint and path could not be formed into a valid request
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Network-layer failure (connection refused, DNS, reset, body read)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The per-request deadline elapsed before a response was received
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The management agent answered with a status other than 200 OK
    #[error("Management API error: {status}")]
    Status {
        /// Status code observed on the response
        status: StatusCode,
    },

    /// The status body did not match the expected JSON shape
    #[error("Failed to decode power status: {0}")]
    Decode(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Specialized result type for management API operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::Status { .. } => "STATUS_ERROR",
            Self::Decode(_) => "DECODE_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
        }
    }

    /// Returns true for network-layer failures, timeouts included.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_))
    }

    /// Returns true if the request deadline elapsed.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Returns the HTTP status carried by a [`Error::Status`].
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status } => Some(*status),
            _ => None,
        }
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_builder() {
            Self::InvalidEndpoint(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ConfigError(err.to_string())
    }
}
