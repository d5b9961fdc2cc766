//! Configuration structures for management API clients.
//!
//! An orchestrator describes each machine's management agent with a
//! [`ManagementApiConfig`], typically deserialized from its own resource
//! definitions.

use crate::client::{ClientConfig, DEFAULT_TIMEOUT_SECS};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Management API description for a single machine.
///
/// The endpoint is carried verbatim. Malformed endpoints surface as
/// [`Error::InvalidEndpoint`] when a request is issued, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ManagementApiConfig {
    /// `host:port` of the management agent
    pub endpoint: String,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Reject non-200 responses on the status query before decoding
    #[serde(default)]
    pub strict_status_check: bool,
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ManagementApiConfig {
    /// Create a configuration for the given `host:port` endpoint.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout_secs: default_timeout_secs(),
            strict_status_check: false,
        }
    }

    /// Parse and validate a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the document is not valid JSON for
    /// this structure or a value is out of range.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::ConfigError(format!("Invalid management API config: {e}")))?;
        config.validate_config()?;
        Ok(config)
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_secs = seconds;
        self
    }

    /// Enable or disable the strict status check.
    #[must_use]
    pub const fn with_strict_status_check(mut self, strict: bool) -> Self {
        self.strict_status_check = strict;
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Derive the HTTP client configuration for this endpoint.
    #[must_use]
    pub const fn client_config(&self) -> ClientConfig {
        ClientConfig::new().with_timeout(self.timeout())
    }

    /// Validate value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] describing the offending fields.
    pub fn validate_config(&self) -> Result<()> {
        self.validate().map_err(Error::from)
    }
}
