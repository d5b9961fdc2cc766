//! Asynchronous management API client implementation.

use crate::Result;
use metal_core::client::ClientConfig;
use metal_core::config::ManagementApiConfig;
use metal_core::{Error, PowerStatus};
use reqwest::header::USER_AGENT as USER_AGENT_HEADER;
use reqwest::{Method, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const USER_AGENT: &str = concat!("metal-api/", env!("CARGO_PKG_VERSION"));

const POWER_ON_PATH: &str = "/poweron";
const POWER_OFF_PATH: &str = "/poweroff";
const PXE_BOOT_PATH: &str = "/pxeboot";
const STATUS_PATH: &str = "/status";

/// Builder for [`ManagementClient`].
#[derive(Debug, Clone)]
pub struct ManagementClientBuilder {
    endpoint: String,
    http_config: ClientConfig,
    http_client: Option<reqwest::Client>,
    strict_status_check: bool,
}

impl ManagementClientBuilder {
    /// Create a builder for the `host:port` endpoint of a management agent.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http_config: ClientConfig::new(),
            http_client: None,
            strict_status_check: false,
        }
    }

    /// Create a builder from a deserialized management API description.
    #[must_use]
    pub fn from_config(config: &ManagementApiConfig) -> Self {
        Self::new(config.endpoint.clone())
            .with_http_config(config.client_config())
            .with_strict_status_check(config.strict_status_check)
    }

    /// Override the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http_config = self.http_config.with_timeout(timeout);
        self
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Use a preconfigured HTTP client instead of building one.
    ///
    /// Pool settings from the HTTP configuration are ignored; the timeout and
    /// logging settings still apply.
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Reject non-200 status responses before decoding them.
    #[must_use]
    pub fn with_strict_status_check(mut self, strict: bool) -> Self {
        self.strict_status_check = strict;
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the HTTP client cannot be built.
    pub fn build(self) -> Result<ManagementClient> {
        let http = match self.http_client {
            Some(client) => client,
            None => self.http_config.build_http_client()?,
        };

        Ok(ManagementClient {
            endpoint: self.endpoint,
            http,
            timeout: self.http_config.timeout,
            strict_status_check: self.strict_status_check,
            enable_logging: self.http_config.enable_logging,
        })
    }
}

/// Asynchronous client for a machine's management agent.
///
/// Holds no state besides its configuration, so one instance can be cloned
/// and shared across tasks. Concurrent calls become independent requests.
#[derive(Debug, Clone)]
pub struct ManagementClient {
    endpoint: String,
    http: reqwest::Client,
    timeout: Duration,
    strict_status_check: bool,
    enable_logging: bool,
}

impl ManagementClient {
    /// Construct a client with default settings.
    ///
    /// The endpoint is not validated; a malformed value surfaces as
    /// [`Error::InvalidEndpoint`] on the first call.
    ///
    /// # Panics
    ///
    /// Panics if reqwest cannot initialize its HTTP backend (the same
    /// condition under which [`reqwest::Client::new`] panics). Use
    /// [`ManagementClient::builder`] to receive that failure as
    /// [`Error::ConfigError`] instead.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
            timeout: ClientConfig::new().timeout,
            strict_status_check: false,
            enable_logging: true,
        }
    }

    /// Return a builder for the given endpoint.
    #[must_use]
    pub fn builder(endpoint: impl Into<String>) -> ManagementClientBuilder {
        ManagementClientBuilder::new(endpoint)
    }

    /// Return the configured `host:port` endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Return the per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Power on the machine.
    pub async fn power_on(&self) -> Result<()> {
        self.post(POWER_ON_PATH).await
    }

    /// Power off the machine.
    pub async fn power_off(&self) -> Result<()> {
        self.post(POWER_OFF_PATH).await
    }

    /// Power off the machine, then power it back on.
    ///
    /// Power-on is only attempted once power-off succeeded. No delay is
    /// inserted between the two requests.
    pub async fn power_cycle(&self) -> Result<()> {
        self.power_off().await?;
        self.power_on().await
    }

    /// Make the machine boot from the network on its next start.
    pub async fn set_pxe(&self) -> Result<()> {
        self.post(PXE_BOOT_PATH).await
    }

    /// Fetch the decoded power status.
    ///
    /// Unless strict status checking is enabled, the body is decoded whatever
    /// the response status, so an error page that happens to be a JSON object
    /// reads as powered off.
    pub async fn power_status(&self) -> Result<PowerStatus> {
        let response = self.send(Method::GET, STATUS_PATH, self.timeout).await?;
        let status = response.status();

        if status != StatusCode::OK {
            if self.strict_status_check {
                self.drain(response).await;
                return Err(Error::Status { status });
            }
            if self.enable_logging {
                warn!(endpoint = %self.endpoint, %status, "decoding power status from non-OK response");
            }
        }

        let body = response.bytes().await?;
        PowerStatus::from_body(&body)
    }

    /// Check whether the machine is powered on.
    pub async fn is_powered_on(&self) -> Result<bool> {
        self.power_status().await.map(|status| status.powered_on)
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(Url::parse(&format!("http://{}{path}", self.endpoint))?)
    }

    async fn post(&self, path: &str) -> Result<()> {
        let response = self.send(Method::POST, path, self.timeout).await?;
        let status = response.status();
        self.drain(response).await;

        if status != StatusCode::OK {
            if self.enable_logging {
                warn!(endpoint = %self.endpoint, path, %status, "management request rejected");
            }
            return Err(Error::Status { status });
        }

        Ok(())
    }

    async fn send(&self, method: Method, path: &str, timeout: Duration) -> Result<Response> {
        let url = self.url(path)?;
        if self.enable_logging {
            debug!(%method, %url, "sending management request");
        }

        let response = self
            .http
            .request(method, url)
            .header(USER_AGENT_HEADER, USER_AGENT)
            .timeout(timeout)
            .send()
            .await?;

        if self.enable_logging {
            debug!(path, status = %response.status(), "management response received");
        }

        Ok(response)
    }

    // Reads the body to completion so the connection can be reused.
    async fn drain(&self, response: Response) {
        if let Err(err) = response.bytes().await {
            if self.enable_logging {
                debug!(endpoint = %self.endpoint, error = %err, "failed to drain response body");
            }
        }
    }
}
