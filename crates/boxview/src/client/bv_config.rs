//! Configuration for the Box View client.

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

/// URL scheme for all API endpoints.
const API_SCHEME: &str = "https";
/// Default API host.
const API_HOST: &str = "view-api.box.com";
/// API version path segment.
const API_VERSION: &str = "1";
/// Document resource path segment.
const API_RESOURCE: &str = "documents";
/// Session resource path segment.
const SESSION_RESOURCE: &str = "sessions";

/// Configuration for [`BvClient`](crate::BvClient).
///
/// Holds the API key and the three endpoints derived from the fixed
/// scheme/host/version/resource layout: the primary document endpoint, the
/// dedicated upload endpoint (on the `upload.` subdomain), and the session
/// endpoint. All fields are immutable after construction; the config may be
/// shared read-only across any number of operations.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use boxview::BvConfig;
///
/// # fn main() -> Result<(), boxview::Error> {
/// // Basic configuration
/// let config = BvConfig::new("YOUR_API_KEY")?;
///
/// // Advanced configuration
/// let config = BvConfig::builder()
///     .api_key("YOUR_API_KEY")
///     .timeout(Duration::from_secs(60))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BvConfig {
    /// API key for the Box View application
    api_key: String,

    /// Request timeout duration
    timeout: Duration,

    /// Connection timeout duration
    connect_timeout: Duration,

    /// User agent string for HTTP requests
    user_agent: String,

    /// Primary document endpoint
    document_url: Url,

    /// Upload endpoint on the `upload.` subdomain
    upload_url: Url,

    /// Session endpoint
    session_url: Url,
}

impl BvConfig {
    /// Create a configuration with the given API key and default settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the API key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder().api_key(api_key).build()
    }

    /// Create a new configuration builder.
    pub fn builder() -> BvConfigBuilder {
        BvConfigBuilder::default()
    }

    /// Get the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get the connection timeout.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Get the user agent string.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Get the primary document endpoint.
    pub fn document_url(&self) -> &Url {
        &self.document_url
    }

    /// Get the upload endpoint.
    pub fn upload_url(&self) -> &Url {
        &self.upload_url
    }

    /// Get the session endpoint.
    pub fn session_url(&self) -> &Url {
        &self.session_url
    }

    fn default_user_agent() -> String {
        format!("boxview/{}", env!("CARGO_PKG_VERSION"))
    }
}

/// Builder for [`BvConfig`].
#[derive(Debug, Clone)]
pub struct BvConfigBuilder {
    api_key: Option<String>,
    host: String,
    timeout: Duration,
    connect_timeout: Duration,
    user_agent: String,
}

impl Default for BvConfigBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            host: API_HOST.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: BvConfig::default_user_agent(),
        }
    }
}

impl BvConfigBuilder {
    /// Set the API key (required).
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the API host. Intended for proxies and test harnesses.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the configuration, deriving the three API endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the API key is empty, a timeout is
    /// zero, or the host does not form valid endpoint URLs.
    pub fn build(self) -> Result<BvConfig> {
        let api_key = self
            .api_key
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::config("API key must not be empty"))?;

        if self.timeout.is_zero() {
            return Err(Error::config("timeout must be greater than 0"));
        }
        if self.connect_timeout.is_zero() {
            return Err(Error::config("connect timeout must be greater than 0"));
        }

        let document_url = parse_endpoint(&self.host, API_RESOURCE)?;
        let upload_url = parse_endpoint(&format!("upload.{}", self.host), API_RESOURCE)?;
        let session_url = parse_endpoint(&self.host, SESSION_RESOURCE)?;

        Ok(BvConfig {
            api_key,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            user_agent: self.user_agent,
            document_url,
            upload_url,
            session_url,
        })
    }
}

fn parse_endpoint(host: &str, resource: &str) -> Result<Url> {
    let raw = format!("{API_SCHEME}://{host}/{API_VERSION}/{resource}");
    Url::parse(&raw).map_err(|e| Error::config(format!("Invalid endpoint URL '{}': {}", raw, e)))
}
