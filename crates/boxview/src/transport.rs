//! Transport seam between the contract layer and the wire.
//!
//! The client builds a [`TransportRequest`] per operation and hands it to a
//! [`Transport`] implementation, which answers with the raw status code and
//! body bytes. Production code uses the reqwest-backed [`HttpTransport`];
//! tests substitute a recording implementation so contract behavior can be
//! verified without a network.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{ClientBuilder, Method};
use url::Url;

use crate::HTTP_TARGET;
use crate::client::BvConfig;
use crate::error::{Error, Result};

/// One HTTP request as the contract layer describes it.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method
    pub method: Method,
    /// Fully built request URL, including query parameters
    pub url: Url,
    /// Request headers, including authorization
    pub headers: Vec<(String, String)>,
    /// Request body
    pub body: RequestBody,
}

/// Request body shapes the contract layer produces.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    /// No body (GET, DELETE)
    #[default]
    Empty,
    /// JSON body for metadata operations
    Json(serde_json::Value),
    /// Multipart form for file-content uploads
    Multipart(MultipartForm),
}

/// A multipart form: plain text fields plus at most one file part.
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    /// Text form fields, in order
    pub fields: Vec<(String, String)>,
    /// The uploaded file, sent under the `file` part name
    pub file: Option<FilePart>,
}

/// File contents attached to a multipart form.
#[derive(Debug, Clone)]
pub struct FilePart {
    /// Filename reported to the server
    pub file_name: String,
    /// Raw file bytes
    pub bytes: Bytes,
}

/// Raw response handed back to the contract layer.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: Bytes,
}

/// Executes one request/response round trip.
///
/// Implementations surface low-level transport failures (DNS, connection,
/// TLS) as [`Error::Http`], distinct from the API-status failures the
/// contract layer raises itself.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Execute the request and return the raw status and body.
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// Production [`Transport`] backed by a pooled [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http_client: reqwest::Client,
}

impl HttpTransport {
    /// Build the underlying HTTP client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the HTTP client cannot be constructed in
    /// this environment (e.g. no usable TLS backend).
    pub fn new(config: &BvConfig) -> Result<Self> {
        let http_client = ClientBuilder::new()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent())
            .build()
            .map_err(Error::Http)?;

        tracing::debug!(
            target: HTTP_TARGET,
            timeout = ?config.timeout(),
            user_agent = config.user_agent(),
            "HTTP transport initialized"
        );

        Ok(Self { http_client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse> {
        tracing::debug!(
            target: HTTP_TARGET,
            method = %request.method,
            url = %request.url,
            "sending request"
        );

        let mut builder = self.http_client.request(request.method, request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => {
                let mut multipart = reqwest::multipart::Form::new();
                for (name, value) in form.fields {
                    multipart = multipart.text(name, value);
                }
                if let Some(file) = form.file {
                    let part = reqwest::multipart::Part::stream(file.bytes)
                        .file_name(file.file_name);
                    multipart = multipart.part("file", part);
                }
                builder.multipart(multipart)
            }
        };

        let response = builder.send().await.map_err(Error::Http)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(Error::Http)?;

        tracing::debug!(
            target: HTTP_TARGET,
            status,
            body_len = body.len(),
            "received response"
        );

        Ok(TransportResponse { status, body })
    }
}
