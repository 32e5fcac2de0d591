//! Error types for boxview.
//!
//! Every failure mode of the client maps onto one variant here: local
//! validation failures carry no HTTP status, API failures carry the actual
//! status returned by the service.

/// Result type for all Box View operations in this crate.
///
/// This is a convenience type alias that defaults to using [`Error`] as the
/// error type. Most functions in this crate return this type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Unified error type for Box View operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP client/connection errors (DNS, TLS, timeouts)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response or an unexpected status code
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code returned by the service
        status: u16,
        /// Error message from the API or the failed operation
        message: String,
    },

    /// A required document field was empty before a request could be built
    #[error("Missing required field: {field}")]
    MissingField {
        /// Name of the missing field
        field: &'static str,
    },

    /// Configuration errors (bad host, empty API key, client construction)
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File I/O errors while reading an upload source
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a missing-field validation error.
    pub fn missing_field(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get the HTTP status code if this is an HTTP/API error.
    ///
    /// Local validation and configuration failures have no status.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this error was raised before any request was sent.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Error::MissingField { .. } | Error::Config { .. } | Error::Io(_)
        )
    }

    /// Get the error category for metrics/logging.
    pub fn category(&self) -> &'static str {
        match self {
            Error::Http(_) => "http",
            Error::Api { .. } => "api",
            Error::MissingField { .. } => "missing_field",
            Error::Config { .. } => "config",
            Error::Serialization(_) => "serialization",
            Error::Io(_) => "io",
        }
    }
}
