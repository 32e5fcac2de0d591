#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing targets for observability
/// Logging target for client operations.
pub const CLIENT_TARGET: &str = "boxview::client";

/// Logging target for HTTP requests and responses.
pub const HTTP_TARGET: &str = "boxview::http";

mod client;
mod document;
pub mod error;
#[doc(hidden)]
pub mod prelude;
pub mod transport;

pub use crate::client::{
    BvClient, BvConfig, BvConfigBuilder, DEFAULT_THUMBNAIL_HEIGHT, DEFAULT_THUMBNAIL_WIDTH,
    ListParams, SessionParams,
};
pub use crate::document::{ContentVariant, Document, DocumentMetadata, DocumentStatus, Session};
pub use crate::error::{Error, Result};
pub use crate::transport::{HttpTransport, Transport};
