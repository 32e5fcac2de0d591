//! Convenience re-exports for downstream crates.

pub use crate::client::{BvClient, BvConfig, ListParams, SessionParams};
pub use crate::document::{ContentVariant, Document, DocumentStatus, Session};
pub use crate::error::{Error, Result};
pub use crate::transport::Transport;
