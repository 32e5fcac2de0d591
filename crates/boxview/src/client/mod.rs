//! Box View client module.
//!
//! Splits the client into configuration ([`BvConfig`], endpoint derivation)
//! and the request/response contract layer ([`BvClient`]).

mod bv_client;
mod bv_config;

pub use bv_client::{
    BvClient, DEFAULT_THUMBNAIL_HEIGHT, DEFAULT_THUMBNAIL_WIDTH, ListParams, SessionParams,
};
pub use bv_config::{BvConfig, BvConfigBuilder};
