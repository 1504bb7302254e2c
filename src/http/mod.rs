//! HTTP transport module
//!
//! Provides the transport collaborator the pager fetches pages through.
//!
//! # Features
//!
//! - **Transport Contract**: `Transport::fetch` returns one decoded page
//! - **Default Headers**: Client-wide headers merged with per-listing headers
//! - **Cancellation**: Every fetch honors the caller's `Context`
//! - **Error Classification**: 4xx/5xx responses become `Error::HttpStatus`

mod client;
mod transport;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use transport::Transport;
