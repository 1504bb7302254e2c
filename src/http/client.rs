//! HTTP transport backed by reqwest
//!
//! Provides the default [`Transport`] implementation:
//! - Default and per-listing headers
//! - Relative URLs resolved against a base URL
//! - Cancellation and deadlines through [`Context`]
//! - Error classification for 4xx/5xx responses

use super::transport::Transport;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::pagination::PageResult;
use crate::types::StringMap;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL for relative page URLs
    pub base_url: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            default_headers: HashMap::new(),
            user_agent: format!("pagewalk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// HTTP client fetching pages with GET requests
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Build full URL from a path or absolute URL
    pub fn build_url(&self, path: &str) -> Result<Url> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(Url::parse(path)?);
        }

        match &self.config.base_url {
            Some(base) => {
                let base = base.trim_end_matches('/');
                let path = path.trim_start_matches('/');
                Ok(Url::parse(&format!("{base}/{path}"))?)
            }
            None => Ok(Url::parse(path)?),
        }
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn fetch(&self, ctx: &Context, headers: &StringMap, url: &str) -> Result<PageResult> {
        let full_url = self.build_url(url)?;

        let mut req = self.client.get(full_url.clone());

        // Add default headers
        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }

        // Add listing-specific headers
        for (key, value) in headers {
            req = req.header(key.as_str(), value.as_str());
        }

        let response = ctx
            .run(async move { req.send().await.map_err(Error::from) })
            .await?;
        let status = response.status();

        if status.is_client_error() || status.is_server_error() {
            let body = ctx
                .run(async move { Ok(response.text().await.unwrap_or_default()) })
                .await?;
            return Err(Error::http_status(status.as_u16(), full_url.as_str(), body));
        }

        let page_url = response.url().clone();
        let response_headers = response.headers().clone();
        let raw = ctx
            .run(async move { response.bytes().await.map_err(Error::from) })
            .await?;

        debug!(
            "Fetched page: GET {} ({}, {} bytes)",
            page_url,
            status.as_u16(),
            raw.len()
        );
        PageResult::from_response(page_url, status.as_u16(), response_headers, raw)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
