//! Transport contract used by the pager

use crate::context::Context;
use crate::error::Result;
use crate::pagination::PageResult;
use crate::types::StringMap;
use async_trait::async_trait;

/// Fetches the raw page behind a URL
///
/// Implementations must:
/// - apply `headers` on top of their own default headers
/// - abort promptly when `ctx` is cancelled or its deadline passes
/// - report 4xx/5xx responses as errors instead of page results
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the page at `url`
    async fn fetch(&self, ctx: &Context, headers: &StringMap, url: &str) -> Result<PageResult>;
}

