//! Pager: drives a listing one page at a time
//!
//! A [`Pager`] is built once per list call. It holds the transport, the URL of
//! the first page and the function turning a [`PageResult`] into a typed page.
//!
//! # Concurrency
//!
//! A pager is not meant to be shared between concurrent callers: its
//! first-page cache and sticky error are plain fields. Build one pager per
//! listing instead.

use super::aggregate::Aggregator;
use super::types::{header_map, Page, PageResult, PageStyle};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::http::Transport;
use crate::types::StringMap;
use futures::Stream;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Builds a typed page from a fetched page result
pub type PageCreator<P> = Arc<dyn Fn(PageResult) -> Result<P> + Send + Sync>;

/// Per-pager mutable state, owned by exactly one pager
struct PagerState<P> {
    /// First page fetched ahead of an iteration
    first_page: Option<P>,
    /// Error every operation short-circuits with
    err: Option<Error>,
}

impl<P> Default for PagerState<P> {
    fn default() -> Self {
        Self {
            first_page: None,
            err: None,
        }
    }
}

/// Walks the pages of one listing
pub struct Pager<'a, P> {
    client: &'a dyn Transport,
    initial_url: String,
    create_page: PageCreator<P>,
    headers: StringMap,
    state: PagerState<P>,
}

/// Where a page stream continues from
enum Cursor {
    Next(String),
    Failed(Error),
    Done,
}

impl<'a, P: Page> Pager<'a, P> {
    /// Create a pager for the listing starting at `initial_url`
    pub fn new<F>(client: &'a dyn Transport, initial_url: impl Into<String>, create_page: F) -> Self
    where
        F: Fn(PageResult) -> Result<P> + Send + Sync + 'static,
    {
        Self {
            client,
            initial_url: initial_url.into(),
            create_page: Arc::new(create_page),
            headers: StringMap::new(),
            state: PagerState::default(),
        }
    }

    /// Create a pager from a URL that may have failed to build
    ///
    /// A failed URL becomes the pager's sticky error.
    pub fn from_url<F>(client: &'a dyn Transport, initial_url: Result<String>, create_page: F) -> Self
    where
        F: Fn(PageResult) -> Result<P> + Send + Sync + 'static,
    {
        match initial_url {
            Ok(url) => Self::new(client, url, create_page),
            Err(err) => Self::new(client, String::new(), create_page).with_error(err),
        }
    }

    /// Put the pager in a failed state
    ///
    /// Every later operation returns `err` without issuing requests.
    #[must_use]
    pub fn with_error(mut self, err: Error) -> Self {
        self.state.err = Some(err);
        self
    }

    /// Set extra headers sent with every page request
    #[must_use]
    pub fn with_headers(mut self, headers: StringMap) -> Self {
        self.headers = headers;
        self
    }

    /// Add one extra header sent with every page request
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Substitute a different page construction function
    ///
    /// The client, URL, headers and sticky error are kept; a cached first
    /// page is dropped since it was built by the old function.
    pub fn with_page_creator<Q, F>(self, create_page: F) -> Pager<'a, Q>
    where
        Q: Page,
        F: Fn(PageResult) -> Result<Q> + Send + Sync + 'static,
    {
        Pager {
            client: self.client,
            initial_url: self.initial_url,
            create_page: Arc::new(create_page),
            headers: self.headers,
            state: PagerState {
                first_page: None,
                err: self.state.err,
            },
        }
    }

    /// URL of the first page
    pub fn initial_url(&self) -> &str {
        &self.initial_url
    }

    /// Extra headers sent with every page request
    pub fn headers(&self) -> &StringMap {
        &self.headers
    }

    /// Sticky error, if the pager is in a failed state
    pub fn err(&self) -> Option<&Error> {
        self.state.err.as_ref()
    }

    fn check(&self) -> Result<()> {
        match &self.state.err {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn fetch_page(&self, ctx: &Context, url: &str) -> Result<P> {
        ctx.check()?;
        debug!("Fetching page from {}", url);
        let result = self
            .client
            .fetch(ctx, &self.headers, url)
            .await
            .map_err(|e| match e {
                // Body decoding happens in the transport; keep the failing URL
                Error::JsonParse(_) | Error::Decode { .. } => Error::page_construction(url, e),
                other => other,
            })?;
        (self.create_page)(result).map_err(|e| Error::page_construction(url, e))
    }

    /// Fetch the first page without consuming it
    ///
    /// The page is cached, so a following [`each_page`](Self::each_page) or
    /// [`all_pages`](Self::all_pages) does not fetch it again.
    /// Returns [`Error::PageNotAvailable`] when the listing is empty.
    pub async fn first_page(&mut self, ctx: &Context) -> Result<&P> {
        self.check()?;
        if self.state.first_page.is_none() {
            let page = self.fetch_page(ctx, &self.initial_url).await?;
            self.state.first_page = Some(page);
        }
        let Some(page) = self.state.first_page.as_ref() else {
            return Err(Error::PageNotAvailable);
        };
        if page.is_empty()? {
            return Err(Error::PageNotAvailable);
        }
        Ok(page)
    }

    /// Visit every page of the listing in order
    ///
    /// The visitor returns `Ok(false)` to stop early. Iteration also ends at the
    /// first empty page, which is not passed to the visitor, or when a page has
    /// no next URL.
    pub async fn each_page<F>(&mut self, ctx: &Context, mut visitor: F) -> Result<()>
    where
        F: FnMut(&P) -> Result<bool>,
    {
        self.check()?;

        let mut current_url = self.initial_url.clone();
        let mut visited = 0usize;
        loop {
            let page = match self.state.first_page.take() {
                Some(page) => page,
                None => self.fetch_page(ctx, &current_url).await?,
            };

            if page.is_empty()? {
                debug!("Reached empty page after {} pages", visited);
                return Ok(());
            }

            visited += 1;
            if !visitor(&page)? {
                debug!("Visitor stopped iteration at page {}", visited);
                return Ok(());
            }

            match page.next_page_url()? {
                Some(next) => current_url = next,
                None => {
                    debug!("Listing complete after {} pages", visited);
                    return Ok(());
                }
            }
        }
    }

    /// Collect every page into one page of the same type
    ///
    /// The returned page has a body concatenating the items of all pages and
    /// carries the pager's extra headers. Single-page listings are returned as
    /// fetched.
    pub async fn all_pages(&mut self, ctx: &Context) -> Result<P> {
        self.check()?;

        let first = match self.state.first_page.take() {
            Some(page) => page,
            None => self.fetch_page(ctx, &self.initial_url).await?,
        };

        if first.style() == PageStyle::Single {
            return Ok(first);
        }

        let mut aggregator = Aggregator::for_body(first.body())?;
        let url = first.page_result().url.clone();
        let status = first.page_result().status;

        self.state.first_page = Some(first);
        self.each_page(ctx, |page| {
            aggregator.push(page.body())?;
            Ok(true)
        })
        .await?;

        let result = PageResult::new(
            url.clone(),
            status,
            header_map(&self.headers)?,
            aggregator.finish(),
        );
        (self.create_page)(result).map_err(|e| Error::page_construction(url, e))
    }

    /// Turn the pager into a stream of pages
    ///
    /// Pages are fetched lazily as the stream is polled; dropping the stream
    /// stops the listing. The stream ends after the first error.
    pub fn into_stream(mut self, ctx: Context) -> impl Stream<Item = Result<P>> + 'a
    where
        P: 'a,
    {
        let cursor = match self.state.err.take() {
            Some(err) => Cursor::Failed(err),
            None => Cursor::Next(self.initial_url.clone()),
        };

        futures::stream::try_unfold(
            (self, ctx, cursor),
            |(mut pager, ctx, cursor)| async move {
                let url = match cursor {
                    Cursor::Next(url) => url,
                    Cursor::Failed(err) => return Err(err),
                    Cursor::Done => return Ok(None),
                };

                let page = match pager.state.first_page.take() {
                    Some(page) => page,
                    None => pager.fetch_page(&ctx, &url).await?,
                };

                if page.is_empty()? {
                    return Ok(None);
                }

                let cursor = match page.next_page_url()? {
                    Some(next) => Cursor::Next(next),
                    None => Cursor::Done,
                };
                Ok(Some((page, (pager, ctx, cursor))))
            },
        )
    }
}

impl<P> fmt::Debug for Pager<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pager")
            .field("initial_url", &self.initial_url)
            .field("headers", &self.headers)
            .field("has_first_page", &self.state.first_page.is_some())
            .field("err", &self.state.err)
            .finish_non_exhaustive()
    }
}
