// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]

//! # pagewalk
//!
//! A generic pagination engine for HTTP listing APIs.
//!
//! ## Features
//!
//! - **Three Pagination Styles**: next link in the body, marker from the last item, single page
//! - **Lazy Iteration**: visit pages one by one with early exit, or consume them as a `Stream`
//! - **Aggregation**: merge every page into one page of the same type
//! - **Cancellation**: every fetch honors a caller-supplied `Context`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagewalk::context::Context;
//! use pagewalk::http::HttpClient;
//! use pagewalk::pagination::{LinkedPage, Page, Pager};
//!
//! #[tokio::main]
//! async fn main() -> pagewalk::Result<()> {
//!     let client = HttpClient::new()?;
//!     let ctx = Context::background();
//!
//!     let mut pager = Pager::new(&client, "https://api.example.com/servers", |r| {
//!         Ok(LinkedPage::new(r).with_list_field("servers"))
//!     });
//!
//!     pager
//!         .each_page(&ctx, |page| {
//!             println!("{:?}", page.body());
//!             Ok(true)
//!         })
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                           Pager                             │
//! │  each_page(ctx, visitor)   all_pages(ctx)   into_stream(ctx)│
//! └─────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────────┬───────────┴──────────┬───────────────────┐
//! │    Page variants │      Aggregation     │     Transport     │
//! ├──────────────────┼──────────────────────┼───────────────────┤
//! │ LinkedPage       │ Keyed object         │ HttpClient        │
//! │ MarkerPage       │ Byte stream          │ Context           │
//! │ SinglePage       │ Bare array           │                   │
//! └──────────────────┴──────────────────────┴───────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Cancellation and deadlines
pub mod context;

/// HTTP transport
pub mod http;

/// Pages and the pager
pub mod pagination;

// ============================================================================
// Re-exports
// ============================================================================

pub use context::{CancelHandle, Context};
pub use error::{Error, Result};
pub use http::{HttpClient, HttpClientConfig, Transport};
pub use pagination::{Body, LinkedPage, MarkerPage, Page, PageResult, PageStyle, Pager, SinglePage};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
