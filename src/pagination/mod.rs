//! Pagination module
//!
//! Supports: Linked (next URL in body), Marker (next URL from last item), Single page
//!
//! # Overview
//!
//! The pagination module provides one iteration contract over different API
//! pagination styles. A resource page wraps one of the page variants, and a
//! [`Pager`] walks the listing lazily ([`Pager::each_page`],
//! [`Pager::into_stream`]) or eagerly ([`Pager::all_pages`]).

mod aggregate;
mod pager;
mod strategies;
mod types;

pub use pager::{PageCreator, Pager};
pub use strategies::{
    marker_from_field, marker_from_item, LinkLocation, LinkedPage, MarkerFn, MarkerPage,
    SinglePage, DEFAULT_MARKER_PARAM,
};
pub use types::{header_map, Body, Page, PageResult, PageStyle, LINKS_SUFFIX};
