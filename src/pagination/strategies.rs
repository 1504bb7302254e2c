//! Page variant implementations
//!
//! Each variant handles one pagination style. Resource pages embed exactly one
//! of them and delegate the [`Page`] contract to it.

use super::types::{Body, Page, PageResult, PageStyle, LINKS_SUFFIX, MERGEABLE_SHAPES};
use crate::error::{Error, Result};
use crate::types::JsonValue;
use std::fmt;
use std::sync::Arc;

/// Shared emptiness rule for all variants
fn body_is_empty(result: &PageResult, list_field: Option<&str>) -> Result<bool> {
    match &result.body {
        Body::Bytes(bytes) => Ok(result.is_no_content() || bytes.is_empty()),
        Body::Array(items) => Ok(items.is_empty()),
        body @ Body::Object(_) => Ok(body.items(list_field)?.is_empty()),
        other => Err(Error::unexpected_shape(MERGEABLE_SHAPES, other.kind())),
    }
}

// ============================================================================
// Linked Pagination
// ============================================================================

/// Where a linked page keeps its pointer to the next page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LinkLocation {
    /// An array of `{"rel": ..., "href": ...}` objects under `<list_field>_links`,
    /// falling back to any other field ending in `links`
    #[default]
    Relations,
    /// A chain of object keys leading to the next URL string,
    /// e.g. `["links", "next"]` for `{"links": {"next": "..."}}`
    Path(Vec<String>),
}

impl LinkLocation {
    /// Create a key path location
    pub fn path<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Path(keys.into_iter().map(Into::into).collect())
    }
}

/// Page whose body embeds the URL of the next page
///
/// Common in OpenStack-style APIs:
/// `{"servers": [...], "servers_links": [{"rel": "next", "href": "..."}]}`
#[derive(Debug, Clone)]
pub struct LinkedPage {
    result: PageResult,
    list_field: Option<String>,
    location: LinkLocation,
}

impl LinkedPage {
    /// Wrap a page result, searching relation links for the next page
    pub fn new(result: PageResult) -> Self {
        Self {
            result,
            list_field: None,
            location: LinkLocation::default(),
        }
    }

    /// Set the name of the field holding the items
    #[must_use]
    pub fn with_list_field(mut self, field: impl Into<String>) -> Self {
        self.list_field = Some(field.into());
        self
    }

    /// Set where the next link lives
    #[must_use]
    pub fn with_link_location(mut self, location: LinkLocation) -> Self {
        self.location = location;
        self
    }

    /// Name of the field holding the items, if known
    pub fn list_field(&self) -> Option<&str> {
        self.list_field.as_deref()
    }

    fn malformed(&self, message: impl Into<String>) -> Error {
        Error::next_page_url(self.result.url.as_str(), message)
    }

    fn next_from_relations(&self) -> Result<Option<String>> {
        let Some(map) = self.result.body.as_object() else {
            return Err(self.malformed(format!(
                "expected object body, got {}",
                self.result.body.kind()
            )));
        };

        // `<field>_links` is searched first, then any other key ending in `links`
        let preferred = self
            .list_field
            .as_ref()
            .map(|field| format!("{field}_{LINKS_SUFFIX}"));
        let mut link_fields: Vec<(String, &JsonValue)> = Vec::new();
        if let Some(key) = preferred.as_ref() {
            if let Some(value) = map.get(key) {
                link_fields.push((key.clone(), value));
            }
        }
        link_fields.extend(
            map.iter()
                .filter(|(key, _)| {
                    key.ends_with(LINKS_SUFFIX) && Some(*key) != preferred.as_ref()
                })
                .map(|(key, value)| (key.clone(), value)),
        );

        for (key, value) in link_fields {
            let links = match value {
                JsonValue::Null => continue,
                JsonValue::Array(links) => links,
                other => {
                    return Err(self.malformed(format!("'{key}' is not an array: {other}")));
                }
            };

            for link in links {
                let Some(link) = link.as_object() else {
                    return Err(self.malformed(format!("'{key}' entry is not an object: {link}")));
                };
                if link.get("rel").and_then(JsonValue::as_str) != Some("next") {
                    continue;
                }
                return match link.get("href") {
                    Some(JsonValue::String(href)) if !href.is_empty() => Ok(Some(href.clone())),
                    Some(JsonValue::String(_) | JsonValue::Null) | None => Ok(None),
                    Some(other) => {
                        Err(self.malformed(format!("'{key}' next href is not a string: {other}")))
                    }
                };
            }
        }

        Ok(None)
    }

    fn next_from_path(&self, path: &[String]) -> Result<Option<String>> {
        let Some(mut current) = self.result.body.as_object() else {
            return Err(self.malformed(format!(
                "expected object body, got {}",
                self.result.body.kind()
            )));
        };

        let Some((last, parents)) = path.split_last() else {
            return Err(Error::config("link path must not be empty"));
        };

        for key in parents {
            match current.get(key) {
                None | Some(JsonValue::Null) => return Ok(None),
                Some(JsonValue::Object(next)) => current = next,
                Some(other) => {
                    return Err(self.malformed(format!("'{key}' is not an object: {other}")));
                }
            }
        }

        match current.get(last) {
            None | Some(JsonValue::Null) => Ok(None),
            Some(JsonValue::String(url)) if url.is_empty() => Ok(None),
            Some(JsonValue::String(url)) => Ok(Some(url.clone())),
            Some(other) => Err(self.malformed(format!("'{last}' is not a string: {other}"))),
        }
    }
}

impl Page for LinkedPage {
    fn page_result(&self) -> &PageResult {
        &self.result
    }

    fn style(&self) -> PageStyle {
        PageStyle::Linked
    }

    fn next_page_url(&self) -> Result<Option<String>> {
        match &self.location {
            LinkLocation::Relations => self.next_from_relations(),
            LinkLocation::Path(path) => self.next_from_path(path),
        }
    }

    fn is_empty(&self) -> Result<bool> {
        body_is_empty(&self.result, self.list_field.as_deref())
    }
}

// ============================================================================
// Marker Pagination
// ============================================================================

/// Default query parameter carrying the marker
pub const DEFAULT_MARKER_PARAM: &str = "marker";

/// Computes the marker for the next request from the last item of a page
pub type MarkerFn = Arc<dyn Fn(&JsonValue) -> Result<Option<String>> + Send + Sync>;

/// Marker taken from a field of the last item, e.g. `id` or `name`
pub fn marker_from_field(field: impl Into<String>) -> MarkerFn {
    let field = field.into();
    Arc::new(move |item: &JsonValue| match item.get(&field) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s.clone())),
        Some(JsonValue::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(Error::decode(format!(
            "marker field '{field}' is not a string or number: {other}"
        ))),
    })
}

/// Marker taken from the last item itself (plain-text listings)
pub fn marker_from_item() -> MarkerFn {
    Arc::new(|item: &JsonValue| match item {
        JsonValue::String(s) => Ok(Some(s.clone())),
        JsonValue::Number(n) => Ok(Some(n.to_string())),
        other => Err(Error::decode(format!(
            "marker item is not a string or number: {other}"
        ))),
    })
}

/// Page whose follow-up is requested with a marker computed from its last item
///
/// Common patterns:
/// - `?marker=<last id>`
/// - `?marker=<last container name>` (plain-text listings)
///
/// Keyed-object listings should name their list field with
/// [`with_list_field`](Self::with_list_field). Without it, an object carrying
/// more than one array field has no well-defined last item and
/// [`last_marker`](Self::last_marker) fails.
#[derive(Clone)]
pub struct MarkerPage {
    result: PageResult,
    list_field: Option<String>,
    marker_param: String,
    marker: MarkerFn,
}

impl MarkerPage {
    /// Wrap a page result with the function computing the marker
    pub fn new(result: PageResult, marker: MarkerFn) -> Self {
        Self {
            result,
            list_field: None,
            marker_param: DEFAULT_MARKER_PARAM.to_string(),
            marker,
        }
    }

    /// Set the name of the field holding the items
    #[must_use]
    pub fn with_list_field(mut self, field: impl Into<String>) -> Self {
        self.list_field = Some(field.into());
        self
    }

    /// Set the query parameter carrying the marker
    #[must_use]
    pub fn with_marker_param(mut self, param: impl Into<String>) -> Self {
        self.marker_param = param.into();
        self
    }

    /// Name of the field holding the items, if known
    pub fn list_field(&self) -> Option<&str> {
        self.list_field.as_deref()
    }

    /// Marker of the last item on this page, `None` when the page has no items
    pub fn last_marker(&self) -> Result<Option<String>> {
        if let (None, Some(map)) = (&self.list_field, self.result.body.as_object()) {
            let arrays = map
                .iter()
                .filter(|(key, value)| !key.ends_with(LINKS_SUFFIX) && value.is_array())
                .count();
            if arrays > 1 {
                return Err(Error::decode(format!(
                    "{arrays} array fields in marker page {}, set a list field",
                    self.result.url
                )));
            }
        }
        let items = self.result.body.items(self.list_field.as_deref())?;
        match items.last() {
            Some(last) => (self.marker)(last),
            None => Ok(None),
        }
    }
}

impl fmt::Debug for MarkerPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkerPage")
            .field("result", &self.result)
            .field("list_field", &self.list_field)
            .field("marker_param", &self.marker_param)
            .finish_non_exhaustive()
    }
}

impl Page for MarkerPage {
    fn page_result(&self) -> &PageResult {
        &self.result
    }

    fn style(&self) -> PageStyle {
        PageStyle::Marker
    }

    fn next_page_url(&self) -> Result<Option<String>> {
        let marker = match self.last_marker()? {
            Some(marker) if !marker.is_empty() => marker,
            _ => return Ok(None),
        };

        let mut url = self.result.url.clone();
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != self.marker_param.as_str())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair(&self.marker_param, &marker);

        Ok(Some(url.into()))
    }

    fn is_empty(&self) -> Result<bool> {
        body_is_empty(&self.result, self.list_field.as_deref())
    }
}

// ============================================================================
// Single Page
// ============================================================================

/// Page of an endpoint that never paginates
#[derive(Debug, Clone)]
pub struct SinglePage {
    result: PageResult,
    list_field: Option<String>,
}

impl SinglePage {
    /// Wrap a page result
    pub fn new(result: PageResult) -> Self {
        Self {
            result,
            list_field: None,
        }
    }

    /// Set the name of the field holding the items
    #[must_use]
    pub fn with_list_field(mut self, field: impl Into<String>) -> Self {
        self.list_field = Some(field.into());
        self
    }
}

impl Page for SinglePage {
    fn page_result(&self) -> &PageResult {
        &self.result
    }

    fn style(&self) -> PageStyle {
        PageStyle::Single
    }

    fn next_page_url(&self) -> Result<Option<String>> {
        Ok(None)
    }

    fn is_empty(&self) -> Result<bool> {
        body_is_empty(&self.result, self.list_field.as_deref())
    }
}
