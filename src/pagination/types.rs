//! Pagination types and traits
//!
//! Defines the core page abstractions shared by every pagination style.

use crate::error::{Error, Result, ResultExt};
use crate::types::{JsonObject, JsonValue};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use url::Url;

/// Suffix identifying link collections inside a keyed-object body
pub const LINKS_SUFFIX: &str = "links";

/// Shapes a body can be merged from, used in shape errors
pub const MERGEABLE_SHAPES: &str = "object, bytes or array";

// ============================================================================
// Body
// ============================================================================

/// Decoded body of one page
///
/// The shape is decided once, when the response is decoded. Everything above
/// the transport matches on this tag instead of inspecting values.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// JSON object keyed by field name, e.g. `{"servers": [...]}`
    Object(JsonObject),
    /// Raw bytes of a non-JSON response (plain-text listings)
    Bytes(Bytes),
    /// Bare JSON array
    Array(Vec<JsonValue>),
    /// Any other JSON value (string, number, bool, null)
    Scalar(JsonValue),
}

impl Body {
    /// Decode a raw response body according to its content type
    ///
    /// `application/json` bodies are parsed; everything else is kept as bytes.
    /// An empty JSON body (as sent with `204 No Content`) stays an empty byte stream.
    pub fn decode(content_type: Option<&str>, raw: Bytes) -> Result<Self> {
        let is_json = content_type.is_some_and(|ct| ct.starts_with("application/json"));
        if !is_json || raw.is_empty() {
            return Ok(Self::Bytes(raw));
        }

        let value: JsonValue = serde_json::from_slice(&raw)?;
        Ok(Self::from(value))
    }

    /// Name of the body shape, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Object(_) => "object",
            Self::Bytes(_) => "bytes",
            Self::Array(_) => "array",
            Self::Scalar(JsonValue::Null) => "null",
            Self::Scalar(JsonValue::Bool(_)) => "bool",
            Self::Scalar(JsonValue::Number(_)) => "number",
            Self::Scalar(JsonValue::String(_)) => "string",
            // From<JsonValue> never produces a scalar holding an object or array
            Self::Scalar(_) => "value",
        }
    }

    /// Get the body as a keyed object
    pub fn as_object(&self) -> Option<&JsonObject> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Get the body as raw bytes
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Get the body as a bare array
    pub fn as_array(&self) -> Option<&[JsonValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Convert a JSON body back into a `serde_json::Value`
    pub fn to_json(&self) -> Result<JsonValue> {
        match self {
            Self::Object(map) => Ok(JsonValue::Object(map.clone())),
            Self::Array(items) => Ok(JsonValue::Array(items.clone())),
            Self::Scalar(value) => Ok(value.clone()),
            Self::Bytes(_) => Err(Error::unexpected_shape("JSON", self.kind())),
        }
    }

    /// Items of the listing carried by this body
    ///
    /// For keyed objects, `list_field` names the array holding the items. Without
    /// it, every array field whose name does not end in `links` is used.
    /// Byte streams yield one string item per non-empty line.
    pub fn items(&self, list_field: Option<&str>) -> Result<Vec<JsonValue>> {
        match self {
            Self::Object(map) => match list_field {
                Some(field) => match map.get(field) {
                    None | Some(JsonValue::Null) => Ok(Vec::new()),
                    Some(JsonValue::Array(items)) => Ok(items.clone()),
                    Some(other) => Err(Error::decode(format!(
                        "field '{field}' is not an array: {other}"
                    ))),
                },
                None => Ok(map
                    .iter()
                    .filter(|(key, _)| !key.ends_with(LINKS_SUFFIX))
                    .filter_map(|(_, value)| value.as_array())
                    .flatten()
                    .cloned()
                    .collect()),
            },
            Self::Array(items) => Ok(items.clone()),
            Self::Bytes(bytes) => Ok(String::from_utf8_lossy(bytes)
                .lines()
                .filter(|line| !line.is_empty())
                .map(|line| JsonValue::String(line.to_string()))
                .collect()),
            Self::Scalar(_) => Err(Error::unexpected_shape(MERGEABLE_SHAPES, self.kind())),
        }
    }
}

impl From<JsonValue> for Body {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Object(map) => Self::Object(map),
            JsonValue::Array(items) => Self::Array(items),
            other => Self::Scalar(other),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

// ============================================================================
// PageResult
// ============================================================================

/// Immutable snapshot of one fetched page
#[derive(Debug, Clone)]
pub struct PageResult {
    /// URL the page was fetched from
    pub url: Url,
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Decoded body
    pub body: Body,
}

impl PageResult {
    /// Create a page result from its parts
    pub fn new(url: Url, status: u16, headers: HeaderMap, body: Body) -> Self {
        Self {
            url,
            status,
            headers,
            body,
        }
    }

    /// Build a page result from a raw HTTP response
    pub fn from_response(url: Url, status: u16, headers: HeaderMap, raw: Bytes) -> Result<Self> {
        let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
        let body = Body::decode(content_type, raw)?;
        Ok(Self::new(url, status, headers, body))
    }

    /// Replace the body, keeping everything else
    #[must_use]
    pub fn with_body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    /// Replace the headers, keeping everything else
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Check for `204 No Content`
    pub fn is_no_content(&self) -> bool {
        self.status == StatusCode::NO_CONTENT.as_u16()
    }

    /// Get the first value of a header as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Content type of the page, if any
    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE.as_str())
    }

    /// Deserialize the whole JSON body into `T`
    pub fn extract_into<T: DeserializeOwned>(&self) -> Result<T> {
        let value = self.body.to_json()?;
        Ok(serde_json::from_value(value)?)
    }

    /// Deserialize the array stored under `label` into a `Vec<T>`
    ///
    /// A missing or null field yields an empty list.
    pub fn extract_field<T: DeserializeOwned>(&self, label: &str) -> Result<Vec<T>> {
        let items = match &self.body {
            Body::Object(_) => self.body.items(Some(label))?,
            other => {
                return Err(Error::unexpected_shape("object", other.kind()));
            }
        };
        items
            .into_iter()
            .map(|item| {
                serde_json::from_value(item)
                    .with_context(|| format!("Failed to decode item of '{label}'"))
            })
            .collect()
    }
}

/// Convert a plain header map into a `HeaderMap`
pub fn header_map(headers: &HashMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| Error::invalid_header(key.as_str(), e))?;
        let value = HeaderValue::from_str(value).map_err(|e| Error::invalid_header(key.as_str(), e))?;
        map.append(name, value);
    }
    Ok(map)
}

// ============================================================================
// Page
// ============================================================================

/// Pagination style a page follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStyle {
    /// Next URL embedded in the body
    Linked,
    /// Next URL computed from the last item
    Marker,
    /// Never paginates
    Single,
}

/// Capability every page representation satisfies
///
/// Resource-specific pages usually wrap one of [`LinkedPage`](super::LinkedPage),
/// [`MarkerPage`](super::MarkerPage) or [`SinglePage`](super::SinglePage) and
/// delegate to it.
pub trait Page: Send + Sync {
    /// The page result backing this page
    fn page_result(&self) -> &PageResult;

    /// Pagination style of this page
    fn style(&self) -> PageStyle;

    /// URL of the following page, `None` when this is the last page
    fn next_page_url(&self) -> Result<Option<String>>;

    /// Check if this page has no items
    fn is_empty(&self) -> Result<bool>;

    /// Raw decoded body, used for aggregation
    fn body(&self) -> &Body {
        &self.page_result().body
    }
}
