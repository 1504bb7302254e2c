//! Page body aggregation
//!
//! Merges the bodies of every page of a listing into one body of the same
//! shape:
//! - keyed objects: all non-`links` arrays concatenated under one field
//! - byte streams: chunks joined with a single newline
//! - bare arrays: elements concatenated in order

use super::types::{Body, LINKS_SUFFIX, MERGEABLE_SHAPES};
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, warn};

/// Separator placed between byte-stream chunks
const LINE_SEPARATOR: u8 = b'\n';

/// Accumulates page bodies of one shape
#[derive(Debug)]
pub(crate) enum Aggregator {
    Object {
        field: Option<String>,
        items: Vec<JsonValue>,
    },
    Bytes {
        buf: BytesMut,
    },
    Array {
        items: Vec<JsonValue>,
    },
}

impl Aggregator {
    /// Pick the merge strategy for the shape of the first page's body
    pub(crate) fn for_body(body: &Body) -> Result<Self> {
        let aggregator = match body {
            Body::Object(_) => Self::Object {
                field: None,
                items: Vec::new(),
            },
            Body::Bytes(_) => Self::Bytes {
                buf: BytesMut::new(),
            },
            Body::Array(_) => Self::Array { items: Vec::new() },
            Body::Scalar(_) => {
                return Err(Error::unexpected_shape(MERGEABLE_SHAPES, body.kind()));
            }
        };
        debug!("Aggregating pages with {} bodies", aggregator.kind());
        Ok(aggregator)
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Object { .. } => "object",
            Self::Bytes { .. } => "bytes",
            Self::Array { .. } => "array",
        }
    }

    /// Add one page's body
    pub(crate) fn push(&mut self, body: &Body) -> Result<()> {
        match (self, body) {
            (Self::Object { field, items }, Body::Object(map)) => {
                for (key, value) in map {
                    if key.ends_with(LINKS_SUFFIX) {
                        continue;
                    }
                    let JsonValue::Array(values) = value else {
                        continue;
                    };
                    if let Some(active) = field.as_deref() {
                        if active != key {
                            warn!(
                                "List field changed from '{}' to '{}' while aggregating pages",
                                active, key
                            );
                        }
                    }
                    *field = Some(key.clone());
                    items.extend(values.iter().cloned());
                }
            }
            (Self::Bytes { buf }, Body::Bytes(chunk)) => {
                let chunk = trim_trailing_separator(chunk);
                if chunk.is_empty() {
                    return Ok(());
                }
                if !buf.is_empty() {
                    buf.put_u8(LINE_SEPARATOR);
                }
                buf.put_slice(chunk);
            }
            (Self::Array { items }, Body::Array(values)) => {
                items.extend(values.iter().cloned());
            }
            (this, other) => {
                return Err(Error::unexpected_shape(this.kind(), other.kind()));
            }
        }
        Ok(())
    }

    /// Build the merged body
    pub(crate) fn finish(self) -> Body {
        match self {
            Self::Object { field, items } => {
                let mut map = JsonObject::new();
                if let Some(field) = field {
                    map.insert(field, JsonValue::Array(items));
                }
                Body::Object(map)
            }
            Self::Bytes { buf } => Body::Bytes(buf.freeze()),
            Self::Array { items } => Body::Array(items),
        }
    }
}

/// Drops one trailing newline; blank lines inside the chunk are kept
fn trim_trailing_separator(chunk: &Bytes) -> &[u8] {
    chunk.strip_suffix(&[LINE_SEPARATOR]).unwrap_or(chunk.as_ref())
}
