//! Response normalization
//!
//! The backend does not use one envelope across endpoints. The same
//! collection may arrive as a bare array, a single object, or wrapped under
//! `data` / `content` / etc. Route search additionally returns either a flat
//! list of routes or a list of itineraries (arrays of segments). This module
//! reduces all of these to [`Normalized`], which callers match exhaustively.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{ConsoleError, Result};

/// Envelope keys probed in priority order when an object is not itself an entity
pub const ENVELOPE_KEYS: [&str; 6] = [
    "data",
    "locations",
    "transportations",
    "results",
    "items",
    "content",
];

/// Fields that mark an object as a location, segment or route (besides `id`)
const ENTITY_MARKERS: [&str; 4] = ["name", "locationCode", "transportationType", "transportation"];

/// Whether the caller expects one entity or a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Scalar,
    List,
}

/// Canonical shape of a response body
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    /// A single entity
    Scalar(Value),
    /// A flat list of entities, in response order
    List(Vec<Value>),
    /// Multi-segment result: one inner list of segments per itinerary
    Itineraries(Vec<Vec<Value>>),
    /// Empty body where one entity was expected
    NotFound,
    /// Parseable, but no known pattern matched; the raw value is passed through
    Unrecognized(Value),
}

/// Shape check: an object with a non-null `id` and at least one entity marker
#[must_use]
pub fn is_entity_like(value: &Value) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };
    let has_id = object.get("id").is_some_and(|id| !id.is_null());
    has_id && ENTITY_MARKERS.iter().any(|key| object.contains_key(*key))
}

#[derive(Debug, Clone, Copy)]
pub struct ResponseNormalizer {
    arity: Arity,
}

impl ResponseNormalizer {
    #[must_use]
    pub fn new(arity: Arity) -> Self {
        Self { arity }
    }

    /// Parse a response body and normalize it.
    ///
    /// An empty body counts as `null`. Only a body that is not JSON at all
    /// is an error; an unexpected but valid shape yields
    /// [`Normalized::Unrecognized`].
    pub fn parse_body(&self, body: &str) -> Result<Normalized> {
        if body.trim().is_empty() {
            return Ok(self.normalize(&Value::Null));
        }
        let raw: Value = serde_json::from_str(body).map_err(|e| {
            warn!("Response body is not valid JSON: {}", e);
            ConsoleError::malformed(format!("Failed to parse JSON response: {e}"))
        })?;
        Ok(self.normalize(&raw))
    }

    #[must_use]
    pub fn normalize(&self, raw: &Value) -> Normalized {
        match raw {
            Value::Null => self.empty(),
            Value::Array(items) => normalize_array(items),
            Value::Object(object) => {
                if is_entity_like(raw) {
                    return self.single(raw.clone());
                }
                for key in ENVELOPE_KEYS {
                    let Some(inner) = object.get(key) else {
                        continue;
                    };
                    if !is_unwrappable(inner) {
                        continue;
                    }
                    debug!("Unwrapping response envelope '{}'", key);
                    return match inner {
                        Value::Array(items) => normalize_array(items),
                        other => self.single(other.clone()),
                    };
                }
                debug!("No known response shape matched, passing body through");
                Normalized::Unrecognized(raw.clone())
            }
            other => Normalized::Unrecognized(other.clone()),
        }
    }

    fn empty(&self) -> Normalized {
        match self.arity {
            Arity::List => Normalized::List(Vec::new()),
            Arity::Scalar => Normalized::NotFound,
        }
    }

    fn single(&self, item: Value) -> Normalized {
        match self.arity {
            Arity::List => Normalized::List(vec![item]),
            Arity::Scalar => Normalized::Scalar(item),
        }
    }
}

/// Convenience wrapper around [`ResponseNormalizer::normalize`]
#[must_use]
pub fn normalize(raw: &Value, arity: Arity) -> Normalized {
    ResponseNormalizer::new(arity).normalize(raw)
}

fn is_itinerary_list(items: &[Value]) -> bool {
    !items.is_empty() && items.iter().all(Value::is_array)
}

fn entities(items: &[Value]) -> Vec<Value> {
    let kept: Vec<Value> = items.iter().filter(|v| is_entity_like(v)).cloned().collect();
    if kept.len() < items.len() {
        debug!(
            "Dropped {} item(s) failing the shape check",
            items.len() - kept.len()
        );
    }
    kept
}

fn normalize_array(items: &[Value]) -> Normalized {
    if is_itinerary_list(items) {
        let itineraries: Vec<Vec<Value>> = items
            .iter()
            .filter_map(Value::as_array)
            .map(|legs| entities(legs))
            .filter(|legs| !legs.is_empty())
            .collect();
        // Nothing survived: same canonical form as an empty list
        if itineraries.is_empty() {
            return Normalized::List(Vec::new());
        }
        return Normalized::Itineraries(itineraries);
    }
    Normalized::List(entities(items))
}

/// Envelope payloads worth unwrapping: an entity, or an array that is empty,
/// nested, or holds at least one entity
fn is_unwrappable(inner: &Value) -> bool {
    match inner {
        Value::Array(items) => {
            items.is_empty() || is_itinerary_list(items) || items.iter().any(is_entity_like)
        }
        other => is_entity_like(other),
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| ConsoleError::malformed(format!("Unexpected entity format: {e}")))
}

impl Normalized {
    /// Re-serialize the canonical form
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Normalized::Scalar(value) | Normalized::Unrecognized(value) => value.clone(),
            Normalized::List(items) => Value::Array(items.clone()),
            Normalized::Itineraries(itineraries) => Value::Array(
                itineraries
                    .iter()
                    .map(|legs| Value::Array(legs.clone()))
                    .collect(),
            ),
            Normalized::NotFound => Value::Null,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Normalized::Scalar(_) => 1,
            Normalized::List(items) => items.len(),
            Normalized::Itineraries(itineraries) => itineraries.len(),
            Normalized::NotFound | Normalized::Unrecognized(_) => 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decode a collection. Items that do not decode as `T` are dropped.
    pub fn into_items<T: DeserializeOwned>(self) -> Result<Vec<T>> {
        let values = match self {
            Normalized::List(items) => items,
            Normalized::Scalar(item) => vec![item],
            Normalized::NotFound => Vec::new(),
            Normalized::Itineraries(_) => {
                return Err(ConsoleError::malformed(
                    "Expected a flat list but received multi-segment itineraries",
                ));
            }
            Normalized::Unrecognized(raw) => {
                return serde_json::from_value(raw).map_err(|_| {
                    ConsoleError::malformed("Unrecognized response shape for a list")
                });
            }
        };

        let total = values.len();
        let items: Vec<T> = values
            .into_iter()
            .filter_map(|value| match serde_json::from_value(value) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!("Dropping list item that failed to decode: {}", e);
                    None
                }
            })
            .collect();
        if items.len() < total {
            debug!("Decoded {} of {} list items", items.len(), total);
        }
        Ok(items)
    }

    /// Decode the entity echoed by a mutation; an empty body (HTTP 204) is `None`
    pub fn into_optional<T: DeserializeOwned>(self) -> Result<Option<T>> {
        match self {
            Normalized::NotFound => Ok(None),
            other => other.into_single().map(Some),
        }
    }

    /// Decode exactly one entity
    pub fn into_single<T: DeserializeOwned>(self) -> Result<T> {
        match self {
            Normalized::Scalar(item) => decode(item),
            Normalized::List(items) => match items.into_iter().next() {
                Some(first) => decode(first),
                None => Err(ConsoleError::not_found("Empty response")),
            },
            Normalized::NotFound => Err(ConsoleError::not_found("Empty response")),
            Normalized::Itineraries(_) => Err(ConsoleError::malformed(
                "Expected a single entity but received multi-segment itineraries",
            )),
            Normalized::Unrecognized(raw) => decode(raw),
        }
    }
}
