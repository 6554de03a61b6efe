//! The resource graph: entries, collections, and response classification.
//!
//! Every successful API response decodes into one of two node shapes:
//!
//! - [`Entry`]: a single resource (an account, a list, a subscriber)
//! - [`Collection`]: an ordered, lazily paged sequence of entries
//!
//! [`classify`] inspects a decoded body and produces the matching node.
//! Nodes hold a shared handle to the signed [`HttpClient`] so navigation
//! (child collections, parents, paging) can fetch on demand.

pub mod schema;

mod collection;
mod entry;
mod errors;

use std::sync::Arc;

use serde_json::Value;

use crate::clients::{api_error_from_body, HttpClient};

pub use collection::{Collection, Entries};
pub use entry::{Attr, ChildArray, Entry};
pub use errors::ResourceError;

/// A classified API response: either a single entry or a paged collection.
#[derive(Debug)]
pub enum Resource {
    /// A single resource.
    Entry(Entry),
    /// A paged sequence of resources.
    Collection(Collection),
}

/// Classifies a decoded response body as an entry or a collection.
///
/// Classification runs in a fixed order:
///
/// 1. A structured error body fails immediately, regardless of any other
///    keys present.
/// 2. A body whose `id` or `broadcast_id` is present and non-empty is an
///    entry. Empty means JSON null, `""`, `0`, `false`, or an empty array.
/// 3. A body with an `entries` key is a collection.
/// 4. Anything else is [`ResourceError::UnexpectedShape`].
///
/// # Errors
///
/// Returns [`ResourceError::Http`] for error bodies and
/// [`ResourceError::UnexpectedShape`] for unclassifiable bodies.
pub fn classify(
    body: Value,
    url: &str,
    client: &Arc<HttpClient>,
) -> Result<Resource, ResourceError> {
    if let Some(error) = api_error_from_body(&body, url) {
        return Err(error.into());
    }

    let has_identity = body
        .get("id")
        .or_else(|| body.get("broadcast_id"))
        .is_some_and(is_present);
    if has_identity {
        return Ok(Resource::Entry(entry_from_body(body, url, client)?));
    }

    if body.get("entries").is_some() {
        return Ok(Resource::Collection(Collection::new(
            body,
            url,
            Arc::clone(client),
        )?));
    }

    Err(ResourceError::UnexpectedShape {
        url: url.to_string(),
    })
}

/// Builds an [`Entry`] from a body already known to be a single resource.
pub(crate) fn entry_from_body(
    body: Value,
    url: &str,
    client: &Arc<HttpClient>,
) -> Result<Entry, ResourceError> {
    let Value::Object(data) = body else {
        return Err(ResourceError::UnexpectedShape {
            url: url.to_string(),
        });
    };
    Ok(Entry::new(data, url, Arc::clone(client)))
}

/// An identity field counts only when present with a non-empty value.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64() != Some(0.0),
        Value::String(text) => !text.is_empty() && text != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

/// Strips `segments` trailing path segments from a resource URL.
///
/// Returns `None` when the URL does not have that many segments left. Any
/// query string is removed first; parent URLs never carry one.
pub(crate) fn parent_url(url: &str, segments: usize) -> Option<String> {
    let mut parent = url.split('?').next().unwrap_or(url);
    for _ in 0..segments {
        let cut = parent.rfind('/')?;
        parent = &parent[..cut];
    }
    if parent.is_empty() {
        return None;
    }
    Some(parent.to_string())
}
