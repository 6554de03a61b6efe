//! A paged collection node and its lazy fetch engine.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::clients::{encode_query, parse_query, HttpClient, Params};
use crate::resources::entry::Entry;
use crate::resources::errors::ResourceError;
use crate::resources::{classify, entry_from_body, parent_url, Resource};

/// Paging bookkeeping fields; hidden from [`Collection::attrs`] listings.
const PRIVATE_FIELDS: &[&str] = &["entries", "start", "next_collection_link"];

/// Keys that move between cached pages when a new window is fetched.
const PAGE_FIELDS: &[&str] = &[
    "entries",
    "next_collection_link",
    "prev_collection_link",
    "start",
];

/// An ordered, lazily paged sequence of entries.
///
/// A collection holds one page of entries at a time. Indexing with
/// [`get`](Collection::get) serves from the cached page when it can and
/// refetches the containing page when it cannot; callers never deal with
/// page boundaries.
#[derive(Debug)]
pub struct Collection {
    /// Collection URL, relative to the client's base URL. Find results and
    /// named operations keep their parameters in the query string.
    url: String,
    /// The decoded response body for the cached page.
    data: Map<String, Value>,
    /// Entries per page, derived once at construction.
    page_size: usize,
    /// Absolute index of the first cached entry.
    page_start: usize,
    client: Arc<HttpClient>,
}

impl Collection {
    /// Wraps a decoded collection body.
    ///
    /// The page size is derived once, from the `ws.size` parameter of the
    /// next page link (or the previous one, or this collection's own URL),
    /// falling back to the length of the cached entries.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnexpectedShape`] when the body is not a
    /// JSON object.
    pub(crate) fn new(
        body: Value,
        url: &str,
        client: Arc<HttpClient>,
    ) -> Result<Self, ResourceError> {
        let Value::Object(data) = body else {
            return Err(ResourceError::UnexpectedShape {
                url: url.to_string(),
            });
        };

        let page_size = derive_page_size(&data, url);
        let page_start = data
            .get("start")
            .and_then(Value::as_u64)
            .and_then(|start| usize::try_from(start).ok())
            .unwrap_or(0);

        Ok(Self {
            url: url.to_string(),
            data,
            page_size,
            page_start,
            client,
        })
    }

    /// Returns the collection URL, relative to the client's base URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the total number of entries across all pages, when the
    /// cached data reports one.
    #[must_use]
    pub fn total_size(&self) -> Option<u64> {
        let value = self.data.get("total_size")?;
        value
            .as_u64()
            .or_else(|| value.as_str()?.trim().parse().ok())
    }

    /// Returns the collection's resource type, taken from the last path
    /// segment of its URL (e.g. `"subscribers"`).
    #[must_use]
    pub fn resource_type(&self) -> &str {
        let base = self.url.split('?').next().unwrap_or(&self.url);
        base.rsplit('/').next().unwrap_or(base)
    }

    /// Returns the entry at an absolute index, fetching its page on demand.
    ///
    /// Returns `Ok(None)` for indexes at or past the reported total size,
    /// and for indexes the fetched page does not cover.
    ///
    /// # Errors
    ///
    /// Transport and classification errors from a page fetch propagate.
    pub async fn get(&mut self, index: usize) -> Result<Option<Entry>, ResourceError> {
        let in_range = self
            .total_size()
            .is_some_and(|total| (index as u64) < total);
        if !in_range || self.page_size == 0 {
            return Ok(None);
        }

        let page = index / self.page_size * self.page_size;
        if page != self.page_start {
            self.fetch_page(index).await?;
        }

        let Some(offset) = index.checked_sub(self.page_start) else {
            return Ok(None);
        };
        let Some(item) = self
            .data
            .get("entries")
            .and_then(Value::as_array)
            .and_then(|entries| entries.get(offset))
        else {
            return Ok(None);
        };

        let Some(link) = item.get("self_link").and_then(Value::as_str) else {
            return Err(ResourceError::UnexpectedShape {
                url: self.url.clone(),
            });
        };
        let entry_url = self.client.relativize(link);
        entry_from_body(item.clone(), &entry_url, &self.client).map(Some)
    }

    /// Replaces the cached page with the one containing `index`.
    ///
    /// The request parameters come from the next page link, with `ws.start`
    /// adjusted to the target page boundary. Collections with no next link
    /// have nothing to fetch and return quietly.
    async fn fetch_page(&mut self, index: usize) -> Result<(), ResourceError> {
        let Some(link) = self
            .data
            .get("next_collection_link")
            .and_then(Value::as_str)
        else {
            return Ok(());
        };

        let mut params = normalize_page_params(parse_query(link));
        let size = params
            .iter()
            .find(|(key, _)| key == "ws.size")
            .and_then(|(_, value)| value.parse::<usize>().ok())
            .unwrap_or(self.page_size);
        if size == 0 {
            return Ok(());
        }

        let start = index / size * size;
        set_param(&mut params, "ws.start", &start.to_string());

        let base = self.url.split('?').next().unwrap_or(&self.url).to_string();
        tracing::debug!(url = %base, start, size, "fetching collection page");
        let body = self.client.get(&base, &params).await?;
        let Value::Object(new_data) = body else {
            return Err(ResourceError::UnexpectedShape { url: base });
        };

        // Only paging fields move; query metadata such as total_size stays
        // from the original response. A field transfers only when both the
        // old and the new page carry it.
        for key in PAGE_FIELDS {
            if self.data.contains_key(*key) {
                if let Some(value) = new_data.get(*key) {
                    self.data.insert((*key).to_string(), value.clone());
                }
            }
        }

        self.page_start = start;
        self.page_size = size;
        Ok(())
    }

    /// Searches this collection with field filters (`ws.op=find`).
    ///
    /// The result is a new collection whose URL embeds the search
    /// parameters; paging through it keeps the filters applied. Its total
    /// size arrives from a second request with `ws.show=total_size`.
    ///
    /// # Errors
    ///
    /// Transport errors propagate; a non-collection response is
    /// [`ResourceError::UnexpectedShape`].
    pub async fn find(&self, filters: &[(String, String)]) -> Result<Self, ResourceError> {
        let mut params: Params = filters.to_vec();
        params.push(("ws.op".to_string(), "find".to_string()));

        let base = self.url.split('?').next().unwrap_or(&self.url).to_string();
        let mut body = self.client.get(&base, &params).await?;

        let mut size_params = params.clone();
        size_params.push(("ws.show".to_string(), "total_size".to_string()));
        let total_size = self.client.get_integer(&base, &size_params).await?;
        if let Some(data) = body.as_object_mut() {
            data.insert("total_size".to_string(), json!(total_size));
        }

        let url = format!("{base}?{}", encode_query(&params));
        let Resource::Collection(collection) = classify(body, &url, &self.client)? else {
            return Err(ResourceError::UnexpectedShape { url });
        };
        Ok(collection)
    }

    /// Creates a new resource in this collection (`ws.op=create`).
    ///
    /// The canonical representation comes from following the `Location`
    /// header of the response and fetching it; the POST body is never
    /// trusted.
    ///
    /// # Errors
    ///
    /// Transport errors propagate, including
    /// [`HttpError::MissingLocation`](crate::HttpError::MissingLocation)
    /// when the response carries no `Location` header.
    pub async fn create(&self, fields: &[(String, String)]) -> Result<Entry, ResourceError> {
        let mut params: Params = vec![("ws.op".to_string(), "create".to_string())];
        params.extend(fields.iter().cloned());

        let base = self.url.split('?').next().unwrap_or(&self.url).to_string();
        let location = self.client.post_for_location(&base, &params).await?;
        let entry_url = self.client.relativize(&location);
        let body = self.client.get(&entry_url, &Vec::new()).await?;
        entry_from_body(body, &entry_url, &self.client)
    }

    /// Fetches one member of this collection by id, bypassing paging.
    ///
    /// # Errors
    ///
    /// Transport errors propagate; a body without the single-resource shape
    /// is [`ResourceError::UnexpectedShape`].
    pub async fn get_by_id(&self, id: u64) -> Result<Entry, ResourceError> {
        let base = self.url.split('?').next().unwrap_or(&self.url);
        let url = format!("{base}/{id}");
        let body = self.client.get(&url, &Vec::new()).await?;
        entry_from_body(body, &url, &self.client)
    }

    /// Fetches the entry that owns this collection.
    ///
    /// The parent URL is this URL minus its last path segment. Returns
    /// `None` at the top of the hierarchy and on any fetch or
    /// classification failure.
    pub async fn parent(&self) -> Option<Entry> {
        let url = parent_url(&self.url, 1)?;
        let body = self.client.get(&url, &Vec::new()).await.ok()?;
        match classify(body, &url, &self.client) {
            Ok(Resource::Entry(entry)) => Some(entry),
            _ => None,
        }
    }

    /// Returns a cursor over all entries, paging transparently.
    pub fn entries(&mut self) -> Entries<'_> {
        Entries {
            collection: self,
            index: 0,
        }
    }

    /// Returns the visible attributes of this collection.
    ///
    /// Paging bookkeeping fields are omitted.
    #[must_use]
    pub fn attrs(&self) -> BTreeMap<String, Value> {
        self.data
            .iter()
            .filter(|(name, _)| !PRIVATE_FIELDS.contains(&name.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

/// A cursor over a collection's entries, in absolute index order.
///
/// Advancing past the cached page triggers a page fetch through the
/// underlying collection.
#[derive(Debug)]
pub struct Entries<'a> {
    collection: &'a mut Collection,
    index: usize,
}

impl Entries<'_> {
    /// Returns the next entry, or `None` past the end of the collection.
    ///
    /// # Errors
    ///
    /// Page-fetch errors propagate; the cursor does not advance on error.
    pub async fn next(&mut self) -> Result<Option<Entry>, ResourceError> {
        let entry = self.collection.get(self.index).await?;
        if entry.is_some() {
            self.index += 1;
        }
        Ok(entry)
    }

    /// Resets the cursor to the first entry.
    pub fn rewind(&mut self) {
        self.index = 0;
    }
}

/// Derives the fixed page size for a collection.
///
/// Pagination links carry the requested size as `ws.size`; responses that
/// round-tripped through form decoding report it as `ws_size`, so both
/// spellings are accepted. Without any link parameter the cached entry
/// count is the page size.
fn derive_page_size(data: &Map<String, Value>, url: &str) -> usize {
    let link = data
        .get("next_collection_link")
        .and_then(Value::as_str)
        .or_else(|| data.get("prev_collection_link").and_then(Value::as_str))
        .unwrap_or(url);

    let from_link = parse_query(link)
        .into_iter()
        .find(|(key, _)| key == "ws.size" || key == "ws_size")
        .and_then(|(_, value)| value.parse::<usize>().ok());

    from_link.unwrap_or_else(|| {
        data.get("entries")
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    })
}

/// Rewrites form-decoded parameter spellings back to their wire form.
fn normalize_page_params(params: Params) -> Params {
    params
        .into_iter()
        .map(|(key, value)| {
            let key = match key.as_str() {
                "ws_size" => "ws.size".to_string(),
                "ws_start" => "ws.start".to_string(),
                _ => key,
            };
            (key, value)
        })
        .collect()
}

fn set_param(params: &mut Params, name: &str, value: &str) {
    for (key, existing) in params.iter_mut() {
        if key == name {
            *existing = value.to_string();
            return;
        }
    }
    params.push((name.to_string(), value.to_string()));
}
