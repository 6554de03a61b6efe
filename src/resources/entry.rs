//! A single resource node and its attribute surface.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::clients::{encode_query, HttpClient, Params};
use crate::resources::collection::Collection;
use crate::resources::errors::ResourceError;
use crate::resources::{classify, entry_from_body, parent_url, schema, Resource};

/// Fields the server manages; hidden from [`Entry::attrs`] listings.
const PRIVATE_FIELDS: &[&str] = &["resource_type_link", "http_etag"];

/// A single resource: an account, a list, a subscriber, a message.
///
/// Entries expose their response fields through [`get`](Entry::get), track
/// local modifications as a pending diff until [`save`](Entry::save), and
/// navigate to child collections lazily. Fetched child collections are
/// cached; repeated access performs no further requests.
#[derive(Debug)]
pub struct Entry {
    /// Resource URL, relative to the client's base URL.
    url: String,
    /// The decoded response body for this resource.
    data: Map<String, Value>,
    /// Resource type, derived once at construction.
    resource_type: Option<String>,
    /// Fields modified locally but not yet saved.
    pending_diff: Map<String, Value>,
    /// Child collections fetched so far.
    collections: HashMap<String, Collection>,
    client: Arc<HttpClient>,
}

/// The value of one entry attribute.
///
/// Scalar fields come back by value; array fields and child collections come
/// back as live views so writes and paging flow through the entry.
#[derive(Debug)]
pub enum Attr<'a> {
    /// A scalar or object field, cloned out of the entry data.
    Value(Value),
    /// An array field, wrapped so element writes register in the pending
    /// diff.
    Array(ChildArray<'a>),
    /// A child collection, fetched on first access and cached.
    Collection(&'a mut Collection),
}

impl Entry {
    /// Wraps a decoded single-resource body.
    pub(crate) fn new(data: Map<String, Value>, url: &str, client: Arc<HttpClient>) -> Self {
        let resource_type = derive_type(&data);
        Self {
            url: url.to_string(),
            data,
            resource_type,
            pending_diff: Map::new(),
            collections: HashMap::new(),
            client,
        }
    }

    /// Returns the resource URL, relative to the client's base URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the derived resource type, e.g. `"list"` or `"subscriber"`.
    #[must_use]
    pub fn resource_type(&self) -> Option<&str> {
        self.resource_type.as_deref()
    }

    /// Looks up an attribute by name.
    ///
    /// Resolution order: the pending diff, then the response data, then the
    /// synthetic `type` attribute, then the child collections the schema
    /// allows for this resource type. Child collections are fetched on first
    /// access, which is why this method is async and takes `&mut self`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnknownAttribute`] when the name matches
    /// nothing, and transport errors when a child-collection fetch fails.
    pub async fn get(&mut self, name: &str) -> Result<Attr<'_>, ResourceError> {
        if let Some(value) = self.pending_diff.get(name) {
            return Ok(Attr::Value(value.clone()));
        }

        let is_array = self.data.get(name).is_some_and(Value::is_array);
        if is_array {
            return Ok(Attr::Array(ChildArray {
                entry: self,
                name: name.to_string(),
            }));
        }
        if let Some(value) = self.data.get(name) {
            return Ok(Attr::Value(value.clone()));
        }

        if name == "type" {
            if let Some(resource_type) = &self.resource_type {
                return Ok(Attr::Value(Value::String(resource_type.clone())));
            }
        }

        let is_child = self
            .resource_type
            .as_deref()
            .is_some_and(|resource_type| schema::is_child_of(resource_type, name));
        if is_child {
            return Ok(Attr::Collection(self.collection(name).await?));
        }

        Err(ResourceError::UnknownAttribute {
            name: name.to_string(),
        })
    }

    /// Returns the named child collection, fetching it on first access.
    ///
    /// The collection URL is `{entry_url}/{name}`. The fetched collection is
    /// cached on this entry; a second call returns the cached node without a
    /// request.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnknownChild`] when the schema does not list
    /// `name` under this resource type, and
    /// [`ResourceError::UnexpectedShape`] when the child URL does not
    /// respond with a collection.
    pub async fn collection(&mut self, name: &str) -> Result<&mut Collection, ResourceError> {
        let allowed = self
            .resource_type
            .as_deref()
            .is_some_and(|resource_type| schema::is_child_of(resource_type, name));
        if !allowed {
            return Err(ResourceError::UnknownChild {
                name: name.to_string(),
            });
        }

        if !self.collections.contains_key(name) {
            let url = format!("{}/{name}", self.url);
            let body = self.client.get(&url, &Vec::new()).await?;
            let Resource::Collection(collection) = classify(body, &url, &self.client)? else {
                return Err(ResourceError::UnexpectedShape { url });
            };
            self.collections.insert(name.to_string(), collection);
        }

        self.collections
            .get_mut(name)
            .ok_or_else(|| ResourceError::UnknownChild {
                name: name.to_string(),
            })
    }

    /// Stages a new value for an existing field.
    ///
    /// The write lands in both the local data and the pending diff;
    /// [`save`](Entry::save) sends the diff to the server.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnknownAttribute`] when the field does not
    /// exist on this resource.
    pub fn set(&mut self, name: &str, value: Value) -> Result<(), ResourceError> {
        if !self.data.contains_key(name) {
            return Err(ResourceError::UnknownAttribute {
                name: name.to_string(),
            });
        }
        self.data.insert(name.to_string(), value.clone());
        self.pending_diff.insert(name.to_string(), value);
        Ok(())
    }

    /// Sends the pending diff to the server as a PATCH and clears it.
    ///
    /// A clean entry saves without a request.
    ///
    /// # Errors
    ///
    /// Transport errors propagate; the diff is cleared only on success.
    pub async fn save(&mut self) -> Result<(), ResourceError> {
        if self.pending_diff.is_empty() {
            return Ok(());
        }
        self.client.patch(&self.url, &self.pending_diff).await?;
        self.pending_diff.clear();
        Ok(())
    }

    /// Deletes this resource on the server.
    ///
    /// # Errors
    ///
    /// Transport errors propagate unchanged.
    pub async fn delete(&self) -> Result<(), ResourceError> {
        self.client.delete(&self.url).await?;
        Ok(())
    }

    /// Moves a subscriber to another list.
    ///
    /// Issues `ws.op=move` against this subscriber with the target list's
    /// `self_link`, then follows the `Location` header and fetches the moved
    /// resource. The response body of the move itself is never used.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnexpectedShape`] when the target list has
    /// no `self_link`, plus the usual transport errors.
    pub async fn move_to(
        &self,
        list: &Self,
        last_followup_message_number_sent: Option<u64>,
    ) -> Result<Self, ResourceError> {
        let Some(list_link) = list.data.get("self_link").and_then(Value::as_str) else {
            return Err(ResourceError::UnexpectedShape {
                url: list.url.clone(),
            });
        };

        let mut params: Params = vec![
            ("ws.op".to_string(), "move".to_string()),
            ("list_link".to_string(), list_link.to_string()),
        ];
        if let Some(number) = last_followup_message_number_sent {
            params.push((
                "last_followup_message_number_sent".to_string(),
                number.to_string(),
            ));
        }

        let location = self.client.post_for_location(&self.url, &params).await?;
        let moved_url = self.client.relativize(&location);
        let body = self.client.get(&moved_url, &Vec::new()).await?;
        entry_from_body(body, &moved_url, &self.client)
    }

    /// Searches across all of an account's lists for matching subscribers.
    ///
    /// Only account entries support this.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnsupportedOperation`] on any other resource
    /// type.
    pub async fn find_subscribers(
        &self,
        filters: &[(String, String)],
    ) -> Result<Collection, ResourceError> {
        self.require_type("account", "findSubscribers")?;
        self.named_collection_op("findSubscribers", filters).await
    }

    /// Fetches the activity feed of a subscriber.
    ///
    /// Only subscriber entries support this.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnsupportedOperation`] on any other resource
    /// type.
    pub async fn get_activity(&self) -> Result<Collection, ResourceError> {
        self.require_type("subscriber", "getActivity")?;
        self.named_collection_op("getActivity", &[]).await
    }

    /// Fetches every web form across all of an account's lists.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnsupportedOperation`] on any resource type
    /// other than `account`.
    pub async fn get_web_forms(&self) -> Result<Vec<Self>, ResourceError> {
        self.require_type("account", "getWebForms")?;
        self.entry_list_op("getWebForms").await
    }

    /// Fetches every web form split test across all of an account's lists.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnsupportedOperation`] on any resource type
    /// other than `account`.
    pub async fn get_web_form_split_tests(&self) -> Result<Vec<Self>, ResourceError> {
        self.require_type("account", "getWebFormSplitTests")?;
        self.entry_list_op("getWebFormSplitTests").await
    }

    /// Fetches the parent entry of this resource.
    ///
    /// The parent URL is this URL minus two path segments (the collection
    /// name and this entry's id). Returns `None` at the top of the hierarchy
    /// and on any fetch or classification failure.
    pub async fn parent(&self) -> Option<Self> {
        let url = parent_url(&self.url, 2)?;
        let body = self.client.get(&url, &Vec::new()).await.ok()?;
        match classify(body, &url, &self.client) {
            Ok(Resource::Entry(entry)) => Some(entry),
            _ => None,
        }
    }

    /// Returns the visible attributes of this entry.
    ///
    /// Server-managed bookkeeping fields and `*collection_link` fields are
    /// omitted; legal child collections appear with the placeholder value
    /// `"collection"`.
    #[must_use]
    pub fn attrs(&self) -> BTreeMap<String, Value> {
        let mut attrs: BTreeMap<String, Value> = self
            .data
            .iter()
            .filter(|(name, _)| {
                !PRIVATE_FIELDS.contains(&name.as_str()) && !name.ends_with("collection_link")
            })
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        if let Some(resource_type) = &self.resource_type {
            for child in schema::children_of(resource_type) {
                attrs.insert((*child).to_string(), json!("collection"));
            }
        }
        attrs
    }

    /// Returns `true` when local modifications have not been saved yet.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.pending_diff.is_empty()
    }

    fn require_type(
        &self,
        expected: &str,
        operation: &'static str,
    ) -> Result<(), ResourceError> {
        if self.resource_type.as_deref() == Some(expected) {
            return Ok(());
        }
        Err(ResourceError::UnsupportedOperation {
            operation,
            resource_type: self.resource_type.clone().unwrap_or_default(),
        })
    }

    /// Runs a named operation that responds with a collection body.
    ///
    /// The collection's total size arrives from a second request with
    /// `ws.show=total_size`, which the API answers with a bare integer.
    async fn named_collection_op(
        &self,
        op: &str,
        filters: &[(String, String)],
    ) -> Result<Collection, ResourceError> {
        let mut params: Params = filters.to_vec();
        params.push(("ws.op".to_string(), op.to_string()));

        let mut body = self.client.get(&self.url, &params).await?;

        let mut size_params = params.clone();
        size_params.push(("ws.show".to_string(), "total_size".to_string()));
        let total_size = self.client.get_integer(&self.url, &size_params).await?;
        if let Some(data) = body.as_object_mut() {
            data.insert("total_size".to_string(), json!(total_size));
        }

        let url = format!("{}?{}", self.url, encode_query(&params));
        let Resource::Collection(collection) = classify(body, &url, &self.client)? else {
            return Err(ResourceError::UnexpectedShape { url });
        };
        Ok(collection)
    }

    /// Runs a named operation that responds with a bare array of entries.
    async fn entry_list_op(&self, op: &str) -> Result<Vec<Self>, ResourceError> {
        let params: Params = vec![("ws.op".to_string(), op.to_string())];
        let body = self.client.get(&self.url, &params).await?;

        let url = format!("{}?{}", self.url, encode_query(&params));
        let Value::Array(items) = body else {
            return Err(ResourceError::UnexpectedShape { url });
        };

        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            let Some(link) = item.get("self_link").and_then(Value::as_str) else {
                return Err(ResourceError::UnexpectedShape { url });
            };
            let entry_url = self.client.relativize(link);
            entries.push(entry_from_body(item, &entry_url, &self.client)?);
        }
        Ok(entries)
    }
}

/// Derives the resource type from the response data.
///
/// `resource_type_link` ends in `#<type>`; broadcasts carry no such link and
/// are recognized by their `broadcast_id`.
fn derive_type(data: &Map<String, Value>) -> Option<String> {
    if let Some(link) = data.get("resource_type_link").and_then(Value::as_str) {
        return link
            .rsplit_once('#')
            .map(|(_, resource_type)| resource_type.to_string());
    }
    if data.contains_key("broadcast_id") {
        return Some("broadcast".to_string());
    }
    None
}

/// A live view over an array-valued entry field.
///
/// Element writes go through the owning entry, so they land in both the
/// entry data and the pending diff and are sent on the next
/// [`save`](Entry::save).
#[derive(Debug)]
pub struct ChildArray<'a> {
    entry: &'a mut Entry,
    name: String,
}

impl ChildArray<'_> {
    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items().map_or(0, Vec::len)
    }

    /// Returns `true` when the array has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a clone of the element at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Value> {
        self.items().and_then(|items| items.get(index)).cloned()
    }

    /// Iterates over the elements.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items().map(Vec::as_slice).unwrap_or_default().iter()
    }

    /// Replaces the element at `index`, staging the whole array in the
    /// pending diff. Returns `false` when `index` is out of bounds.
    pub fn set(&mut self, index: usize, value: Value) -> bool {
        let Some(mut items) = self.items().cloned() else {
            return false;
        };
        if index >= items.len() {
            return false;
        }
        items[index] = value;
        self.write_back(items);
        true
    }

    /// Appends an element, staging the whole array in the pending diff.
    pub fn push(&mut self, value: Value) {
        let mut items = self.items().cloned().unwrap_or_default();
        items.push(value);
        self.write_back(items);
    }

    fn items(&self) -> Option<&Vec<Value>> {
        self.entry.data.get(&self.name).and_then(Value::as_array)
    }

    fn write_back(&mut self, items: Vec<Value>) {
        let value = Value::Array(items);
        self.entry.data.insert(self.name.clone(), value.clone());
        self.entry.pending_diff.insert(self.name.clone(), value);
    }
}
