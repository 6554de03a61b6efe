//! The top-level service type: entry point into the resource graph.

use std::sync::Arc;

use crate::auth::Session;
use crate::clients::HttpClient;
use crate::config::AweberConfig;
use crate::resources::{classify, Entry, Resource, ResourceError};

/// Entry point into the AWeber API for one authorized user.
///
/// Wraps a shared, signed [`HttpClient`]; every resource node created
/// through this handle signs its requests with the same credentials.
///
/// # Example
///
/// ```rust,no_run
/// use aweber_api::{AweberApi, AweberConfig, ConsumerKey, ConsumerSecret, Session};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let config = AweberConfig::builder()
///     .consumer_key(ConsumerKey::new("consumer-key")?)
///     .consumer_secret(ConsumerSecret::new("consumer-secret")?)
///     .build()?;
/// let api = AweberApi::new(&config, Session::new("access-token", "token-secret"));
///
/// let mut account = api.account().await?;
/// let lists = account.collection("lists").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AweberApi {
    http: Arc<HttpClient>,
}

// Verify AweberApi is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AweberApi>();
};

impl AweberApi {
    /// Creates a service handle for one authorized user.
    #[must_use]
    pub fn new(config: &AweberConfig, session: Session) -> Self {
        Self {
            http: Arc::new(HttpClient::new(config, session)),
        }
    }

    /// Returns the authorized user's account entry.
    ///
    /// The API scopes every token to exactly one account, so this fetches
    /// the accounts collection and returns its first member.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnexpectedShape`] when the accounts
    /// collection is empty, plus the usual transport errors.
    pub async fn account(&self) -> Result<Entry, ResourceError> {
        let url = "/accounts";
        let body = self.http.get(url, &Vec::new()).await?;
        let Resource::Collection(mut accounts) = classify(body, url, &self.http)? else {
            return Err(ResourceError::UnexpectedShape {
                url: url.to_string(),
            });
        };
        accounts
            .get(0)
            .await?
            .ok_or_else(|| ResourceError::UnexpectedShape {
                url: url.to_string(),
            })
    }

    /// Fetches and classifies an arbitrary resource URL.
    ///
    /// Accepts both relative paths and absolute URLs under the configured
    /// base URL, e.g. a link taken from another resource's data.
    ///
    /// # Errors
    ///
    /// Transport errors propagate; an unclassifiable body is
    /// [`ResourceError::UnexpectedShape`].
    pub async fn load_from_url(&self, url: &str) -> Result<Resource, ResourceError> {
        let path = self.http.relativize(url);
        let body = self.http.get(&path, &Vec::new()).await?;
        classify(body, &path, &self.http)
    }
}
