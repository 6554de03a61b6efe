//! OAuth-signed HTTP transport for the AWeber API.
//!
//! This module provides the [`HttpClient`] type. Every request is signed
//! with the application's consumer credentials and the session's token pair,
//! then dispatched over `reqwest`. Response handling distinguishes the parts
//! of the response callers need: the decoded JSON body, a bare integer
//! count, the `Location` header, or just the status code.

use reqwest::header::{AUTHORIZATION, LOCATION};
use reqwest::Method;
use serde_json::{Map, Value};

use crate::auth::oauth::{self, Credentials};
use crate::auth::Session;
use crate::clients::errors::{api_error_from_body, ApiError, HttpError};
use crate::config::{AweberConfig, ConsumerKey, ConsumerSecret};

/// Query or form parameters as ordered name/value pairs.
///
/// Order is preserved on the wire; OAuth signing sorts its own copy.
pub type Params = Vec<(String, String)>;

/// Crate version, sent in the User-Agent header.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// OAuth-signed HTTP client for making requests to the AWeber API.
///
/// The client handles:
/// - URL construction relative to the configured base URL
/// - OAuth 1.0a signing of every request
/// - Structured API error detection (HTTP >= 400 with a JSON error body)
/// - Response decoding into the shape each call site needs
///
/// The core performs no retries: every transport failure propagates
/// unchanged to the caller.
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`, making it safe to share across async tasks.
#[derive(Debug)]
pub struct HttpClient {
    /// The internal reqwest HTTP client.
    client: reqwest::Client,
    /// Base URL (e.g. `https://api.aweber.com/1.0`), without trailing slash.
    base_url: String,
    /// The application's consumer key.
    consumer_key: ConsumerKey,
    /// The application's consumer secret.
    consumer_secret: ConsumerSecret,
    /// The authorized user's token pair.
    session: Session,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a new signed HTTP client for the given session.
    ///
    /// # Panics
    ///
    /// Panics if the underlying reqwest client cannot be created. This should
    /// only happen in extremely unusual circumstances (e.g. TLS
    /// initialization failure).
    #[must_use]
    pub fn new(config: &AweberConfig, session: Session) -> Self {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .user_agent(format!("AWeber API Rust Library v{SDK_VERSION}"))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.base_url().to_string(),
            consumer_key: config.consumer_key().clone(),
            consumer_secret: config.consumer_secret().clone(),
            session,
        }
    }

    /// Returns the base URL for this client.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the session this client signs requests with.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Strips the base URL prefix from an absolute resource link.
    ///
    /// The API reports `self_link`, pagination links, and `Location` headers
    /// as absolute URLs; resource nodes store them relative to the base.
    #[must_use]
    pub fn relativize(&self, url: &str) -> String {
        url.strip_prefix(&self.base_url)
            .map_or_else(|| url.to_string(), ToString::to_string)
    }

    /// Sends a GET request and returns the decoded JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Api`] when the server reports a structured
    /// error, [`HttpError::Malformed`] when the body is not JSON, and
    /// [`HttpError::Network`] for connection failures.
    pub async fn get(&self, path: &str, params: &Params) -> Result<Value, HttpError> {
        let response = self.dispatch(Method::GET, path, params, None, None).await?;
        let (status, url, text) = Self::into_parts(response).await?;
        let body: Value =
            serde_json::from_str(&text).map_err(|_| HttpError::Malformed { url: url.clone() })?;
        if let Some(error) = api_error_from_body(&body, &url) {
            return Err(HttpError::Api(error));
        }
        check_status(status, &url)?;
        Ok(body)
    }

    /// Sends a GET request and parses the body as a bare integer.
    ///
    /// Used with `ws.show=total_size`, which returns a scalar count instead
    /// of a resource body.
    ///
    /// # Errors
    ///
    /// As for [`get`](Self::get); a non-integer body is reported as
    /// [`HttpError::Malformed`].
    pub async fn get_integer(&self, path: &str, params: &Params) -> Result<u64, HttpError> {
        let body = self.get(path, params).await?;
        let url = self.absolute_url(path);
        body.as_u64()
            .or_else(|| body.as_str().and_then(|text| text.trim().parse().ok()))
            .ok_or(HttpError::Malformed { url })
    }

    /// Sends a POST request with form-encoded parameters and returns the
    /// `Location` header of the response.
    ///
    /// The response body is deliberately discarded: creation and move
    /// operations never trust the POST body as the canonical representation.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::MissingLocation`] when the response lacks the
    /// header, plus the usual transport errors.
    pub async fn post_for_location(&self, path: &str, params: &Params) -> Result<String, HttpError> {
        let response = self
            .dispatch(Method::POST, path, &[], Some(params), None)
            .await?;
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);

        let (status, url, text) = Self::into_parts(response).await?;
        check_error_body(status, &text, &url)?;

        if location.is_none() {
            tracing::warn!(url, "create/move response carried no Location header");
        }
        location.ok_or(HttpError::MissingLocation { url })
    }

    /// Sends a PATCH request with a JSON body and returns the status code.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Api`] for non-2xx responses.
    pub async fn patch(&self, path: &str, body: &Map<String, Value>) -> Result<u16, HttpError> {
        let json = Value::Object(body.clone());
        let response = self
            .dispatch(Method::PATCH, path, &[], None, Some(&json))
            .await?;
        let (status, url, text) = Self::into_parts(response).await?;
        check_error_body(status, &text, &url)?;
        Ok(status)
    }

    /// Sends a DELETE request and returns the status code.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Api`] for non-2xx responses.
    pub async fn delete(&self, path: &str) -> Result<u16, HttpError> {
        let response = self.dispatch(Method::DELETE, path, &[], None, None).await?;
        let (status, url, text) = Self::into_parts(response).await?;
        check_error_body(status, &text, &url)?;
        Ok(status)
    }

    /// Builds, signs, and sends one request.
    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        extra_params: &[(String, String)],
        form: Option<&Params>,
        json: Option<&Value>,
    ) -> Result<reqwest::Response, HttpError> {
        // Query parameters may arrive embedded in the path (find results and
        // named operations store them in the node URL); fold them together
        // with the explicit ones so the signature covers everything.
        let (path_only, mut query) = split_query(path);
        query.extend(extra_params.iter().cloned());

        let url = self.absolute_url(&path_only);

        let mut signed = query.clone();
        if let Some(form) = form {
            signed.extend(form.iter().cloned());
        }
        let credentials = Credentials {
            consumer_key: self.consumer_key.as_ref(),
            consumer_secret: self.consumer_secret.as_ref(),
            token: Some(&self.session.access_token),
            token_secret: &self.session.token_secret,
        };
        let header = oauth::authorization_header(method.as_str(), &url, &signed, &[], &credentials);

        tracing::debug!(method = %method, url = %url, "dispatching API request");

        let mut builder = self.client.request(method, &url).header(AUTHORIZATION, header);
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        if let Some(form) = form {
            builder = builder.form(form);
        }
        if let Some(json) = json {
            builder = builder.json(json);
        }

        Ok(builder.send().await?)
    }

    /// Resolves a resource path against the base URL.
    fn absolute_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// Splits a response into status code, final URL, and body text.
    async fn into_parts(response: reqwest::Response) -> Result<(u16, String, String), HttpError> {
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let text = response.text().await.unwrap_or_default();
        Ok((status, url, text))
    }
}

/// Maps a non-2xx status without a structured error body to a generic
/// [`ApiError`].
fn check_status(status: u16, url: &str) -> Result<(), HttpError> {
    if (200..=299).contains(&status) {
        return Ok(());
    }
    Err(HttpError::Api(ApiError {
        error_type: "UnknownError".to_string(),
        message: format!("HTTP {status}"),
        status: Some(status),
        documentation_url: None,
        url: url.to_string(),
    }))
}

/// Checks a response that is consumed for its status or headers: a non-2xx
/// status surfaces the structured error body when one is present.
fn check_error_body(status: u16, text: &str, url: &str) -> Result<(), HttpError> {
    if (200..=299).contains(&status) {
        return Ok(());
    }
    if let Ok(body) = serde_json::from_str::<Value>(text) {
        if let Some(error) = api_error_from_body(&body, url) {
            return Err(HttpError::Api(error));
        }
    }
    check_status(status, url)
}

/// Splits a path into its path part and decoded query parameters.
pub(crate) fn split_query(path: &str) -> (String, Params) {
    match path.split_once('?') {
        Some((path_only, query)) => (path_only.to_string(), parse_query_pairs(query)),
        None => (path.to_string(), Vec::new()),
    }
}

/// Parses the query-parameter pairs of a URL or bare query string.
pub(crate) fn parse_query(url: &str) -> Params {
    url.split_once('?')
        .map_or_else(Vec::new, |(_, query)| parse_query_pairs(query))
}

fn parse_query_pairs(query: &str) -> Params {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(key), decode(value))
        })
        .collect()
}

/// Renders parameters as a query string, preserving order.
pub(crate) fn encode_query(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn decode(value: &str) -> String {
    urlencoding::decode(value).map_or_else(|_| value.to_string(), |decoded| decoded.into_owned())
}
