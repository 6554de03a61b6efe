//! OAuth 1.0a request signing (RFC 5849).
//!
//! Every API call carries an `Authorization: OAuth ...` header whose
//! `oauth_signature` is an HMAC-SHA1 over the signature base string: the
//! uppercased method, the percent-encoded request URL (without query), and
//! the sorted, percent-encoded request parameters.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha1::Sha1;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha1 = Hmac<Sha1>;

/// The OAuth credentials used to sign one request.
///
/// `token` is absent only while obtaining a request token; `token_secret` is
/// empty in that same phase (the signing key still ends with `&`).
#[derive(Clone, Copy, Debug)]
pub struct Credentials<'a> {
    /// The application's consumer key.
    pub consumer_key: &'a str,
    /// The application's consumer secret.
    pub consumer_secret: &'a str,
    /// The request or access token, when one has been issued.
    pub token: Option<&'a str>,
    /// The secret paired with `token`, or `""` before one exists.
    pub token_secret: &'a str,
}

/// Percent-encodes a string per RFC 3986 (the unreserved set stays literal).
#[must_use]
pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Builds the signature base string over a request.
///
/// `url` must not contain a query string; all query and form parameters are
/// passed via `params`.
#[must_use]
pub fn signature_base_string(method: &str, url: &str, params: &[(String, String)]) -> String {
    let mut pairs: Vec<(String, String)> = params
        .iter()
        .map(|(key, value)| (percent_encode(key), percent_encode(value)))
        .collect();
    pairs.sort();

    let normalized = pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(url),
        percent_encode(&normalized)
    )
}

/// Signs a base string with HMAC-SHA1 and returns the base64 signature.
#[must_use]
pub fn sign(base_string: &str, consumer_secret: &str, token_secret: &str) -> String {
    let key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );
    let mut mac =
        HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(base_string.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Generates a random alphanumeric nonce.
#[must_use]
pub fn nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Seconds since the Unix epoch.
fn timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}

/// Builds the `Authorization: OAuth ...` header value for one request.
///
/// `params` are the request's query and form parameters (they participate in
/// the signature but stay out of the header); `extra_oauth` carries protocol
/// parameters beyond the standard set, such as `oauth_callback` or
/// `oauth_verifier` during the token exchange.
#[must_use]
pub fn authorization_header(
    method: &str,
    url: &str,
    params: &[(String, String)],
    extra_oauth: &[(String, String)],
    credentials: &Credentials<'_>,
) -> String {
    header_with(
        method,
        url,
        params,
        extra_oauth,
        credentials,
        &nonce(),
        timestamp(),
    )
}

/// Deterministic variant of [`authorization_header`] used by tests.
pub(crate) fn header_with(
    method: &str,
    url: &str,
    params: &[(String, String)],
    extra_oauth: &[(String, String)],
    credentials: &Credentials<'_>,
    nonce: &str,
    timestamp: u64,
) -> String {
    let mut oauth_params: Vec<(String, String)> = vec![
        (
            "oauth_consumer_key".to_string(),
            credentials.consumer_key.to_string(),
        ),
        ("oauth_nonce".to_string(), nonce.to_string()),
        (
            "oauth_signature_method".to_string(),
            "HMAC-SHA1".to_string(),
        ),
        ("oauth_timestamp".to_string(), timestamp.to_string()),
        ("oauth_version".to_string(), "1.0".to_string()),
    ];
    if let Some(token) = credentials.token {
        oauth_params.push(("oauth_token".to_string(), token.to_string()));
    }
    oauth_params.extend(extra_oauth.iter().cloned());

    let mut signed_params = params.to_vec();
    signed_params.extend(oauth_params.iter().cloned());

    let base = signature_base_string(method, url, &signed_params);
    let signature = sign(
        &base,
        credentials.consumer_secret,
        credentials.token_secret,
    );
    oauth_params.push(("oauth_signature".to_string(), signature));
    oauth_params.sort();

    let rendered = oauth_params
        .iter()
        .map(|(key, value)| format!("{}=\"{}\"", percent_encode(key), percent_encode(value)))
        .collect::<Vec<_>>()
        .join(", ");

    format!("OAuth {rendered}")
}
