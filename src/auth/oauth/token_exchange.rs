//! OAuth 1.0a token exchange.
//!
//! Implements the three-step authorization dance against the AWeber auth
//! service: obtain a request token, send the user to the authorize URL, then
//! trade the verified request token for an access token.
//!
//! ```rust,ignore
//! use aweber_api::auth::oauth::{authorize_url, get_access_token, get_request_token};
//!
//! let pair = get_request_token(&config, "https://my-app.example/callback").await?;
//! // Redirect the user to:
//! let url = authorize_url(&config, Some(&pair.token));
//! // After the user approves, exchange for an access token:
//! let access = get_access_token(&config, &pair.token, &pair.secret, &verifier).await?;
//! let session = Session::from(access);
//! ```

use serde::{Deserialize, Serialize};

use crate::auth::oauth::error::OAuthError;
use crate::auth::oauth::sign::{self, Credentials};
use crate::config::AweberConfig;

/// A token and its matching secret, as returned by a token endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// The `oauth_token` value.
    pub token: String,
    /// The `oauth_token_secret` value.
    pub secret: String,
}

/// Credentials recovered from an application authorization code.
///
/// Distributed apps receive a single `|`-separated string from the
/// authorization page instead of running the callback flow themselves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppCredentials {
    /// The application's consumer key.
    pub consumer_key: String,
    /// The application's consumer secret.
    pub consumer_secret: String,
    /// The request token issued for this authorization.
    pub request_token: String,
    /// The secret paired with the request token.
    pub token_secret: String,
    /// The verifier proving the user approved the request.
    pub verifier: String,
}

/// Parses a `key|secret|token|token_secret|verifier` authorization code.
///
/// # Errors
///
/// Returns [`OAuthError::MalformedCredentials`] if the string has fewer than
/// five segments.
pub fn parse_authorization_code(code: &str) -> Result<AppCredentials, OAuthError> {
    let segments: Vec<&str> = code.split('|').collect();
    if segments.len() < 5 {
        return Err(OAuthError::MalformedCredentials);
    }
    Ok(AppCredentials {
        consumer_key: segments[0].to_string(),
        consumer_secret: segments[1].to_string(),
        request_token: segments[2].to_string(),
        token_secret: segments[3].to_string(),
        verifier: segments[4].to_string(),
    })
}

/// Returns the URL a user must visit to authorize the application.
///
/// Appends the request token as `oauth_token` when one is provided.
#[must_use]
pub fn authorize_url(config: &AweberConfig, request_token: Option<&str>) -> String {
    request_token.map_or_else(
        || config.authorize_url().to_string(),
        |token| format!("{}?oauth_token={token}", config.authorize_url()),
    )
}

/// Requests a new request token, associating `callback_url` with it.
///
/// # Errors
///
/// Returns [`OAuthError::Rejected`] when the endpoint responds with a non-2xx
/// status and [`OAuthError::DataMissing`] when the response omits the token
/// or its secret.
pub async fn get_request_token(
    config: &AweberConfig,
    callback_url: &str,
) -> Result<TokenPair, OAuthError> {
    let extra = vec![("oauth_callback".to_string(), callback_url.to_string())];
    exchange(config, config.request_token_url(), &extra, None, "").await
}

/// Exchanges a verified request token for an access token.
///
/// # Errors
///
/// Returns [`OAuthError::Rejected`] when the endpoint responds with a non-2xx
/// status and [`OAuthError::DataMissing`] when the response omits the token
/// or its secret.
pub async fn get_access_token(
    config: &AweberConfig,
    request_token: &str,
    token_secret: &str,
    verifier: &str,
) -> Result<TokenPair, OAuthError> {
    let extra = vec![("oauth_verifier".to_string(), verifier.to_string())];
    exchange(
        config,
        config.access_token_url(),
        &extra,
        Some(request_token),
        token_secret,
    )
    .await
}

/// POSTs a signed request to a token endpoint and parses the form-encoded
/// response.
async fn exchange(
    config: &AweberConfig,
    url: &str,
    extra_oauth: &[(String, String)],
    token: Option<&str>,
    token_secret: &str,
) -> Result<TokenPair, OAuthError> {
    let credentials = Credentials {
        consumer_key: config.consumer_key().as_ref(),
        consumer_secret: config.consumer_secret().as_ref(),
        token,
        token_secret,
    };
    let header = sign::authorization_header("POST", url, &[], extra_oauth, &credentials);

    tracing::debug!(url, "requesting OAuth token");

    let client = reqwest::Client::builder()
        .use_rustls_tls()
        .build()
        .expect("Failed to create HTTP client");
    let response = client
        .post(url)
        .header(reqwest::header::AUTHORIZATION, header)
        .send()
        .await?;

    let status = response.status().as_u16();
    let body = response.text().await?;
    if !(200..=299).contains(&status) {
        return Err(OAuthError::Rejected { status, body });
    }

    parse_token_response(&body)
}

/// Parses `oauth_token=...&oauth_token_secret=...` out of a response body.
fn parse_token_response(body: &str) -> Result<TokenPair, OAuthError> {
    let mut token = None;
    let mut secret = None;
    for pair in body.trim().split('&') {
        let mut parts = pair.splitn(2, '=');
        match (parts.next(), parts.next()) {
            (Some("oauth_token"), Some(value)) => token = Some(decode(value)),
            (Some("oauth_token_secret"), Some(value)) => secret = Some(decode(value)),
            _ => {}
        }
    }

    match (token, secret) {
        (Some(token), Some(secret)) => Ok(TokenPair { token, secret }),
        (None, Some(_)) => Err(OAuthError::DataMissing {
            missing: "oauth_token".to_string(),
        }),
        (Some(_), None) => Err(OAuthError::DataMissing {
            missing: "oauth_token_secret".to_string(),
        }),
        (None, None) => Err(OAuthError::DataMissing {
            missing: "oauth_token, oauth_token_secret".to_string(),
        }),
    }
}

fn decode(value: &str) -> String {
    urlencoding::decode(value).map_or_else(|_| value.to_string(), |decoded| decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConsumerKey, ConsumerSecret};

    fn build_config() -> AweberConfig {
        AweberConfig::builder()
            .consumer_key(ConsumerKey::new("key").unwrap())
            .consumer_secret(ConsumerSecret::new("secret").unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_parse_token_response_extracts_pair() {
        let pair = parse_token_response("oauth_token=abc&oauth_token_secret=xyz").unwrap();
        assert_eq!(pair.token, "abc");
        assert_eq!(pair.secret, "xyz");
    }

    #[test]
    fn test_parse_token_response_decodes_values() {
        let pair = parse_token_response("oauth_token=a%2Bb&oauth_token_secret=x%2Fy").unwrap();
        assert_eq!(pair.token, "a+b");
        assert_eq!(pair.secret, "x/y");
    }

    #[test]
    fn test_parse_token_response_reports_missing_fields() {
        let result = parse_token_response("oauth_token=abc");
        assert!(
            matches!(result, Err(OAuthError::DataMissing { missing }) if missing == "oauth_token_secret")
        );

        let result = parse_token_response("unrelated=1");
        assert!(matches!(result, Err(OAuthError::DataMissing { .. })));
    }

    #[test]
    fn test_authorize_url_appends_request_token() {
        let config = build_config();
        assert_eq!(
            authorize_url(&config, Some("req-token")),
            "https://auth.aweber.com/1.0/oauth/authorize?oauth_token=req-token"
        );
        assert_eq!(
            authorize_url(&config, None),
            "https://auth.aweber.com/1.0/oauth/authorize"
        );
    }

    #[test]
    fn test_parse_authorization_code() {
        let code = "ck|cs|rt|ts|ver";
        let creds = parse_authorization_code(code).unwrap();
        assert_eq!(creds.consumer_key, "ck");
        assert_eq!(creds.consumer_secret, "cs");
        assert_eq!(creds.request_token, "rt");
        assert_eq!(creds.token_secret, "ts");
        assert_eq!(creds.verifier, "ver");
    }

    #[test]
    fn test_parse_authorization_code_rejects_short_strings() {
        assert!(matches!(
            parse_authorization_code("ck|cs|rt"),
            Err(OAuthError::MalformedCredentials)
        ));
    }
}
