//! Configuration types for the AWeber API client.
//!
//! This module provides [`AweberConfig`] and its builder for type-safe,
//! fail-fast configuration, plus validated newtypes for API credentials.
//!
//! # Example
//!
//! ```rust
//! use aweber_api::{AweberConfig, ConsumerKey, ConsumerSecret};
//!
//! let config = AweberConfig::builder()
//!     .consumer_key(ConsumerKey::new("my-key").unwrap())
//!     .consumer_secret(ConsumerSecret::new("my-secret").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.base_url(), "https://api.aweber.com/1.0");
//! ```

mod newtypes;

pub use newtypes::{ConsumerKey, ConsumerSecret};

use crate::error::ConfigError;

/// Default location for API calls.
pub const DEFAULT_BASE_URL: &str = "https://api.aweber.com/1.0";

/// Default location to request a request token.
pub const DEFAULT_REQUEST_TOKEN_URL: &str = "https://auth.aweber.com/1.0/oauth/request_token";

/// Default location to request an access token.
pub const DEFAULT_ACCESS_TOKEN_URL: &str = "https://auth.aweber.com/1.0/oauth/access_token";

/// Default location to authorize an application.
pub const DEFAULT_AUTHORIZE_URL: &str = "https://auth.aweber.com/1.0/oauth/authorize";

/// Configuration for the AWeber API client.
///
/// Holds the application's OAuth consumer credentials and the service
/// endpoint URLs. The URLs default to the production AWeber service and are
/// overridable, which lets tests point the client at a local mock server.
///
/// Configuration is instance-based and passed explicitly; there is no global
/// state.
#[derive(Clone, Debug)]
pub struct AweberConfig {
    consumer_key: ConsumerKey,
    consumer_secret: ConsumerSecret,
    base_url: String,
    request_token_url: String,
    access_token_url: String,
    authorize_url: String,
}

impl AweberConfig {
    /// Returns a new [`AweberConfigBuilder`].
    #[must_use]
    pub fn builder() -> AweberConfigBuilder {
        AweberConfigBuilder::default()
    }

    /// Returns the OAuth consumer key.
    #[must_use]
    pub const fn consumer_key(&self) -> &ConsumerKey {
        &self.consumer_key
    }

    /// Returns the OAuth consumer secret.
    #[must_use]
    pub const fn consumer_secret(&self) -> &ConsumerSecret {
        &self.consumer_secret
    }

    /// Returns the base URL for API calls, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the URL used to obtain a request token.
    #[must_use]
    pub fn request_token_url(&self) -> &str {
        &self.request_token_url
    }

    /// Returns the URL used to exchange a request token for an access token.
    #[must_use]
    pub fn access_token_url(&self) -> &str {
        &self.access_token_url
    }

    /// Returns the URL users visit to authorize the application.
    #[must_use]
    pub fn authorize_url(&self) -> &str {
        &self.authorize_url
    }
}

/// Builder for [`AweberConfig`].
///
/// The consumer key and secret are required; all URLs default to the
/// production AWeber endpoints.
#[derive(Debug, Default)]
pub struct AweberConfigBuilder {
    consumer_key: Option<ConsumerKey>,
    consumer_secret: Option<ConsumerSecret>,
    base_url: Option<String>,
    request_token_url: Option<String>,
    access_token_url: Option<String>,
    authorize_url: Option<String>,
}

impl AweberConfigBuilder {
    /// Sets the OAuth consumer key.
    #[must_use]
    pub fn consumer_key(mut self, key: ConsumerKey) -> Self {
        self.consumer_key = Some(key);
        self
    }

    /// Sets the OAuth consumer secret.
    #[must_use]
    pub fn consumer_secret(mut self, secret: ConsumerSecret) -> Self {
        self.consumer_secret = Some(secret);
        self
    }

    /// Overrides the base URL for API calls.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Overrides the request-token URL.
    #[must_use]
    pub fn request_token_url(mut self, url: impl Into<String>) -> Self {
        self.request_token_url = Some(url.into());
        self
    }

    /// Overrides the access-token URL.
    #[must_use]
    pub fn access_token_url(mut self, url: impl Into<String>) -> Self {
        self.access_token_url = Some(url.into());
        self
    }

    /// Overrides the authorization URL.
    #[must_use]
    pub fn authorize_url(mut self, url: impl Into<String>) -> Self {
        self.authorize_url = Some(url.into());
        self
    }

    /// Builds the configuration, validating all fields.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if the consumer key or
    /// secret was not set, and [`ConfigError::InvalidUrl`] if a URL override
    /// is not an absolute http(s) URL.
    pub fn build(self) -> Result<AweberConfig, ConfigError> {
        let consumer_key = self
            .consumer_key
            .ok_or(ConfigError::MissingRequiredField {
                field: "consumer_key",
            })?;
        let consumer_secret = self
            .consumer_secret
            .ok_or(ConfigError::MissingRequiredField {
                field: "consumer_secret",
            })?;

        Ok(AweberConfig {
            consumer_key,
            consumer_secret,
            base_url: validate_url(self.base_url, DEFAULT_BASE_URL)?,
            request_token_url: validate_url(self.request_token_url, DEFAULT_REQUEST_TOKEN_URL)?,
            access_token_url: validate_url(self.access_token_url, DEFAULT_ACCESS_TOKEN_URL)?,
            authorize_url: validate_url(self.authorize_url, DEFAULT_AUTHORIZE_URL)?,
        })
    }
}

/// Validates a URL override, normalizing away any trailing slash.
fn validate_url(url: Option<String>, default: &str) -> Result<String, ConfigError> {
    let Some(url) = url else {
        return Ok(default.to_string());
    };
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::InvalidUrl { url });
    }
    Ok(url.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_config() -> AweberConfig {
        AweberConfig::builder()
            .consumer_key(ConsumerKey::new("key").unwrap())
            .consumer_secret(ConsumerSecret::new("secret").unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_applies_default_urls() {
        let config = build_config();
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.request_token_url(), DEFAULT_REQUEST_TOKEN_URL);
        assert_eq!(config.access_token_url(), DEFAULT_ACCESS_TOKEN_URL);
        assert_eq!(config.authorize_url(), DEFAULT_AUTHORIZE_URL);
    }

    #[test]
    fn test_builder_requires_consumer_key() {
        let result = AweberConfig::builder()
            .consumer_secret(ConsumerSecret::new("secret").unwrap())
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField {
                field: "consumer_key"
            })
        ));
    }

    #[test]
    fn test_builder_requires_consumer_secret() {
        let result = AweberConfig::builder()
            .consumer_key(ConsumerKey::new("key").unwrap())
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField {
                field: "consumer_secret"
            })
        ));
    }

    #[test]
    fn test_base_url_override_trims_trailing_slash() {
        let config = AweberConfig::builder()
            .consumer_key(ConsumerKey::new("key").unwrap())
            .consumer_secret(ConsumerSecret::new("secret").unwrap())
            .base_url("http://127.0.0.1:8080/1.0/")
            .build()
            .unwrap();
        assert_eq!(config.base_url(), "http://127.0.0.1:8080/1.0");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = AweberConfig::builder()
            .consumer_key(ConsumerKey::new("key").unwrap())
            .consumer_secret(ConsumerSecret::new("secret").unwrap())
            .base_url("ftp://example.com")
            .build();
        assert!(matches!(result, Err(ConfigError::InvalidUrl { .. })));
    }
}
