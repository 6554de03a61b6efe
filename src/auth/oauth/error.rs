//! OAuth-specific error types.
//!
//! This module contains error types for the OAuth 1.0a token exchange:
//! missing response data, rejected requests, and malformed credential
//! strings.
//!
//! # Example
//!
//! ```rust
//! use aweber_api::auth::oauth::OAuthError;
//!
//! let error = OAuthError::DataMissing {
//!     missing: "oauth_token, oauth_token_secret".to_string(),
//! };
//! assert!(error.to_string().contains("oauth_token"));
//! ```

use thiserror::Error;

/// Errors that can occur during the OAuth 1.0a authorization flow.
///
/// # Thread Safety
///
/// `OAuthError` is `Send + Sync`, making it safe to use across async
/// boundaries.
#[derive(Debug, Error)]
pub enum OAuthError {
    /// The token endpoint responded without an expected field.
    ///
    /// This differs from a rejected request: the server accepted the call
    /// but its response did not meet the client's expectations.
    #[error("OAuth response was expected to contain: {missing}")]
    DataMissing {
        /// Comma-separated list of the missing fields.
        missing: String,
    },

    /// The token endpoint rejected the request.
    #[error("OAuth token request failed with HTTP {status}: {body}")]
    Rejected {
        /// The HTTP status code of the response.
        status: u16,
        /// The raw response body.
        body: String,
    },

    /// An authorization-code credential string did not have the expected
    /// `key|secret|token|token_secret|verifier` shape.
    #[error("Authorization code is malformed; expected five '|'-separated segments")]
    MalformedCredentials,

    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}
