//! Session management for AWeber API authentication.
//!
//! This module provides the [`Session`] type representing an authorized
//! user's OAuth 1.0a token pair, used to sign every API call.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::auth::oauth::TokenPair;

/// An authenticated session for AWeber API calls.
///
/// A session holds the access token and token secret obtained from the OAuth
/// authorization flow. It is immutable after creation and can be serialized
/// for storage between requests.
///
/// # Thread Safety
///
/// `Session` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust
/// use aweber_api::Session;
///
/// let session = Session::new("access-token", "token-secret");
/// assert!(session.is_active());
///
/// // Sessions can be serialized for storage
/// let json = serde_json::to_string(&session).unwrap();
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The OAuth access token identifying the authorized user.
    pub access_token: String,

    /// The token secret paired with the access token; used for signing.
    pub token_secret: String,
}

impl Session {
    /// Creates a new session from an access token and its secret.
    #[must_use]
    pub fn new(access_token: impl Into<String>, token_secret: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_secret: token_secret.into(),
        }
    }

    /// Returns `true` if this session carries a usable token pair.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.access_token.is_empty() && !self.token_secret.is_empty()
    }
}

impl From<TokenPair> for Session {
    fn from(pair: TokenPair) -> Self {
        Self::new(pair.token, pair.secret)
    }
}

impl fmt::Debug for Session {
    // The token secret is masked so sessions are safe to log.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &self.access_token)
            .field("token_secret", &"*****")
            .finish()
    }
}

// Verify Session is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Session>();
};
