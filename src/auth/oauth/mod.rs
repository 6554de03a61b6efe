//! OAuth 1.0a support: request signing and the token exchange flow.
//!
//! Signing ([`sign`]) is used by the HTTP transport on every API call; the
//! token exchange functions run once per user authorization.

mod error;
pub mod sign;
mod token_exchange;

pub use error::OAuthError;
pub use sign::{authorization_header, Credentials};
pub use token_exchange::{
    authorize_url, get_access_token, get_request_token, parse_authorization_code, AppCredentials,
    TokenPair,
};
