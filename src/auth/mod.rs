//! Authentication: OAuth 1.0a signing, token exchange, and sessions.

pub mod oauth;
mod session;

pub use session::Session;
