//! # AWeber API
//!
//! A Rust client library for the AWeber 1.0 REST API.
//!
//! The API is a hierarchy of resources: an account owns lists, lists own
//! subscribers and campaigns, campaigns own messages, and so on. This crate
//! models that hierarchy directly: every response becomes either an
//! [`Entry`] (a single resource) or a [`Collection`] (a lazily paged
//! sequence of entries), and navigation between them issues signed HTTP
//! requests on demand.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use aweber_api::{AweberApi, AweberConfig, Attr, ConsumerKey, ConsumerSecret, Session};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AweberConfig::builder()
//!     .consumer_key(ConsumerKey::new("consumer-key")?)
//!     .consumer_secret(ConsumerSecret::new("consumer-secret")?)
//!     .build()?;
//!
//! let api = AweberApi::new(&config, Session::new("access-token", "token-secret"));
//!
//! // Walk the hierarchy: account -> lists -> subscribers
//! let mut account = api.account().await?;
//! let lists = account.collection("lists").await?;
//! let mut cursor = lists.entries();
//! while let Some(mut list) = cursor.next().await? {
//!     if let Attr::Value(name) = list.get("name").await? {
//!         println!("list: {name}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Getting Access Tokens
//!
//! The API uses OAuth 1.0a. A one-time interactive flow exchanges your
//! application's consumer credentials for a per-user token pair:
//!
//! ```rust,no_run
//! use aweber_api::oauth;
//! use aweber_api::AweberConfig;
//!
//! # async fn run(config: AweberConfig) -> Result<(), Box<dyn std::error::Error>> {
//! let request = oauth::get_request_token(&config, "oob").await?;
//! println!("visit: {}", oauth::authorize_url(&config, Some(&request.token)));
//!
//! let verifier = "code-shown-after-authorizing";
//! let access = oauth::get_access_token(&config, &request.token, &request.secret, verifier).await?;
//! println!("token: {} secret: {}", access.token, access.secret);
//! # Ok(())
//! # }
//! ```
//!
//! Applications distributed through the AWeber app directory receive a
//! single `key|secret|token|token_secret|verifier` string instead; parse it
//! with [`oauth::parse_authorization_code`].
//!
//! ## Mutation
//!
//! Entries track local writes as a pending diff. [`Entry::set`] stages a
//! change, [`Entry::save`] PATCHes exactly the changed fields, and a clean
//! entry saves without touching the network.
//!
//! ## Design Principles
//!
//! - **Lazy by default**: child collections and out-of-window pages are
//!   fetched only when accessed, and cached afterwards.
//! - **No retries**: every transport failure propagates unchanged to the
//!   caller that triggered the request.
//! - **Canonical representations**: create and move operations follow the
//!   `Location` header and re-fetch the resource rather than trusting the
//!   POST response body.

pub mod api;
pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod resources;

pub use api::AweberApi;
pub use auth::oauth::{self, OAuthError, TokenPair};
pub use auth::Session;
pub use clients::{ApiError, HttpClient, HttpError, Params, SDK_VERSION};
pub use config::{AweberConfig, AweberConfigBuilder, ConsumerKey, ConsumerSecret};
pub use error::ConfigError;
pub use resources::{Attr, ChildArray, Collection, Entries, Entry, Resource, ResourceError};
