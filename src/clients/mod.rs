//! HTTP transport: the OAuth-signed client and its error types.

mod errors;
mod http_client;

pub use errors::{api_error_from_body, ApiError, HttpError};
pub use http_client::{HttpClient, Params, SDK_VERSION};

pub(crate) use http_client::{encode_query, parse_query};
