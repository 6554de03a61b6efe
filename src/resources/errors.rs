//! Error types for resource navigation.
//!
//! These cover the failure modes of the resource graph itself; transport
//! failures are wrapped unchanged via [`HttpError`].

use thiserror::Error;

use crate::clients::{ApiError, HttpError};

/// Errors that can occur while navigating or mutating the resource graph.
///
/// `UnknownAttribute` and `UnknownChild` are recoverable caller errors:
/// [`Entry::attrs`](crate::resources::Entry::attrs) and the schema map
/// enumerate the valid names.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// A transport-level failure, surfaced unchanged.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// A successful response matched neither the entry nor the collection
    /// shape. This is a contract error and never retryable.
    #[error("Response from {url} matched neither an entry nor a collection.")]
    UnexpectedShape {
        /// The URL the response came from.
        url: String,
    },

    /// The requested field does not exist on this resource.
    #[error("Attribute \"{name}\" is not implemented on this resource.")]
    UnknownAttribute {
        /// The attribute that was requested.
        name: String,
    },

    /// The requested child collection is not legal for this resource type.
    #[error("\"{name}\" is not a child collection of this resource.")]
    UnknownChild {
        /// The collection name that was requested.
        name: String,
    },

    /// A named operation was invoked on a resource type that does not
    /// support it.
    #[error("{operation} is not implemented for \"{resource_type}\" resources.")]
    UnsupportedOperation {
        /// The operation that was invoked.
        operation: &'static str,
        /// The type of the resource it was invoked on.
        resource_type: String,
    },
}

impl From<ApiError> for ResourceError {
    fn from(error: ApiError) -> Self {
        Self::Http(HttpError::Api(error))
    }
}
