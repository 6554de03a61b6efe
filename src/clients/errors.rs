//! HTTP-specific error types.
//!
//! The transport distinguishes three failure shapes:
//!
//! - [`ApiError`]: the server reported a structured application-level error
//!   (HTTP >= 400 with a JSON error body)
//! - [`HttpError::Malformed`]: the response could not be parsed as JSON at all
//! - [`HttpError::Network`]: the network call itself failed
//!
//! None of these are retried; every failure propagates unchanged to the
//! caller of the triggering method.

use serde_json::Value;
use thiserror::Error;

/// A structured error reported by the AWeber API (HTTP status >= 400).
///
/// The API communicates failures as a JSON body of the shape
/// `{"error": {"type": ..., "message": ..., "status": ..., "documentation_url": ...}}`.
///
/// # Example
///
/// ```rust
/// use aweber_api::ApiError;
///
/// let error = ApiError {
///     error_type: "NotFoundError".to_string(),
///     message: "URL endpoint not found".to_string(),
///     status: Some(404),
///     documentation_url: None,
///     url: "/accounts/1/lists/2".to_string(),
/// };
///
/// assert_eq!(error.to_string(), "NotFoundError: URL endpoint not found");
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{error_type}: {message}")]
pub struct ApiError {
    /// The error type reported by the server.
    pub error_type: String,
    /// The human-readable error message.
    pub message: String,
    /// The HTTP status, when the error body carried one.
    pub status: Option<u16>,
    /// A link to relevant API documentation, when provided.
    pub documentation_url: Option<String>,
    /// The URL whose request produced this error.
    pub url: String,
}

/// Unified error type for all transport-level failures.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The server reported a structured application-level error.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The response body was not valid JSON. This should only occur when
    /// there is a server or connectivity issue.
    #[error("Request for {url} did not respond with valid JSON.")]
    Malformed {
        /// The URL of the failed request.
        url: String,
    },

    /// A create or move response arrived without the `Location` header that
    /// points at the new resource.
    #[error("Response for {url} did not include a Location header.")]
    MissingLocation {
        /// The URL of the request.
        url: String,
    },

    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Extracts a structured API error from a decoded response body, if the body
/// carries one.
///
/// Must run before response classification: an error body can otherwise look
/// like an entry or collection to shape-based checks.
#[must_use]
pub fn api_error_from_body(body: &Value, url: &str) -> Option<ApiError> {
    let error = body.get("error")?.as_object()?;
    let error_type = error.get("type")?.as_str()?;
    let message = error.get("message")?.as_str()?;

    let status = error.get("status").and_then(|status| {
        status
            .as_u64()
            .or_else(|| status.as_str()?.parse().ok())
            .and_then(|status| u16::try_from(status).ok())
    });
    let documentation_url = error
        .get("documentation_url")
        .and_then(Value::as_str)
        .map(ToString::to_string);

    Some(ApiError {
        error_type: error_type.to_string(),
        message: message.to_string(),
        status,
        documentation_url,
        url: url.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_error_display_includes_type_and_message() {
        let error = ApiError {
            error_type: "RateLimitError".to_string(),
            message: "Slow down".to_string(),
            status: Some(403),
            documentation_url: None,
            url: "/accounts".to_string(),
        };
        assert_eq!(error.to_string(), "RateLimitError: Slow down");
    }

    #[test]
    fn test_api_error_from_body_parses_full_error() {
        let body = json!({
            "error": {
                "type": "NotFoundError",
                "message": "URL endpoint not found",
                "status": 404,
                "documentation_url": "https://labs.aweber.com/docs"
            }
        });
        let error = api_error_from_body(&body, "/accounts/1").unwrap();
        assert_eq!(error.error_type, "NotFoundError");
        assert_eq!(error.message, "URL endpoint not found");
        assert_eq!(error.status, Some(404));
        assert_eq!(
            error.documentation_url.as_deref(),
            Some("https://labs.aweber.com/docs")
        );
        assert_eq!(error.url, "/accounts/1");
    }

    #[test]
    fn test_api_error_from_body_accepts_string_status() {
        let body = json!({
            "error": {
                "type": "BadRequestError",
                "message": "nope",
                "status": "400"
            }
        });
        let error = api_error_from_body(&body, "/x").unwrap();
        assert_eq!(error.status, Some(400));
    }

    #[test]
    fn test_api_error_from_body_ignores_non_error_bodies() {
        assert!(api_error_from_body(&json!({"id": 1}), "/x").is_none());
        assert!(api_error_from_body(&json!({"entries": []}), "/x").is_none());
        // "error" must be an object with type and message
        assert!(api_error_from_body(&json!({"error": "nope"}), "/x").is_none());
        assert!(api_error_from_body(&json!({"error": {"type": "x"}}), "/x").is_none());
    }

    #[test]
    fn test_error_types_implement_std_error() {
        let api_error: &dyn std::error::Error = &ApiError {
            error_type: "x".to_string(),
            message: "y".to_string(),
            status: None,
            documentation_url: None,
            url: "/".to_string(),
        };
        let _ = api_error;

        let http_error: &dyn std::error::Error = &HttpError::Malformed {
            url: "/".to_string(),
        };
        let _ = http_error;
    }
}
