//! HTTP-specific error types.
//!
//! - [`HttpResponseError`]: a non-2xx response
//! - [`MaxHttpRetriesExceededError`]: retryable responses until attempts ran out
//! - [`InvalidHttpRequestError`]: a request that failed validation before sending
//! - [`HttpError`]: the union returned by [`HttpClient::request`](crate::clients::HttpClient::request)
//!
//! Response bodies are kept verbatim for operator logs. They are never
//! forwarded to end users; [`crate::Error::public_message`] withholds them.

use thiserror::Error;

/// Error returned when a request receives a non-successful response.
///
/// # Example
///
/// ```rust
/// use shop_connect::clients::HttpResponseError;
///
/// let error = HttpResponseError {
///     code: 404,
///     body: r#"{"errors":"Not Found"}"#.to_string(),
///     error_reference: Some("abc-123".to_string()),
/// };
/// assert_eq!(error.to_string(), "Request failed with status 404 (request id abc-123)");
/// ```
#[derive(Debug, Error)]
#[error("Request failed with status {code}{}", reference_suffix(.error_reference.as_deref()))]
pub struct HttpResponseError {
    /// The HTTP status code of the response.
    pub code: u16,
    /// The raw response body.
    pub body: String,
    /// The `X-Request-Id` of the response, if any.
    pub error_reference: Option<String>,
}

/// Error returned when retry attempts have been exhausted.
#[derive(Debug, Error)]
#[error("Exceeded maximum retry count of {tries}. Last status: {code}")]
pub struct MaxHttpRetriesExceededError {
    /// The HTTP status code of the last response.
    pub code: u16,
    /// The number of tries that were attempted.
    pub tries: u32,
    /// The raw body of the last response.
    pub body: String,
    /// The `X-Request-Id` of the last response, if any.
    pub error_reference: Option<String>,
}

fn reference_suffix(reference: Option<&str>) -> String {
    reference.map_or_else(String::new, |id| format!(" (request id {id})"))
}

/// Error returned when a request fails validation before it is sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// A POST request was built without a body.
    #[error("Cannot use {method} without specifying data.")]
    MissingBody {
        /// The HTTP method that requires a body.
        method: String,
    },

    /// An absolute target URL could not be parsed.
    #[error("Invalid request URL '{url}'")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
    },

    /// A retry count of zero was requested.
    #[error("A request needs at least one try")]
    ZeroTries,
}

/// Unified error type for all HTTP-related errors.
#[derive(Debug, Error)]
pub enum HttpError {
    /// A non-2xx response that is not retried, or the only try failed.
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// Retryable responses exhausted every try.
    #[error(transparent)]
    MaxRetries(#[from] MaxHttpRetriesExceededError),

    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// The request (or reading its body) exceeded the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(reqwest::Error),
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_response_error_message_omits_body() {
        let error = HttpResponseError {
            code: 401,
            body: r#"{"errors":"[API] Invalid API key or access token"}"#.to_string(),
            error_reference: None,
        };
        assert_eq!(error.to_string(), "Request failed with status 401");
    }

    #[test]
    fn test_max_retries_error_message() {
        let error = MaxHttpRetriesExceededError {
            code: 503,
            tries: 3,
            body: "unavailable".to_string(),
            error_reference: Some("req-1".to_string()),
        };
        assert_eq!(
            error.to_string(),
            "Exceeded maximum retry count of 3. Last status: 503"
        );
    }

    #[test]
    fn test_invalid_request_error_messages() {
        let error = InvalidHttpRequestError::MissingBody {
            method: "post".to_string(),
        };
        assert_eq!(error.to_string(), "Cannot use post without specifying data.");

        let http_error: HttpError = InvalidHttpRequestError::ZeroTries.into();
        assert!(matches!(http_error, HttpError::InvalidRequest(_)));
    }
}
