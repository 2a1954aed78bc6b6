//! Error types for the RevenueCat MCP bridge.
//!
//! All fallible library operations return [`Result<T>`], which carries a
//! [`RevenueCatError`]. Errors are converted into protocol-level errors by
//! [`crate::mcp::map_error`] before they reach an MCP client.
//!
//! # Error Categories
//!
//! - **Input errors** ([`RevenueCatError::Validation`], [`RevenueCatError::InvalidInput`]):
//!   detected before any network call, never retried
//! - **Upstream errors** ([`RevenueCatError::Status`]): the API answered with a
//!   non-success status code
//! - **Network errors** ([`RevenueCatError::Network`], [`RevenueCatError::Http`]):
//!   the request never produced a response
//! - **Configuration errors** ([`RevenueCatError::Config`]): invalid startup settings
//!
//! # Examples
//!
//! ```
//! use revenuecat_mcp::error::RevenueCatError;
//!
//! let err = RevenueCatError::Config("REVENUECAT_SECRET_KEY must be set".to_owned());
//! assert!(err.to_string().contains("Invalid configuration"));
//! ```

use thiserror::Error;
use uuid::Uuid;

use crate::validation::ValidationError;

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, RevenueCatError>;

/// Errors that can occur while validating, sending, or decoding a request.
///
/// # Error Recovery
///
/// - **Transient errors** ([`Network`](Self::Network), 5xx [`Status`](Self::Status)):
///   already retried by the client, surfaced only once retries are exhausted
/// - **Input errors**: fix the tool arguments and call again
/// - **Authentication errors** (401/403 [`Status`](Self::Status)): check the secret key
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum RevenueCatError {
    /// HTTP client could not be constructed or a request could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request failed before a response arrived.
    ///
    /// Covers connection refused/reset, DNS resolution failures and timeouts.
    #[error("network error (request {request_id}): {source}")]
    Network {
        /// Correlation identifier shared by every attempt of the call.
        request_id: Uuid,
        /// Underlying transport failure.
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-success status code.
    ///
    /// The response body is kept for diagnostics; it is not forwarded to MCP
    /// clients except for `400` responses.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Numeric HTTP status.
        status: u16,
        /// Response body text.
        body: String,
        /// Correlation identifier shared by every attempt of the call.
        request_id: Uuid,
    },

    /// A success response could not be decoded as JSON.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Tool arguments failed schema validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A request could not be assembled from otherwise valid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Startup configuration is missing or out of bounds.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The retry loop finished without producing a value or an error.
    #[error("retries exhausted after {attempts} attempts")]
    RetriesExhausted {
        /// Number of attempts the policy allowed.
        attempts: u32,
    },
}

impl RevenueCatError {
    /// Returns the embedded HTTP status, if the upstream API produced one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the correlation identifier of the failed call, if known.
    #[must_use]
    pub const fn request_id(&self) -> Option<Uuid> {
        match self {
            Self::Status { request_id, .. } | Self::Network { request_id, .. } => {
                Some(*request_id)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    #[test]
    fn test_status_error_display() {
        let error = RevenueCatError::Status {
            status: 404,
            body: "{\"message\":\"missing\"}".to_owned(),
            request_id: Uuid::nil(),
        };
        assert_eq!(error.to_string(), "HTTP 404: {\"message\":\"missing\"}");
        assert_eq!(error.status(), Some(404));
        assert_eq!(error.request_id(), Some(Uuid::nil()));
    }

    #[test]
    fn test_config_error_has_no_status() {
        let error = RevenueCatError::Config("bad".to_owned());
        assert_eq!(error.to_string(), "Invalid configuration: bad");
        assert!(error.status().is_none());
        assert!(error.request_id().is_none());
    }

    #[test]
    fn test_validation_error_is_transparent() {
        let error = RevenueCatError::from(ValidationError::new(
            "name",
            "Missing required field: name",
            Value::Null,
        ));
        assert_eq!(
            error.to_string(),
            "Validation failed for field 'name': Missing required field: name"
        );
    }

    #[test]
    fn test_retries_exhausted_display() {
        let error = RevenueCatError::RetriesExhausted { attempts: 0 };
        assert_eq!(error.to_string(), "retries exhausted after 0 attempts");
    }
}
