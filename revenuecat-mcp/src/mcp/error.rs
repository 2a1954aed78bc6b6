//! Protocol-level error taxonomy and the upstream → MCP error mapper.

use serde::{Serialize, Serializer, ser::SerializeStruct};
use serde_json::{Value, json};

use crate::{error::RevenueCatError, validation::ValidationError};

/// JSON-RPC "invalid request" code.
pub const INVALID_REQUEST: i64 = -32600;
/// JSON-RPC "invalid params" code.
pub const INVALID_PARAMS: i64 = -32602;
/// JSON-RPC "internal error" code.
pub const INTERNAL_ERROR: i64 = -32603;

/// Closed set of error kinds reported to MCP clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Arguments were rejected, locally or by the API (400, 404).
    InvalidInput,
    /// The secret key was not accepted (401).
    Unauthenticated,
    /// The secret key lacks permission (403).
    Forbidden,
    /// A referenced resource does not exist.
    NotFound,
    /// The API is throttling requests (429).
    RateLimited,
    /// Anything else.
    Internal,
}

impl ErrorKind {
    /// JSON-RPC error code for this kind.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::InvalidInput | Self::NotFound => INVALID_PARAMS,
            Self::Unauthenticated | Self::Forbidden | Self::RateLimited => INVALID_REQUEST,
            Self::Internal => INTERNAL_ERROR,
        }
    }

    /// Stable identifier used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::RateLimited => "rate_limited",
            Self::Internal => "internal",
        }
    }

    /// Classifies an HTTP status, returning the kind and client-facing message.
    ///
    /// A `404` means the caller referenced something that does not exist, so
    /// it is reported as [`ErrorKind::InvalidInput`] with the message
    /// `"Not found"`. Unknown classes map to [`ErrorKind::Internal`].
    #[must_use]
    pub const fn classify_status(status: u16) -> (Self, &'static str) {
        match status {
            400 => (Self::InvalidInput, "Validation error"),
            401 => (Self::Unauthenticated, "Unauthenticated"),
            403 => (Self::Forbidden, "Forbidden"),
            404 => (Self::InvalidInput, "Not found"),
            429 => (Self::RateLimited, "Rate limited"),
            _ => (Self::Internal, "Internal server error"),
        }
    }

    const fn default_message(self) -> &'static str {
        match self {
            Self::InvalidInput => "Validation error",
            Self::Unauthenticated => "Unauthenticated",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not found",
            Self::RateLimited => "Rate limited",
            Self::Internal => "Internal server error",
        }
    }
}

/// Error returned to MCP clients.
///
/// Serializes as a JSON-RPC error object: `{ "code", "message", "data"? }`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct McpError {
    /// Error classification.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
    /// Structured detail (offending field, status, correlation id).
    pub data: Option<Value>,
}

impl McpError {
    /// Creates an error with the kind's default message.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, message: kind.default_message().to_owned(), data: None }
    }

    /// Creates an error with a custom message.
    #[must_use]
    pub fn with_message(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), data: None }
    }

    /// Attaches structured detail.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// JSON-RPC error code.
    #[must_use]
    pub const fn code(&self) -> i64 {
        self.kind.code()
    }
}

impl Serialize for McpError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.data.is_some() { 3 } else { 2 };
        let mut state = serializer.serialize_struct("McpError", len)?;
        state.serialize_field("code", &self.code())?;
        state.serialize_field("message", &self.message)?;
        if let Some(data) = &self.data {
            state.serialize_field("data", data)?;
        }
        state.end()
    }
}

impl From<ValidationError> for McpError {
    fn from(err: ValidationError) -> Self {
        Self::with_message(ErrorKind::InvalidInput, format!("Input validation failed: {}", err.message))
            .with_data(json!({ "field": err.field, "value": err.value }))
    }
}

/// Maps a terminal bridge error onto the MCP error taxonomy.
///
/// Total over [`RevenueCatError`]: every error yields exactly one
/// [`ErrorKind`], [`ErrorKind::Internal`] when no known status class applies.
/// Upstream response bodies are withheld except for `400`, where they
/// describe what the API rejected.
///
/// | Status | Kind | Message |
/// |--------|------|---------|
/// | 400 | `InvalidInput` | Validation error |
/// | 401 | `Unauthenticated` | Unauthenticated |
/// | 403 | `Forbidden` | Forbidden |
/// | 404 | `InvalidInput` | Not found |
/// | 429 | `RateLimited` | Rate limited |
/// | other | `Internal` | Internal server error |
///
/// # Examples
///
/// ```
/// use revenuecat_mcp::{
///     RevenueCatError,
///     mcp::{ErrorKind, map_error},
/// };
/// use uuid::Uuid;
///
/// let err = RevenueCatError::Status { status: 429, body: String::new(), request_id: Uuid::nil() };
/// let mapped = map_error(&err);
/// assert_eq!(mapped.kind, ErrorKind::RateLimited);
/// assert_eq!(mapped.message, "Rate limited");
/// ```
#[must_use]
pub fn map_error(error: &RevenueCatError) -> McpError {
    match error {
        RevenueCatError::Validation(err) => McpError::from(err.clone()),
        RevenueCatError::InvalidInput(msg) => {
            McpError::with_message(ErrorKind::InvalidInput, format!("Input validation failed: {msg}"))
        }
        RevenueCatError::Status { status, body, request_id } => {
            let (kind, message) = ErrorKind::classify_status(*status);
            let mut data = json!({ "status": status, "request_id": request_id.to_string() });
            if *status == 400 && !body.is_empty() {
                data["body"] = Value::String(body.clone());
            }
            McpError::with_message(kind, message).with_data(data)
        }
        RevenueCatError::Network { request_id, .. } => McpError::new(ErrorKind::Internal)
            .with_data(json!({ "request_id": request_id.to_string() })),
        RevenueCatError::Http(_)
        | RevenueCatError::InvalidResponse(_)
        | RevenueCatError::Config(_)
        | RevenueCatError::RetriesExhausted { .. } => McpError::new(ErrorKind::Internal),
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn status_error(status: u16) -> RevenueCatError {
        RevenueCatError::Status {
            status,
            body: "{\"type\":\"parameter_error\"}".to_owned(),
            request_id: Uuid::nil(),
        }
    }

    #[test]
    fn test_status_table() {
        let cases = [
            (400, ErrorKind::InvalidInput, "Validation error"),
            (401, ErrorKind::Unauthenticated, "Unauthenticated"),
            (403, ErrorKind::Forbidden, "Forbidden"),
            (404, ErrorKind::InvalidInput, "Not found"),
            (429, ErrorKind::RateLimited, "Rate limited"),
            (500, ErrorKind::Internal, "Internal server error"),
            (503, ErrorKind::Internal, "Internal server error"),
            (418, ErrorKind::Internal, "Internal server error"),
            (302, ErrorKind::Internal, "Internal server error"),
        ];

        for (status, kind, message) in cases {
            let mapped = map_error(&status_error(status));
            assert_eq!(mapped.kind, kind, "status {status}");
            assert_eq!(mapped.message, message, "status {status}");
            assert_eq!(mapped.data.as_ref().unwrap()["status"], status);
        }
    }

    #[test]
    fn test_upstream_body_only_exposed_for_bad_request() {
        let bad_request = map_error(&status_error(400));
        assert_eq!(bad_request.data.unwrap()["body"], "{\"type\":\"parameter_error\"}");

        for status in [404, 500] {
            let mapped = map_error(&status_error(status));
            assert!(mapped.data.unwrap().get("body").is_none());
        }
    }

    #[test]
    fn test_request_id_attached() {
        let id = Uuid::new_v4();
        let err = RevenueCatError::Status { status: 401, body: String::new(), request_id: id };
        assert_eq!(map_error(&err).data.unwrap()["request_id"], id.to_string());
    }

    #[test]
    fn test_errors_without_status_are_internal() {
        let errors = [
            RevenueCatError::InvalidResponse("not json".to_owned()),
            RevenueCatError::Config("missing key".to_owned()),
            RevenueCatError::RetriesExhausted { attempts: 3 },
        ];
        for error in &errors {
            let mapped = map_error(error);
            assert_eq!(mapped.kind, ErrorKind::Internal);
            assert_eq!(mapped.message, "Internal server error");
            assert!(mapped.data.is_none());
        }
    }

    #[test]
    fn test_local_input_errors_are_invalid_input() {
        let validation = RevenueCatError::Validation(ValidationError::new(
            "id",
            "Missing required field: id",
            Value::Null,
        ));
        let mapped = map_error(&validation);
        assert_eq!(mapped.kind, ErrorKind::InvalidInput);
        assert_eq!(mapped.data, Some(json!({ "field": "id", "value": null })));

        let mapped = map_error(&RevenueCatError::InvalidInput("bad path segment".to_owned()));
        assert_eq!(mapped.kind, ErrorKind::InvalidInput);
        assert_eq!(mapped.message, "Input validation failed: bad path segment");
    }

    #[test]
    fn test_codes() {
        assert_eq!(ErrorKind::InvalidInput.code(), INVALID_PARAMS);
        assert_eq!(ErrorKind::NotFound.code(), INVALID_PARAMS);
        assert_eq!(ErrorKind::Unauthenticated.code(), INVALID_REQUEST);
        assert_eq!(ErrorKind::Forbidden.code(), INVALID_REQUEST);
        assert_eq!(ErrorKind::RateLimited.code(), INVALID_REQUEST);
        assert_eq!(ErrorKind::Internal.code(), INTERNAL_ERROR);
    }

    #[test]
    fn test_serializes_as_json_rpc_error() {
        let err = McpError::new(ErrorKind::Forbidden);
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({ "code": -32600, "message": "Forbidden" })
        );

        let err = err.with_data(json!({ "status": 403 }));
        assert_eq!(serde_json::to_value(&err).unwrap()["data"]["status"], 403);
    }
}
