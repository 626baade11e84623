//! Normalized API error taxonomy.
//!
//! The Request Gateway is the only place that looks at transport errors and
//! HTTP status codes; everything above it sees `ApiResult`/`ApiError` and the
//! closed [`ErrorKind`] set below. Callers branch on `kind`, never on raw
//! status codes.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use std::fmt;

/// Result alias used by every gateway and session operation.
pub type ApiResult<T> = Result<T, ApiError>;

/// Closed set of failure categories the gateway can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// 401 — the session is dead; triggers global session expiry.
    Unauthorized,
    /// 403 — authenticated but not allowed.
    Forbidden,
    /// 404 — resource does not exist.
    NotFound,
    /// 422 — the server rejected the request payload.
    Validation,
    /// 5xx — the server failed.
    ServerError,
    /// The response body was not the structured format we expect.
    MalformedResponse,
    /// No response at all (offline, DNS, CORS, aborted).
    NetworkUnavailable,
    /// Anything else.
    Unknown,
}

impl ErrorKind {
    /// Map an HTTP status code to a failure kind.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            422 => Self::Validation,
            500..=599 => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    /// Generic user-facing copy for when the server supplied no message.
    pub fn user_message(self) -> &'static str {
        match self {
            Self::Unauthorized => "Your session has expired. Please sign in again.",
            Self::Forbidden => "You don't have permission to do that.",
            Self::NotFound => "That record could not be found.",
            Self::Validation => "Some of the submitted fields were invalid.",
            Self::ServerError => "The server ran into a problem. Please try again.",
            Self::MalformedResponse => "The server sent an unexpected response.",
            Self::NetworkUnavailable => "Could not reach the server. Check your connection.",
            Self::Unknown => "Something went wrong. Please try again.",
        }
    }
}

/// A normalized failure from the gateway.
///
/// `message` is server-provided when the body carried one, otherwise the
/// per-kind fallback. `details` carries the server's error payload (or a
/// truncated raw-body snippet for malformed responses) for diagnostics.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), details: None }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Failure with the per-kind fallback message.
    pub fn from_kind(kind: ErrorKind) -> Self {
        Self::new(kind, kind.user_message())
    }

    pub fn network(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::NetworkUnavailable, detail.into())
    }

    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedResponse, detail.into())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ApiError {}
