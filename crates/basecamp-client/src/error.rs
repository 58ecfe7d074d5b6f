//! Client error types and the mapping from HTTP failures onto them.

use std::time::Duration;

use basecamp_auth::AuthError;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde_json::Value;
use thiserror::Error;

use crate::response::Body;

/// Client error type.
///
/// HTTP and transport failures are classified once, at the transport
/// boundary. Every variant that comes from an HTTP response carries the
/// status, the raw body (when there was one) and a readable message.
#[derive(Debug, Error)]
pub enum Error {
    /// 401/403, or a token refresh that failed before any request was sent.
    #[error("Authentication failed: {message}")]
    Authentication {
        status: Option<u16>,
        body: Option<Body>,
        message: String,
        source: Option<AuthError>,
    },

    /// 404.
    #[error("Not found: {message}")]
    NotFound {
        status: u16,
        body: Option<Body>,
        message: String,
    },

    /// 429.
    #[error("Rate limited: {message}")]
    RateLimit {
        status: u16,
        body: Option<Body>,
        message: String,
        /// Parsed `Retry-After` header.
        retry_after: Option<Duration>,
    },

    /// 400/422.
    #[error("Invalid request ({status}): {message}")]
    InvalidRequest {
        status: u16,
        body: Option<Body>,
        message: String,
        /// Validation details reported by the server.
        details: Option<Value>,
    },

    /// 5xx.
    #[error("Server error ({status}): {message}")]
    Server {
        status: u16,
        body: Option<Body>,
        message: String,
    },

    /// Connection reset, timeout, DNS or TLS failure. No status available.
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        source: Option<reqwest::Error>,
    },

    /// Any other non-2xx status.
    #[error("API error ({status}): {message}")]
    UnknownApi {
        status: u16,
        body: Option<Body>,
        message: String,
    },

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The response did not have the shape the envelope convention expects.
    #[error("Unexpected response body: {0}")]
    MalformedEnvelope(String),

    /// A resource field was read but never set.
    #[error("{kind} has no field '{field}'")]
    MissingField { kind: &'static str, field: String },

    /// A resource field holds a different type than requested.
    #[error("{kind} field '{field}' is not {expected}")]
    InvalidField {
        kind: &'static str,
        field: String,
        expected: &'static str,
    },

    /// The resource type does not define the requested operation.
    #[error("{kind} does not support {operation}")]
    UnsupportedOperation {
        kind: &'static str,
        operation: &'static str,
    },

    /// Caller passed arguments the request cannot be built from.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (reading upload files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a transport error without an underlying cause.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// HTTP status of the failed response, if the error came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Authentication { status, .. } => *status,
            Error::NotFound { status, .. }
            | Error::RateLimit { status, .. }
            | Error::InvalidRequest { status, .. }
            | Error::Server { status, .. }
            | Error::UnknownApi { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw body of the failed response, if there was one.
    pub fn body(&self) -> Option<&Body> {
        match self {
            Error::Authentication { body, .. }
            | Error::NotFound { body, .. }
            | Error::RateLimit { body, .. }
            | Error::InvalidRequest { body, .. }
            | Error::Server { body, .. }
            | Error::UnknownApi { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// How long the server asked us to wait, for rate-limit errors.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Error::RateLimit { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Authentication { .. })
    }

    /// Check if this is a rate limit error.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimit { .. })
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Server { .. })
    }

    /// Check if this is a transport error.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            "request timed out"
        } else if e.is_connect() {
            "connection failed"
        } else if e.is_body() || e.is_decode() {
            "failed to read response"
        } else {
            "request failed"
        };
        Error::Transport {
            message: format!("{}: {}", kind, e),
            source: Some(e),
        }
    }
}

impl From<AuthError> for Error {
    fn from(e: AuthError) -> Self {
        Error::Authentication {
            status: None,
            body: None,
            message: e.to_string(),
            source: Some(e),
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classify a non-2xx response into an [`Error`].
pub fn classify(status: u16, headers: &HeaderMap, body: Body) -> Error {
    let message = error_message(status, &body);
    let body = (!body.is_empty()).then_some(body);

    match status {
        401 | 403 => Error::Authentication {
            status: Some(status),
            body,
            message,
            source: None,
        },
        404 => Error::NotFound {
            status,
            body,
            message,
        },
        429 => Error::RateLimit {
            status,
            body,
            message,
            retry_after: retry_after(headers, Utc::now()),
        },
        400 | 422 => Error::InvalidRequest {
            details: body.as_ref().and_then(validation_details),
            status,
            body,
            message,
        },
        500..=599 => Error::Server {
            status,
            body,
            message,
        },
        _ => Error::UnknownApi {
            status,
            body,
            message,
        },
    }
}

/// Pick a message from the server's error payload, falling back to the
/// canonical reason phrase.
fn error_message(status: u16, body: &Body) -> String {
    let from_body = body.as_json().and_then(|json| {
        ["error", "message"]
            .iter()
            .find_map(|key| json.get(*key).and_then(Value::as_str))
            .map(str::to_string)
    });

    from_body.unwrap_or_else(|| {
        reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .map(|reason| format!("HTTP {} {}", status, reason))
            .unwrap_or_else(|| format!("HTTP {}", status))
    })
}

fn validation_details(body: &Body) -> Option<Value> {
    let json = body.as_json()?;
    match json {
        Value::Object(map) => Some(
            map.get("errors")
                .or_else(|| map.get("error"))
                .cloned()
                .unwrap_or_else(|| json.clone()),
        ),
        Value::Array(_) => Some(json.clone()),
        _ => None,
    }
}

/// Parse `Retry-After` as either delta-seconds or an HTTP date.
fn retry_after(headers: &HeaderMap, now: DateTime<Utc>) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();

    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let at = DateTime::parse_from_rfc2822(value).ok()?.with_timezone(&Utc);
    Some((at - now).to_std().unwrap_or(Duration::ZERO))
}
