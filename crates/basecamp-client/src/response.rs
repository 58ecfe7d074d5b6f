//! Responses returned by the transport.

use std::fmt;

use reqwest::header::HeaderMap;
use serde_json::Value;
use url::Url;

/// Body of an HTTP response: parsed JSON when it is JSON, raw text
/// otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// No body, or only whitespace.
    Empty,
    /// A JSON document.
    Json(Value),
    /// Anything that did not parse as JSON.
    Text(String),
}

impl Body {
    /// Parse raw response bytes.
    pub fn parse(bytes: &[u8]) -> Self {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Body::Empty;
        }
        match serde_json::from_slice(bytes) {
            Ok(json) => Body::Json(json),
            Err(_) => Body::Text(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    /// The JSON document, if the body is one.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Body::Json(json) => Some(json),
            _ => None,
        }
    }

    /// Convert into a JSON value. Text becomes a JSON string, an empty body
    /// becomes `null`.
    pub fn into_json(self) -> Value {
        match self {
            Body::Empty => Value::Null,
            Body::Json(json) => json,
            Body::Text(text) => Value::String(text),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Empty => Ok(()),
            Body::Json(json) => write!(f, "{}", json),
            Body::Text(text) => f.write_str(text),
        }
    }
}

/// A successful (2xx) response.
#[derive(Debug, Clone)]
pub struct Response {
    /// The URL the request was sent to.
    pub url: Url,
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Body,
}

impl Response {
    /// Get a header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json() {
        assert_eq!(Body::parse(br#"{"user":"foo"}"#), Body::Json(json!({"user": "foo"})));
        assert_eq!(Body::parse(b"[]"), Body::Json(json!([])));
    }

    #[test]
    fn test_parse_text_and_empty() {
        assert_eq!(Body::parse(b"<html>oops</html>"), Body::Text("<html>oops</html>".to_string()));
        assert_eq!(Body::parse(b""), Body::Empty);
        assert_eq!(Body::parse(b" \n"), Body::Empty);
    }

    #[test]
    fn test_into_json() {
        assert_eq!(Body::Empty.into_json(), Value::Null);
        assert_eq!(Body::Text("hi".to_string()).into_json(), json!("hi"));
        assert_eq!(Body::Json(json!({"a": 1})).into_json(), json!({"a": 1}));
    }

    #[test]
    fn test_display() {
        assert_eq!(Body::Json(json!({"a": 1})).to_string(), r#"{"a":1}"#);
        assert_eq!(Body::Text("plain".to_string()).to_string(), "plain");
        assert_eq!(Body::Empty.to_string(), "");
    }
}
