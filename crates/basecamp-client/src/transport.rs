//! The HTTP transport: every request to the API flows through here.
//!
//! A request is composed in a fixed order:
//!
//! 1. a fresh [`PreparedRequest`] is created for the target URL
//! 2. the authentication strategy attaches credentials
//! 3. the environment info attaches client identification
//! 4. the per-call hook runs (multipart uploads use it)
//! 5. JSON encoding headers are set
//! 6. error mapping is wrapped around execution
//! 7. the global hook supplied at construction runs
//! 8. the configured [`Adapter`] is bound
//! 9. the request is executed
//!
//! Non-2xx statuses and network failures come back as a typed [`Error`].

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use basecamp_auth::Authentication;
use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Map, Value};
use url::Url;

use crate::adapter::Adapter;
use crate::envelope::{Cursor, EnvelopeConvention};
use crate::environment::EnvironmentInfo;
use crate::error::{self, Error, Result};
use crate::response::{Body, Response};

/// The API base URI.
pub const BASE_URI: &str = "https://3.basecampapi.com";

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Hook that customizes a request right before it is executed.
pub type RequestHook = Arc<dyn Fn(&mut PreparedRequest) + Send + Sync>;

/// A file posted as the `file` part of a multipart request.
#[derive(Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read an upload from disk.
    pub fn from_path(path: impl AsRef<Path>, content_type: impl Into<String>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| Error::InvalidInput(format!("not a file: {}", path.display())))?;
        let bytes = std::fs::read(path)?;
        Ok(Self::new(file_name, content_type, bytes))
    }
}

impl fmt::Debug for Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Request body, in the encoding the adapter should use.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    None,
    Json(Value),
    Multipart {
        fields: Map<String, Value>,
        file: Upload,
    },
}

impl Payload {
    /// Summary for debug logging. Upload contents are never included.
    fn describe(&self) -> String {
        match self {
            Payload::None => "{}".to_string(),
            Payload::Json(json) => json.to_string(),
            Payload::Multipart { fields, file } => {
                format!("{} + file {:?}", Value::Object(fields.clone()), file.file_name)
            }
        }
    }
}

/// A request after composition, as handed to the adapter.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub payload: Payload,
}

impl PreparedRequest {
    fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            query: Vec::new(),
            payload: Payload::None,
        }
    }
}

/// Wrapper over the network adapter that takes care of authentication,
/// URL building, encoding and error mapping.
///
/// Cheap to clone: clones share the same authentication state.
#[derive(Clone)]
pub struct HttpTransport {
    inner: Arc<TransportInner>,
}

/// Shared transport state.
pub(crate) struct TransportInner {
    pub(crate) base_uri: Url,
    pub(crate) account_id: u64,
    pub(crate) authentication: Authentication,
    pub(crate) environment: EnvironmentInfo,
    pub(crate) adapter: Arc<dyn Adapter>,
    pub(crate) envelope: Arc<dyn EnvelopeConvention>,
    pub(crate) debug_mode: bool,
    pub(crate) default_headers: HeaderMap,
    pub(crate) configure: Option<RequestHook>,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_uri", &self.inner.base_uri.as_str())
            .field("account_id", &self.inner.account_id)
            .field("authentication", &self.inner.authentication.kind())
            .field("adapter", &self.inner.adapter)
            .field("envelope", &self.inner.envelope)
            .field("debug_mode", &self.inner.debug_mode)
            .finish()
    }
}

impl HttpTransport {
    pub(crate) fn from_inner(inner: TransportInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn base_uri(&self) -> &Url {
        &self.inner.base_uri
    }

    pub fn account_id(&self) -> u64 {
        self.inner.account_id
    }

    pub fn authentication(&self) -> &Authentication {
        &self.inner.authentication
    }

    pub fn environment(&self) -> &EnvironmentInfo {
        &self.inner.environment
    }

    /// The envelope convention responses are parsed with.
    pub fn envelope(&self) -> &dyn EnvelopeConvention {
        self.inner.envelope.as_ref()
    }

    pub fn debug_mode(&self) -> bool {
        self.inner.debug_mode
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Public HTTP verbs
    // ─────────────────────────────────────────────────────────────────────────

    /// Perform a GET request against a resource path, e.g. `"/projects"`.
    pub fn get(&self, path: &str, params: &[(&str, &str)], headers: &HeaderMap) -> Result<Response> {
        let url = self.url(path)?;
        self.perform_request(Method::GET, url, params, Payload::None, headers, None)
    }

    /// Perform a POST request. With an `upload`, the body fields and the
    /// file are sent as multipart form data instead of JSON.
    pub fn post(
        &self,
        path: &str,
        body: Value,
        upload: Option<Upload>,
        headers: &HeaderMap,
    ) -> Result<Response> {
        let url = self.url(path)?;
        match upload {
            Some(upload) => {
                let multipart = move |request: &mut PreparedRequest| -> Result<()> {
                    request.payload = into_multipart(&request.payload, upload.clone())?;
                    Ok(())
                };
                self.perform_request(
                    Method::POST,
                    url,
                    &[],
                    Payload::Json(body),
                    headers,
                    Some(&multipart),
                )
            }
            None => self.perform_request(Method::POST, url, &[], Payload::Json(body), headers, None),
        }
    }

    /// Perform a PUT request.
    pub fn put(&self, path: &str, body: Value, headers: &HeaderMap) -> Result<Response> {
        let url = self.url(path)?;
        self.perform_request(Method::PUT, url, &[], Payload::Json(body), headers, None)
    }

    /// Perform a DELETE request.
    pub fn delete(
        &self,
        path: &str,
        params: &[(&str, &str)],
        headers: &HeaderMap,
    ) -> Result<Response> {
        let url = self.url(path)?;
        self.perform_request(Method::DELETE, url, params, Payload::None, headers, None)
    }

    /// Fetch the page a pagination cursor points at.
    pub(crate) fn get_cursor(&self, cursor: &Cursor) -> Result<Response> {
        match cursor {
            Cursor::Path(path) => self.get(path, &[], &HeaderMap::new()),
            Cursor::Url(url) => {
                if url.origin() != self.inner.base_uri.origin() {
                    return Err(Error::MalformedEnvelope(format!(
                        "next page link points outside the API: {}",
                        url
                    )));
                }
                self.perform_request(
                    Method::GET,
                    url.clone(),
                    &[],
                    Payload::None,
                    &HeaderMap::new(),
                    None,
                )
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal
    // ─────────────────────────────────────────────────────────────────────────

    /// Build the URL for a resource path: `<base>/<account><path>.json`.
    ///
    /// A query string embedded in `path` (as in legacy next-page paths) is
    /// carried over after the `.json` suffix.
    pub fn url(&self, path: &str) -> Result<Url> {
        let (path, query) = match path.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path, None),
        };
        let separator = if path.starts_with('/') { "" } else { "/" };

        let mut url = self.inner.base_uri.clone();
        let base_path = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!(
            "{}/{}{}{}.json",
            base_path, self.inner.account_id, separator, path
        ));
        url.set_query(query);
        Ok(url)
    }

    fn perform_request(
        &self,
        method: Method,
        url: Url,
        params: &[(&str, &str)],
        payload: Payload,
        headers: &HeaderMap,
        per_call: Option<&dyn Fn(&mut PreparedRequest) -> Result<()>>,
    ) -> Result<Response> {
        let inner = &self.inner;

        let mut request = PreparedRequest::new(method, url);
        request.query = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        request.payload = payload;

        inner.authentication.configure(&mut request.headers)?;
        inner.environment.configure(&mut request.headers);

        // Default headers first, then per-call headers, so per-call wins.
        overlay(&mut request.headers, &inner.default_headers);
        overlay(&mut request.headers, headers);

        if let Some(hook) = per_call {
            hook(&mut request)?;
        }

        configure_format(&mut request);

        if let Some(hook) = &inner.configure {
            hook(&mut request);
        }

        if inner.debug_mode {
            tracing::info!(
                method = %request.method,
                url = %request.url,
                body = %request.payload.describe(),
                "[basecamp] request"
            );
        }

        let method = request.method.clone();
        let url = request.url.clone();
        let response = handling_errors(&url, inner.adapter.execute(request));

        match &response {
            Ok(r) => tracing::debug!(%method, %url, status = r.status, "request completed"),
            Err(e) => tracing::debug!(%method, %url, error = %e, "request failed"),
        }

        response
    }
}

/// Map the adapter outcome: transport failures pass through, non-2xx
/// statuses become typed errors.
fn handling_errors(url: &Url, result: Result<crate::adapter::RawResponse>) -> Result<Response> {
    let raw = result?;
    let body = Body::parse(&raw.body);

    if !(200..300).contains(&raw.status) {
        return Err(error::classify(raw.status, &raw.headers, body));
    }

    Ok(Response {
        url: url.clone(),
        status: raw.status,
        headers: raw.headers,
        body,
    })
}

fn configure_format(request: &mut PreparedRequest) {
    request
        .headers
        .insert(ACCEPT, HeaderValue::from_static("application/json"));

    if matches!(request.payload, Payload::Json(_)) {
        request
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    } else {
        request.headers.remove(CONTENT_TYPE);
    }
}

/// Insert every header of `from` into `into`, replacing same-named ones.
fn overlay(into: &mut HeaderMap, from: &HeaderMap) {
    for name in from.keys() {
        into.remove(name);
        for value in from.get_all(name) {
            into.append(name.clone(), value.clone());
        }
    }
}

fn into_multipart(payload: &Payload, file: Upload) -> Result<Payload> {
    let fields = match payload {
        Payload::Json(Value::Object(map)) => map.clone(),
        Payload::Json(Value::Null) | Payload::None => Map::new(),
        _ => {
            return Err(Error::InvalidInput(
                "multipart body must be a JSON object".to_string(),
            ));
        }
    };
    Ok(Payload::Multipart { fields, file })
}
