//! Network adapters: the layer that actually puts bytes on the wire.

use std::fmt;
use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::header::HeaderMap;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::transport::{Payload, PreparedRequest, Upload};

/// Default timeout for requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A response as received from the network, before error mapping.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Executes a fully prepared request.
///
/// Implementations block until the response arrives. Connection, timeout,
/// DNS and TLS failures are reported as [`crate::Error::Transport`]; HTTP
/// error statuses are *not* errors at this level.
pub trait Adapter: Send + Sync + fmt::Debug {
    fn execute(&self, request: PreparedRequest) -> Result<RawResponse>;
}

/// The default adapter, backed by a pooled blocking reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestAdapter {
    http: reqwest::blocking::Client,
}

impl ReqwestAdapter {
    /// Create an adapter with the default timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create an adapter with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(5)
            .tcp_keepalive(Duration::from_secs(30))
            .build()
            .map_err(client_build_error)?;
        Ok(Self { http })
    }

    /// Wrap an existing reqwest client.
    pub fn from_client(http: reqwest::blocking::Client) -> Self {
        Self { http }
    }
}

impl Adapter for ReqwestAdapter {
    fn execute(&self, request: PreparedRequest) -> Result<RawResponse> {
        let PreparedRequest {
            method,
            url,
            headers,
            query,
            payload,
        } = request;

        let mut builder = self.http.request(method, url).headers(headers);

        if !query.is_empty() {
            builder = builder.query(&query);
        }

        builder = match payload {
            Payload::None => builder,
            Payload::Json(json) => builder.body(serde_json::to_vec(&json)?),
            Payload::Multipart { fields, file } => builder.multipart(multipart_form(fields, file)?),
        };

        let response = builder.send()?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes()?.to_vec();

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

/// The HTTP client could not be set up. Nothing was sent.
fn client_build_error(e: reqwest::Error) -> Error {
    Error::Config(format!("failed to create HTTP client: {}", e))
}

/// Body fields become text parts; the upload goes in the `file` part.
fn multipart_form(fields: Map<String, Value>, file: Upload) -> Result<Form> {
    let mut form = Form::new();
    for (name, value) in fields {
        let text = match value {
            Value::String(s) => s,
            other => other.to_string(),
        };
        form = form.text(name, text);
    }

    let part = Part::bytes(file.bytes)
        .file_name(file.file_name)
        .mime_str(&file.content_type)
        .map_err(|_| {
            Error::InvalidInput(format!("invalid upload content type: {}", file.content_type))
        })?;
    Ok(form.part("file", part))
}
