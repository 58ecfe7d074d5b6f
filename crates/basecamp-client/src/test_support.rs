//! Shared fixtures for unit tests.

use std::sync::Arc;

use parking_lot::Mutex;
use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{Value, json};

use crate::adapter::{Adapter, RawResponse};
use crate::envelope::EnvelopeConvention;
use crate::error::{Error, Result};
use crate::registry::ResourceKind;
use crate::resource::Resource;
use crate::transport::{HttpTransport, PreparedRequest};

/// Adapter that answers from canned responses keyed by method and full URL
/// (query included), and records every request it sees.
#[derive(Debug, Clone, Default)]
pub struct StubAdapter {
    state: Arc<Mutex<StubState>>,
}

#[derive(Debug, Default)]
struct StubState {
    routes: Vec<Route>,
    requests: Vec<PreparedRequest>,
}

#[derive(Debug)]
struct Route {
    method: Method,
    url: String,
    response: RawResponse,
}

impl StubAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `method url` with `status` and a JSON body. `null` means no
    /// body. Later registrations win over earlier ones.
    pub fn on(&self, method: Method, url: &str, status: u16, body: Value) {
        self.on_with_headers(method, url, status, &[], body);
    }

    pub fn on_with_headers(
        &self,
        method: Method,
        url: &str,
        status: u16,
        headers: &[(&str, &str)],
        body: Value,
    ) {
        let mut map = HeaderMap::new();
        for &(name, value) in headers {
            map.append(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        let body = if body.is_null() {
            Vec::new()
        } else {
            serde_json::to_vec(&body).unwrap()
        };

        self.state.lock().routes.push(Route {
            method,
            url: url.to_string(),
            response: RawResponse {
                status,
                headers: map,
                body,
            },
        });
    }

    /// Number of requests executed so far.
    pub fn calls(&self) -> usize {
        self.state.lock().requests.len()
    }

    pub fn last_request(&self) -> Option<PreparedRequest> {
        self.state.lock().requests.last().cloned()
    }
}

impl Adapter for StubAdapter {
    fn execute(&self, request: PreparedRequest) -> Result<RawResponse> {
        let mut url = request.url.clone();
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }

        let mut state = self.state.lock();
        let response = state
            .routes
            .iter()
            .rev()
            .find(|route| route.method == request.method && route.url == url.as_str())
            .map(|route| route.response.clone());
        state.requests.push(request);

        response.ok_or_else(|| Error::transport(format!("connection refused: {}", url)))
    }
}

/// A transport against `https://example.test`, account 999999999, bearer
/// token `foo`.
pub fn transport_with(stub: StubAdapter) -> HttpTransport {
    crate::Client::builder()
        .bearer_token("foo")
        .account_id(999999999)
        .base_uri("https://example.test")
        .application_info("Basecamp Client")
        .adapter(Arc::new(stub))
        .build_transport()
        .unwrap()
}

pub fn transport_with_envelope(
    stub: StubAdapter,
    envelope: Arc<dyn EnvelopeConvention>,
) -> HttpTransport {
    crate::Client::builder()
        .bearer_token("foo")
        .account_id(999999999)
        .base_uri("https://example.test")
        .application_info("Basecamp Client")
        .adapter(Arc::new(stub))
        .envelope(envelope)
        .build_transport()
        .unwrap()
}

fn white() -> Value {
    json!("white")
}

fn find_unicorn(client: &HttpTransport, id: &str) -> Result<Resource> {
    Resource::new(&UNICORN, json!({ "gid": id }), client.clone())
}

/// A resource kind identified by `gid`, with a local `find_by_id`.
pub static UNICORN: ResourceKind = ResourceKind {
    name: "Unicorn",
    plural_name: "unicorns",
    id_field: "gid",
    defaults: &[("color", white)],
    find_all: None,
    find_by_id: Some(find_unicorn),
};
