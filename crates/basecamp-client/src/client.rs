//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use basecamp_auth::{AccessToken, Authentication, TokenRefresher};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use url::Url;

use crate::adapter::{Adapter, DEFAULT_TIMEOUT, ReqwestAdapter};
use crate::api::{PeopleApi, ProjectsApi, ResourceApi};
use crate::envelope::{EnvelopeConvention, HeaderEnvelope};
use crate::environment::EnvironmentInfo;
use crate::error::{Error, Result};
use crate::registry;
use crate::response::Response;
use crate::transport::{BASE_URI, HttpTransport, PreparedRequest, RequestHook, TransportInner, Upload};

/// Basecamp API client.
///
/// Exposes raw HTTP verbs for endpoints without a dedicated type, and typed
/// access to the common resources.
///
/// # Example
///
/// ```no_run
/// use basecamp_client::Client;
///
/// # fn example() -> basecamp_client::Result<()> {
/// let client = Client::builder()
///     .bearer_token("token")
///     .account_id(999999999)
///     .application_info("My App (ops@example.com)")
///     .build()?;
///
/// for project in &client.projects().list()? {
///     println!("{}", project?.str("name")?);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    transport: HttpTransport,
}

impl Client {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// The transport every request goes through.
    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    pub fn account_id(&self) -> u64 {
        self.transport.account_id()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Raw HTTP verbs
    // ─────────────────────────────────────────────────────────────────────────

    /// GET an arbitrary API path.
    pub fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Response> {
        self.transport.get(path, params, &HeaderMap::new())
    }

    /// POST to an arbitrary API path, optionally with a file upload.
    pub fn post(&self, path: &str, body: Value, upload: Option<Upload>) -> Result<Response> {
        self.transport.post(path, body, upload, &HeaderMap::new())
    }

    /// PUT to an arbitrary API path.
    pub fn put(&self, path: &str, body: Value) -> Result<Response> {
        self.transport.put(path, body, &HeaderMap::new())
    }

    /// DELETE an arbitrary API path.
    pub fn delete(&self, path: &str, params: &[(&str, &str)]) -> Result<Response> {
        self.transport.delete(path, params, &HeaderMap::new())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the projects API.
    pub fn projects(&self) -> ProjectsApi {
        ProjectsApi::new(self.transport.clone())
    }

    /// Access the people API.
    pub fn people(&self) -> PeopleApi {
        PeopleApi::new(self.transport.clone())
    }

    /// Access a registered resource by plural name, e.g. `"projects"`.
    pub fn resource(&self, plural_name: &str) -> Option<ResourceApi> {
        registry::lookup(plural_name).map(|kind| ResourceApi::new(kind, self.transport.clone()))
    }
}

/// Builder for [`Client`].
pub struct ClientBuilder {
    authentication: Option<Authentication>,
    account_id: Option<u64>,
    application_info: Option<String>,
    base_uri: String,
    adapter: Option<Arc<dyn Adapter>>,
    timeout: Duration,
    configure: Option<RequestHook>,
    debug_mode: bool,
    default_headers: Vec<(String, String)>,
    envelope: Arc<dyn EnvelopeConvention>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            authentication: None,
            account_id: None,
            application_info: None,
            base_uri: BASE_URI.to_string(),
            adapter: None,
            timeout: DEFAULT_TIMEOUT,
            configure: None,
            debug_mode: false,
            default_headers: Vec::new(),
            envelope: Arc::new(HeaderEnvelope),
        }
    }

    /// Authenticate with a plain OAuth2 bearer token.
    pub fn bearer_token(self, token: impl Into<String>) -> Self {
        self.authentication(Authentication::bearer(token))
    }

    /// Authenticate with an expiring access token, refreshed through
    /// `refresher` when it expires.
    pub fn access_token(self, token: AccessToken, refresher: Arc<dyn TokenRefresher>) -> Self {
        self.authentication(Authentication::access_token(token, refresher))
    }

    /// Set the authentication strategy.
    pub fn authentication(mut self, authentication: Authentication) -> Self {
        self.authentication = Some(authentication);
        self
    }

    /// Set the Basecamp account ID.
    pub fn account_id(mut self, account_id: u64) -> Self {
        self.account_id = Some(account_id);
        self
    }

    /// Identify the application, e.g. `"My App (ops@example.com)"`.
    pub fn application_info(mut self, info: impl Into<String>) -> Self {
        self.application_info = Some(info.into());
        self
    }

    /// Override the API base URI.
    pub fn base_uri(mut self, uri: impl Into<String>) -> Self {
        self.base_uri = uri.into();
        self
    }

    /// Use a custom network adapter.
    pub fn adapter(mut self, adapter: Arc<dyn Adapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    /// Request timeout of the default adapter. Ignored with a custom adapter.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Customize every request right before it is executed.
    pub fn configure<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut PreparedRequest) + Send + Sync + 'static,
    {
        self.configure = Some(Arc::new(hook));
        self
    }

    /// Log each outgoing request (method, URL, body).
    pub fn debug_mode(mut self, enabled: bool) -> Self {
        self.debug_mode = enabled;
        self
    }

    /// Add a header sent with every request. Per-call headers win.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Add several default headers.
    pub fn default_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.default_headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Choose how responses carry pagination metadata.
    pub fn envelope(mut self, envelope: Arc<dyn EnvelopeConvention>) -> Self {
        self.envelope = envelope;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<Client> {
        Ok(Client {
            transport: self.build_transport()?,
        })
    }

    /// Build only the transport.
    pub fn build_transport(self) -> Result<HttpTransport> {
        let authentication = self
            .authentication
            .ok_or_else(|| Error::Config("authentication is required".to_string()))?;
        let account_id = self
            .account_id
            .ok_or_else(|| Error::Config("account_id is required".to_string()))?;

        let base_uri = Url::parse(&self.base_uri)?;
        if base_uri.cannot_be_a_base() {
            return Err(Error::Config(format!("invalid base URI: {}", self.base_uri)));
        }

        let mut default_headers = HeaderMap::new();
        for (name, value) in &self.default_headers {
            let header = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| Error::Config(format!("invalid header name: {}", name)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| Error::Config(format!("invalid value for header {}", name)))?;
            default_headers.insert(header, value);
        }

        let environment = EnvironmentInfo::new(self.application_info)?;

        let adapter: Arc<dyn Adapter> = match self.adapter {
            Some(adapter) => adapter,
            None => Arc::new(ReqwestAdapter::with_timeout(self.timeout)?),
        };

        tracing::debug!(
            %base_uri,
            account_id,
            authentication = authentication.kind(),
            "building transport"
        );

        Ok(HttpTransport::from_inner(TransportInner {
            base_uri,
            account_id,
            authentication,
            environment,
            adapter,
            envelope: self.envelope,
            debug_mode: self.debug_mode,
            default_headers,
            configure: self.configure,
        }))
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
