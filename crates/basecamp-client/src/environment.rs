//! Client identification headers attached to every request.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};

use crate::error::{Error, Result};

/// Library name reported in the user agent.
pub const LIBRARY_NAME: &str = "basecamp-rs";

/// Library version reported in the user agent and telemetry header.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Header carrying the client telemetry string.
pub const CLIENT_LIB_HEADER: HeaderName = HeaderName::from_static("x-basecamp-client-lib");

/// Version of the compiler that built this library.
pub const RUSTC_VERSION: &str = env!("BASECAMP_RUSTC_VERSION");

/// TLS backend compiled into the default adapter.
const TLS_BACKEND: &str = "rustls";

/// Version of the TLS backend, from the lockfile at build time.
const TLS_VERSION: &str = env!("BASECAMP_RUSTLS_VERSION");

/// Operating system family the client runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Linux,
    Darwin,
    FreeBsd,
    Unknown,
}

impl Platform {
    /// Detect the platform this binary was built for.
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    fn from_os(os: &str) -> Self {
        match os {
            "windows" => Platform::Windows,
            "linux" => Platform::Linux,
            "macos" | "ios" => Platform::Darwin,
            "freebsd" => Platform::FreeBsd,
            _ => Platform::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::Darwin => "darwin",
            Platform::FreeBsd => "freebsd",
            Platform::Unknown => "unknown",
        }
    }
}

/// Identification of the library and the application using it.
///
/// Built once per transport and read-only afterwards.
#[derive(Debug, Clone)]
pub struct EnvironmentInfo {
    application_info: Option<String>,
    client_version: &'static str,
    platform: Platform,
    user_agent: HeaderValue,
    client_lib: HeaderValue,
}

impl EnvironmentInfo {
    /// Build the environment info.
    ///
    /// Basecamp asks integrators to identify their application and a way to
    /// contact them. Without it a warning is logged; the request still goes
    /// out.
    pub fn new(application_info: Option<String>) -> Result<Self> {
        let application_info = application_info
            .map(|info| info.trim().to_string())
            .filter(|info| !info.is_empty());

        if application_info.is_none() {
            tracing::warn!(
                "No application info configured. Set it to your app name and a contact \
                 (e.g. \"MyApp (ops@example.com)\"); unidentified requests may be rate \
                 limited or blocked"
            );
        }

        let platform = Platform::current();
        let user_agent = user_agent_string(application_info.as_deref());
        let user_agent = HeaderValue::from_str(&user_agent).map_err(|_| {
            Error::Config("application info contains invalid header characters".to_string())
        })?;
        let client_lib = HeaderValue::from_str(&client_lib_string(platform))
            .map_err(|_| Error::Config("invalid client telemetry header".to_string()))?;

        Ok(Self {
            application_info,
            client_version: VERSION,
            platform,
            user_agent,
            client_lib,
        })
    }

    pub fn application_info(&self) -> Option<&str> {
        self.application_info.as_deref()
    }

    pub fn client_version(&self) -> &str {
        self.client_version
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.to_str().unwrap_or(LIBRARY_NAME)
    }

    /// Set `User-Agent` and the telemetry header.
    pub fn configure(&self, headers: &mut HeaderMap) {
        headers.insert(USER_AGENT, self.user_agent.clone());
        headers.insert(CLIENT_LIB_HEADER, self.client_lib.clone());
    }
}

fn user_agent_string(application_info: Option<&str>) -> String {
    match application_info {
        Some(info) => format!("{} v{} {}", LIBRARY_NAME, VERSION, info),
        None => format!("{} v{}", LIBRARY_NAME, VERSION),
    }
}

fn client_lib_string(platform: Platform) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair("os", platform.as_str())
        .append_pair("language", "rust")
        .append_pair("language_version", RUSTC_VERSION)
        .append_pair("version", VERSION)
        .append_pair("tls", &format!("{} {}", TLS_BACKEND, TLS_VERSION))
        .finish()
}
