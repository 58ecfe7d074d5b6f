//! Config file types and their conversion into a client builder.
//!
//! ```toml
//! account-id = 999999999
//! application-info = "My App (ops@example.com)"
//! envelope = "header"
//! debug = false
//! timeout = 30
//!
//! [headers]
//! x-team = "platform"
//!
//! [auth]
//! type = "oauth"
//! access-token = "..."
//! refresh-token = "..."
//! expires-at = "2026-01-01T00:00:00Z"
//! client-id = "..."
//! client-secret = "..."
//! redirect-uri = "https://example.com/callback"
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use basecamp_auth::{AccessToken, Authentication, OAuthConfig, OAuthRefresher};
use basecamp_client::{ClientBuilder, DataEnvelope, EnvelopeConvention, HeaderEnvelope};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Overrides the configured account.
pub const ACCOUNT_ID_ENV: &str = "BASECAMP_ACCOUNT_ID";

/// Overrides the configured credential with a bearer token.
pub const ACCESS_TOKEN_ENV: &str = "BASECAMP_ACCESS_TOKEN";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BasecampConfig {
    /// Basecamp account ID, the first path segment of every API URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<u64>,

    /// Application name and contact, sent in the `User-Agent`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_info: Option<String>,

    /// API base URI override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_uri: Option<String>,

    /// How the deployment reports pagination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub envelope: Option<EnvelopeKind>,

    /// Log each outgoing request.
    #[serde(default)]
    pub debug: bool,

    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Headers sent with every request.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,
}

/// Response envelope convention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnvelopeKind {
    /// Bare bodies with `X-Total-Count` and `Link` headers.
    #[default]
    Header,
    /// Legacy `{"data": ..., "next_page": {"path": ...}}` bodies.
    Data,
}

impl EnvelopeKind {
    pub fn convention(self) -> Arc<dyn EnvelopeConvention> {
        match self {
            EnvelopeKind::Header => Arc::new(HeaderEnvelope),
            EnvelopeKind::Data => Arc::new(DataEnvelope),
        }
    }
}

/// Credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AuthConfig {
    /// A bearer token that never refreshes.
    #[serde(rename_all = "kebab-case")]
    Bearer {
        /// The token itself.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
        /// Environment variable containing the token.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token_env: Option<String>,
    },

    /// An access/refresh token pair refreshed through Launchpad.
    #[serde(rename_all = "kebab-case")]
    Oauth {
        access_token: String,
        refresh_token: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expires_at: Option<DateTime<Utc>>,
        client_id: String,
        client_secret: String,
        redirect_uri: String,
        /// Token endpoint override.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token_url: Option<String>,
    },
}

impl AuthConfig {
    /// Bearer auth with an inline token.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: Some(token.into()),
            token_env: None,
        }
    }

    /// Bearer auth reading the token from an environment variable.
    pub fn bearer_env(var: impl Into<String>) -> Self {
        Self::Bearer {
            token: None,
            token_env: Some(var.into()),
        }
    }

    /// Build the authentication strategy.
    ///
    /// `lookup` resolves environment variables.
    pub fn resolve(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<Authentication> {
        match self {
            AuthConfig::Bearer { token, token_env } => {
                let token = match (token, token_env) {
                    (Some(token), _) => token.clone(),
                    (None, Some(var)) => lookup(var)
                        .filter(|token| !token.is_empty())
                        .ok_or_else(|| ConfigError::MissingCredential {
                            env_var: var.clone(),
                        })?,
                    (None, None) => {
                        return Err(ConfigError::MissingField {
                            field: "token".to_string(),
                            context: "[auth]".to_string(),
                        });
                    }
                };
                Ok(Authentication::bearer(token))
            }
            AuthConfig::Oauth {
                access_token,
                refresh_token,
                expires_at,
                client_id,
                client_secret,
                redirect_uri,
                token_url,
            } => {
                let mut oauth = OAuthConfig::new(client_id, client_secret, redirect_uri);
                if let Some(url) = token_url {
                    oauth = oauth.with_token_url(url);
                }
                let mut token = AccessToken::new(access_token, refresh_token);
                if let Some(at) = expires_at {
                    token = token.with_expiry(*at);
                }
                let refresher = OAuthRefresher::new(oauth)?;
                Ok(Authentication::access_token(token, Arc::new(refresher)))
            }
        }
    }
}

impl BasecampConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply `BASECAMP_ACCOUNT_ID` and `BASECAMP_ACCESS_TOKEN` from the
    /// process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(id) = lookup(ACCOUNT_ID_ENV).filter(|v| !v.is_empty()) {
            let id = id.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: ACCOUNT_ID_ENV.to_string(),
                message: format!("'{}' is not an account number", id),
            })?;
            self.account_id = Some(id);
        }

        if let Some(token) = lookup(ACCESS_TOKEN_ENV).filter(|v| !v.is_empty()) {
            tracing::debug!("using access token from {}", ACCESS_TOKEN_ENV);
            self.auth = Some(AuthConfig::bearer(token));
        }

        Ok(())
    }

    /// Turn the config into a client builder.
    pub fn into_builder(self) -> Result<ClientBuilder> {
        self.into_builder_with(|var| std::env::var(var).ok())
    }

    /// Like [`into_builder`](Self::into_builder), resolving environment
    /// variables through `lookup`.
    pub fn into_builder_with(self, lookup: impl Fn(&str) -> Option<String>) -> Result<ClientBuilder> {
        let account_id = self.account_id.ok_or_else(|| ConfigError::MissingField {
            field: "account-id".to_string(),
            context: format!("config (or set {})", ACCOUNT_ID_ENV),
        })?;
        let authentication = self
            .auth
            .as_ref()
            .ok_or_else(|| ConfigError::MissingCredential {
                env_var: ACCESS_TOKEN_ENV.to_string(),
            })?
            .resolve(lookup)?;

        let mut builder = ClientBuilder::new()
            .authentication(authentication)
            .account_id(account_id)
            .debug_mode(self.debug)
            .default_headers(self.headers);

        if let Some(info) = self.application_info {
            builder = builder.application_info(info);
        }
        if let Some(uri) = self.base_uri {
            builder = builder.base_uri(uri);
        }
        if let Some(secs) = self.timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(envelope) = self.envelope {
            builder = builder.envelope(envelope.convention());
        }

        Ok(builder)
    }
}
