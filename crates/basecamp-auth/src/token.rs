//! OAuth2 access tokens and the refresh capability.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{AuthError, Result};

/// Token endpoint of the 37signals Launchpad authorization server.
pub const LAUNCHPAD_TOKEN_URL: &str = "https://launchpad.37signals.com/authorization/token";

/// Timeout for token endpoint requests.
const REFRESH_TIMEOUT: Duration = Duration::from_secs(30);

/// An OAuth2 access token together with the refresh token that renews it.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    /// The bearer value sent in the `Authorization` header.
    pub token: String,
    /// The refresh token. May be empty when the server never issued one.
    pub refresh_token: String,
    /// When the token stops being valid. `None` means it never expires.
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Create a token that never expires.
    pub fn new(token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            refresh_token: refresh_token.into(),
            expires_at: None,
        }
    }

    /// Set an absolute expiry.
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Set the expiry relative to now, the way token endpoints report it.
    pub fn expires_in(self, seconds: i64) -> Self {
        self.with_expiry(Utc::now() + chrono::Duration::seconds(seconds))
    }

    /// Whether the token has expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Whether the token has expired at the given instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(at) if at <= now)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"[redacted]")
            .field("refresh_token", &"[redacted]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Capability that exchanges an expired token for a fresh one.
///
/// Implementations block until the new token is available. A refresh
/// failure is returned as-is; callers never retry.
pub trait TokenRefresher: Send + Sync + fmt::Debug {
    /// Obtain a new token from the expired `token`.
    fn refresh(&self, token: &AccessToken) -> Result<AccessToken>;
}

/// OAuth client registration used for the `refresh_token` grant.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub token_url: String,
}

impl OAuthConfig {
    /// Create a config pointing at the Launchpad token endpoint.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            token_url: LAUNCHPAD_TOKEN_URL.to_string(),
        }
    }

    /// Use a different token endpoint.
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Refreshes tokens with an OAuth2 `refresh_token` grant.
#[derive(Debug)]
pub struct OAuthRefresher {
    config: OAuthConfig,
    http: reqwest::blocking::Client,
}

impl OAuthRefresher {
    /// Create a refresher for the given client registration.
    pub fn new(config: OAuthConfig) -> Result<Self> {
        if config.client_id.is_empty() {
            return Err(AuthError::Config("client_id is required".to_string()));
        }
        let http = reqwest::blocking::Client::builder()
            .timeout(REFRESH_TIMEOUT)
            .build()?;
        Ok(Self { config, http })
    }

    /// The client registration in use.
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }
}

impl TokenRefresher for OAuthRefresher {
    fn refresh(&self, token: &AccessToken) -> Result<AccessToken> {
        if token.refresh_token.is_empty() {
            return Err(AuthError::Refresh(
                "no refresh token available".to_string(),
            ));
        }

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", token.refresh_token.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        let response = self
            .http
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .map_err(|e| AuthError::Network(format!("Token refresh request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AuthError::Refresh(format!(
                "token endpoint returned {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        let body: TokenResponse = response
            .json()
            .map_err(|e| AuthError::Refresh(format!("Failed to parse token response: {}", e)))?;

        let refreshed = AccessToken::new(body.access_token, body.refresh_token.unwrap_or_default());
        Ok(match body.expires_in {
            Some(seconds) => refreshed.expires_in(seconds),
            None => refreshed,
        })
    }
}
