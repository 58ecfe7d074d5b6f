//! Authentication strategies.
//!
//! Each strategy mutates the headers of an outgoing request and nothing
//! else. Exactly one strategy is active per transport.

use std::sync::Arc;

use parking_lot::Mutex;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

use crate::error::{AuthError, Result};
use crate::token::{AccessToken, TokenRefresher};

/// The authentication strategy of a transport.
#[derive(Debug)]
pub enum Authentication {
    /// Plain bearer token, never refreshed.
    BearerToken(BearerTokenAuth),
    /// Access token refreshed on expiry.
    AccessToken(AccessTokenAuth),
}

impl Authentication {
    /// Authenticate with a plain bearer token.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::BearerToken(BearerTokenAuth::new(token))
    }

    /// Authenticate with an access token that `refresher` renews on expiry.
    pub fn access_token(token: AccessToken, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self::AccessToken(AccessTokenAuth::new(token, refresher))
    }

    /// Attach credentials to the outgoing request headers.
    pub fn configure(&self, headers: &mut HeaderMap) -> Result<()> {
        match self {
            Self::BearerToken(auth) => auth.configure(headers),
            Self::AccessToken(auth) => auth.configure(headers),
        }
    }

    /// Short name of the strategy, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BearerToken(_) => "bearer_token",
            Self::AccessToken(_) => "access_token",
        }
    }
}

/// Authenticates with an OAuth2 bearer token obtained elsewhere.
///
/// This strategy never refreshes. With a refresh token at hand, use
/// [`AccessTokenAuth`] instead.
#[derive(Debug)]
pub struct BearerTokenAuth {
    token: String,
}

impl BearerTokenAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn configure(&self, headers: &mut HeaderMap) -> Result<()> {
        headers.insert(AUTHORIZATION, bearer_header(&self.token)?);
        Ok(())
    }
}

/// Authenticates with an access token, refreshing it when expired.
///
/// The check-expired/refresh/store sequence runs under a lock, so callers
/// sharing one instance across threads trigger at most one refresh per
/// expiry and never overwrite a token refreshed by someone else.
#[derive(Debug)]
pub struct AccessTokenAuth {
    token: Mutex<AccessToken>,
    refresher: Arc<dyn TokenRefresher>,
}

impl AccessTokenAuth {
    pub fn new(token: AccessToken, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            token: Mutex::new(token),
            refresher,
        }
    }

    /// Snapshot of the currently held token.
    pub fn current_token(&self) -> AccessToken {
        self.token.lock().clone()
    }

    pub fn configure(&self, headers: &mut HeaderMap) -> Result<()> {
        let token = self.valid_token()?;
        headers.insert(AUTHORIZATION, bearer_header(&token)?);
        Ok(())
    }

    /// Return a usable token value, refreshing the held token first if it
    /// has expired.
    fn valid_token(&self) -> Result<String> {
        let mut held = self.token.lock();

        if held.is_expired() {
            tracing::info!("Access token expired, refreshing");
            let mut refreshed = self.refresher.refresh(&held)?;

            if refreshed.refresh_token.is_empty() {
                refreshed.refresh_token = held.refresh_token.clone();
            }

            *held = refreshed;
            tracing::info!(expires_at = ?held.expires_at, "Access token refreshed");
        }

        Ok(held.token.clone())
    }
}

fn bearer_header(token: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|_| AuthError::InvalidToken("token contains invalid header characters".to_string()))?;
    value.set_sensitive(true);
    Ok(value)
}
