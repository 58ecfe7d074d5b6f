//! Authentication strategies for the Basecamp API.
//!
//! A strategy attaches credentials to the headers of an outgoing request.
//! Two strategies exist:
//!
//! - [`BearerTokenAuth`] — a plain OAuth2 bearer token obtained elsewhere.
//!   It never refreshes.
//! - [`AccessTokenAuth`] — an access/refresh token pair with an expiry. When
//!   the token has expired it is refreshed through a [`TokenRefresher`]
//!   before the header is set.
//!
//! # Components
//!
//! - [`strategy`] — the [`Authentication`] tagged union and its variants
//! - [`token`] — [`AccessToken`], the [`TokenRefresher`] capability and the
//!   Launchpad-backed [`OAuthRefresher`]

pub mod error;
pub mod strategy;
pub mod token;

pub use error::{AuthError, Result};
pub use strategy::{AccessTokenAuth, Authentication, BearerTokenAuth};
pub use token::{AccessToken, LAUNCHPAD_TOKEN_URL, OAuthConfig, OAuthRefresher, TokenRefresher};
