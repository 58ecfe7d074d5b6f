//! Error types for authentication.

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur while attaching or refreshing credentials.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The token cannot be carried in an HTTP header.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Network/HTTP error talking to the token endpoint.
    #[error("Network error: {0}")]
    Network(String),

    /// The token endpoint rejected the refresh or answered with garbage.
    #[error("Token refresh failed: {0}")]
    Refresh(String),

    /// Invalid OAuth configuration.
    #[error("Config error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        AuthError::Network(e.to_string())
    }
}
