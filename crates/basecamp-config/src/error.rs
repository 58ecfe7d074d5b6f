//! Configuration error types.

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading a config or turning it into a client.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a config file.
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to write a config file.
    #[error("failed to write config file '{path}': {source}")]
    WriteFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Failed to serialize config.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Missing required field.
    #[error("missing required field '{field}' in {context}")]
    MissingField { field: String, context: String },

    /// A value is present but unusable.
    #[error("invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// No credential could be resolved.
    #[error("no access token found: set [auth] in the config file or {env_var}")]
    MissingCredential { env_var: String },

    /// The OAuth refresher could not be created.
    #[error("failed to set up token refresh: {0}")]
    Auth(#[from] basecamp_auth::AuthError),
}
