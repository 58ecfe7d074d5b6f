//! Configuration for the Basecamp client.
//!
//! A TOML file holds the account, the credentials and client options;
//! `BASECAMP_ACCOUNT_ID` and `BASECAMP_ACCESS_TOKEN` override it. The
//! result converts into a [`basecamp_client::ClientBuilder`].

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    CONFIG_DIR_ENV, config_dir, config_path, load_config, load_config_file, save_config,
};
pub use error::{ConfigError, Result};
pub use types::{ACCESS_TOKEN_ENV, ACCOUNT_ID_ENV, AuthConfig, BasecampConfig, EnvelopeKind};
