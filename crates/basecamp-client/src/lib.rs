//! Blocking HTTP client SDK for the Basecamp 3 API.
//!
//! Every request flows through one [`HttpTransport`], which attaches
//! credentials and client identification, executes the call through a
//! pluggable network [`Adapter`] and maps failures onto [`Error`]. JSON
//! payloads are wrapped into navigable [`Resource`]s and paginated
//! [`Collection`]s.
//!
//! # Example
//!
//! ```no_run
//! use basecamp_client::{Client, Result};
//!
//! # fn example() -> Result<()> {
//! let client = Client::builder()
//!     .bearer_token("token")
//!     .account_id(999999999)
//!     .application_info("My App (ops@example.com)")
//!     .build()?;
//!
//! // Typed access
//! let project = client.projects().get(1)?;
//! println!("{}", project.name()?);
//!
//! // Walk every page of a collection
//! let projects = client.projects().list()?;
//! println!("{} projects", projects.total_count().unwrap_or(0));
//! for project in &projects {
//!     let project = project?;
//!     println!("{}", project.str("name")?);
//! }
//!
//! // Anything else, raw
//! let response = client.get("/my/profile", &[])?;
//! println!("{}", response.body);
//! # Ok(())
//! # }
//! ```
//!
//! # Components
//!
//! - [`transport`] — request composition and execution
//! - [`adapter`] — the network layer ([`ReqwestAdapter`] by default)
//! - [`environment`] — `User-Agent` and telemetry headers
//! - [`envelope`] — payload and pagination metadata extraction
//! - [`error`] — error taxonomy and HTTP status mapping
//! - [`resource`], [`collection`] — resource wrappers
//! - [`registry`], [`api`] — resource kinds and their operations

pub mod adapter;
pub mod api;
pub mod client;
pub mod collection;
pub mod envelope;
pub mod environment;
pub mod error;
pub mod registry;
pub mod resource;
pub mod response;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use adapter::{Adapter, RawResponse, ReqwestAdapter};
pub use api::{PeopleApi, Person, Project, ProjectsApi, ResourceApi};
pub use client::{Client, ClientBuilder};
pub use collection::Collection;
pub use envelope::{Cursor, DataEnvelope, Envelope, EnvelopeConvention, HeaderEnvelope, PageInfo};
pub use environment::{EnvironmentInfo, Platform};
pub use error::{Error, Result};
pub use registry::ResourceKind;
pub use resource::{Field, Resource};
pub use response::{Body, Response};
pub use transport::{HttpTransport, Payload, PreparedRequest, Upload};

pub use basecamp_auth::{
    AccessToken, AuthError, Authentication, OAuthConfig, OAuthRefresher, TokenRefresher,
};
