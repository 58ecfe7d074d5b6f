//! Resource-level operations.
//!
//! Typed entry points exist for the common resources ([`ProjectsApi`],
//! [`PeopleApi`]); anything in the registry can also be reached by plural
//! name through [`ResourceApi`].

pub mod people;
pub mod projects;

pub use people::{PeopleApi, Person};
pub use projects::{Project, ProjectsApi};

use crate::collection::Collection;
use crate::error::{Error, Result};
use crate::registry::ResourceKind;
use crate::resource::Resource;
use crate::transport::HttpTransport;

/// Operations on a registered resource kind.
#[derive(Debug, Clone)]
pub struct ResourceApi {
    kind: &'static ResourceKind,
    client: HttpTransport,
}

impl ResourceApi {
    pub fn new(kind: &'static ResourceKind, client: HttpTransport) -> Self {
        Self { kind, client }
    }

    pub fn kind(&self) -> &'static ResourceKind {
        self.kind
    }

    /// List every resource of this kind.
    pub fn find_all(&self) -> Result<Collection> {
        let find_all = self.kind.find_all.ok_or_else(|| self.unsupported("find_all"))?;
        find_all(&self.client)
    }

    /// Fetch one resource by identifier.
    pub fn find_by_id(&self, id: &str) -> Result<Resource> {
        let find_by_id = self.kind.find_by_id.ok_or_else(|| self.unsupported("find_by_id"))?;
        find_by_id(&self.client, id)
    }

    fn unsupported(&self, operation: &'static str) -> Error {
        Error::UnsupportedOperation {
            kind: self.kind.name,
            operation,
        }
    }
}
