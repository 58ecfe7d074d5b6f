//! Resource kinds and the table of operations each one supports.
//!
//! A [`ResourceKind`] is a static description of one API resource type:
//! its names, the field that identifies it, default field values and the
//! lookups the API offers for it. The [`REGISTRY`] maps plural names to
//! kinds so that callers can reach resources by name at runtime.

use std::fmt;

use serde_json::Value;

use crate::collection::Collection;
use crate::error::Result;
use crate::resource::Resource;
use crate::transport::HttpTransport;

/// Lists every resource of a kind.
pub type FindAll = fn(&HttpTransport) -> Result<Collection>;

/// Fetches a single resource by its identifier.
pub type FindById = fn(&HttpTransport, &str) -> Result<Resource>;

/// Produces the default value of a field.
pub type FieldDefault = fn() -> Value;

/// Static description of a resource type.
pub struct ResourceKind {
    pub name: &'static str,
    pub plural_name: &'static str,
    /// Field holding the identifier used by `find_by_id`.
    pub id_field: &'static str,
    /// Values for fields the server may omit.
    pub defaults: &'static [(&'static str, FieldDefault)],
    pub find_all: Option<FindAll>,
    pub find_by_id: Option<FindById>,
}

impl ResourceKind {
    pub fn supports_find_all(&self) -> bool {
        self.find_all.is_some()
    }

    pub fn supports_find_by_id(&self) -> bool {
        self.find_by_id.is_some()
    }
}

impl fmt::Debug for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceKind")
            .field("name", &self.name)
            .field("plural_name", &self.plural_name)
            .field("id_field", &self.id_field)
            .field("find_all", &self.find_all.is_some())
            .field("find_by_id", &self.find_by_id.is_some())
            .finish()
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Kind for nested objects and anything without a dedicated type.
pub static GENERIC: ResourceKind = ResourceKind {
    name: "Resource",
    plural_name: "resources",
    id_field: "id",
    defaults: &[],
    find_all: None,
    find_by_id: None,
};

/// Every resource kind reachable by plural name.
pub static REGISTRY: &[&ResourceKind] = &[&crate::api::projects::PROJECT, &crate::api::people::PERSON];

/// All registered kinds.
pub fn resources() -> impl Iterator<Item = &'static ResourceKind> {
    REGISTRY.iter().copied()
}

/// Look up a kind by plural name, e.g. `"projects"`.
pub fn lookup(plural_name: &str) -> Option<&'static ResourceKind> {
    resources().find(|kind| kind.plural_name == plural_name)
}
