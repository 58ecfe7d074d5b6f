//! Projects.

use serde_json::Value;

use crate::collection::Collection;
use crate::error::Result;
use crate::registry::ResourceKind;
use crate::resource::Resource;
use crate::transport::HttpTransport;

pub static PROJECT: ResourceKind = ResourceKind {
    name: "Project",
    plural_name: "projects",
    id_field: "id",
    defaults: &[("description", null), ("bookmarked", not_bookmarked)],
    find_all: Some(find_all),
    find_by_id: Some(find_by_id),
};

fn null() -> Value {
    Value::Null
}

fn not_bookmarked() -> Value {
    Value::Bool(false)
}

fn find_all(client: &HttpTransport) -> Result<Collection> {
    Collection::fetch(&PROJECT, client, "/projects", &[])
}

fn find_by_id(client: &HttpTransport, id: &str) -> Result<Resource> {
    Resource::fetch(&PROJECT, client, &format!("/projects/{}", id))
}

/// A Basecamp project.
#[derive(Debug, Clone, PartialEq)]
pub struct Project(Resource);

impl Project {
    pub fn id(&self) -> Result<u64> {
        self.0.u64("id")
    }

    pub fn name(&self) -> Result<&str> {
        self.0.str("name")
    }

    pub fn description(&self) -> Result<Option<&str>> {
        self.0.opt_str("description")
    }

    /// `active`, `archived` or `trashed`.
    pub fn status(&self) -> Result<&str> {
        self.0.str("status")
    }

    pub fn created_at(&self) -> Result<&str> {
        self.0.str("created_at")
    }

    pub fn bookmarked(&self) -> Result<bool> {
        self.0.bool("bookmarked")
    }

    pub fn app_url(&self) -> Result<&str> {
        self.0.str("app_url")
    }

    /// Tools enabled for the project (message board, todos, ...).
    pub fn dock(&self) -> Result<&[Resource]> {
        self.0.list("dock")
    }

    /// Re-fetch the project from the server.
    pub fn refresh(&self) -> Result<Project> {
        self.0.refresh().map(Project)
    }

    pub fn resource(&self) -> &Resource {
        &self.0
    }

    pub fn into_resource(self) -> Resource {
        self.0
    }
}

impl From<Resource> for Project {
    fn from(resource: Resource) -> Self {
        Self(resource)
    }
}

impl AsRef<Resource> for Project {
    fn as_ref(&self) -> &Resource {
        &self.0
    }
}

/// Project queries.
#[derive(Debug, Clone)]
pub struct ProjectsApi {
    client: HttpTransport,
}

impl ProjectsApi {
    pub fn new(client: HttpTransport) -> Self {
        Self { client }
    }

    /// All active projects visible to the current user.
    pub fn list(&self) -> Result<Collection> {
        find_all(&self.client)
    }

    /// Projects filtered by status: `archived` or `trashed`.
    pub fn list_by_status(&self, status: &str) -> Result<Collection> {
        Collection::fetch(&PROJECT, &self.client, "/projects", &[("status", status)])
    }

    pub fn get(&self, id: u64) -> Result<Project> {
        find_by_id(&self.client, &id.to_string()).map(Project)
    }
}
