//! People.

use crate::collection::Collection;
use crate::error::Result;
use crate::registry::ResourceKind;
use crate::resource::Resource;
use crate::transport::HttpTransport;

pub static PERSON: ResourceKind = ResourceKind {
    name: "Person",
    plural_name: "people",
    id_field: "id",
    defaults: &[],
    find_all: Some(find_all),
    find_by_id: Some(find_by_id),
};

fn find_all(client: &HttpTransport) -> Result<Collection> {
    Collection::fetch(&PERSON, client, "/people", &[])
}

fn find_by_id(client: &HttpTransport, id: &str) -> Result<Resource> {
    Resource::fetch(&PERSON, client, &format!("/people/{}", id))
}

/// Someone with access to the account.
#[derive(Debug, Clone, PartialEq)]
pub struct Person(Resource);

impl Person {
    pub fn id(&self) -> Result<u64> {
        self.0.u64("id")
    }

    pub fn name(&self) -> Result<&str> {
        self.0.str("name")
    }

    pub fn email_address(&self) -> Result<&str> {
        self.0.str("email_address")
    }

    pub fn title(&self) -> Result<Option<&str>> {
        self.0.opt_str("title")
    }

    pub fn admin(&self) -> Result<bool> {
        self.0.bool("admin")
    }

    pub fn company(&self) -> Result<&Resource> {
        self.0.resource("company")
    }

    pub fn refresh(&self) -> Result<Person> {
        self.0.refresh().map(Person)
    }

    pub fn resource(&self) -> &Resource {
        &self.0
    }

    pub fn into_resource(self) -> Resource {
        self.0
    }
}

impl From<Resource> for Person {
    fn from(resource: Resource) -> Self {
        Self(resource)
    }
}

impl AsRef<Resource> for Person {
    fn as_ref(&self) -> &Resource {
        &self.0
    }
}

/// People queries.
#[derive(Debug, Clone)]
pub struct PeopleApi {
    client: HttpTransport,
}

impl PeopleApi {
    pub fn new(client: HttpTransport) -> Self {
        Self { client }
    }

    /// Everyone visible to the current user.
    pub fn list(&self) -> Result<Collection> {
        find_all(&self.client)
    }

    /// People on a project.
    pub fn list_on_project(&self, project_id: u64) -> Result<Collection> {
        Collection::fetch(
            &PERSON,
            &self.client,
            &format!("/projects/{}/people", project_id),
            &[],
        )
    }

    pub fn get(&self, id: u64) -> Result<Person> {
        find_by_id(&self.client, &id.to_string()).map(Person)
    }

    /// The person the credentials belong to.
    pub fn me(&self) -> Result<Person> {
        Resource::fetch(&PERSON, &self.client, "/my/profile").map(Person)
    }
}
