//! Generic resources: navigable wrappers around JSON objects.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use reqwest::header::HeaderMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::registry::{GENERIC, ResourceKind};
use crate::transport::HttpTransport;

/// A field of a resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// A JSON leaf: string, number, bool, null, or an array of non-objects.
    Scalar(Value),
    /// A nested object.
    Resource(Resource),
    /// An array of objects.
    List(Vec<Resource>),
}

impl Field {
    fn wrap(value: Value, client: &HttpTransport) -> Self {
        match value {
            Value::Object(map) => Field::Resource(Resource::wrap(&GENERIC, map, client.clone())),
            Value::Array(items) if items.iter().all(Value::is_object) => Field::List(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::Object(map) => Some(Resource::wrap(&GENERIC, map, client.clone())),
                        _ => None,
                    })
                    .collect(),
            ),
            other => Field::Scalar(other),
        }
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Field::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_resource(&self) -> Option<&Resource> {
        match self {
            Field::Resource(resource) => Some(resource),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Resource]> {
        match self {
            Field::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Value::as_str)
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.as_scalar().and_then(Value::as_u64)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_scalar().and_then(Value::as_i64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_scalar().and_then(Value::as_bool)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Field::Scalar(Value::Null))
    }

    /// Convert back into plain JSON.
    pub fn to_json(&self) -> Value {
        match self {
            Field::Scalar(value) => value.clone(),
            Field::Resource(resource) => resource.to_json(),
            Field::List(items) => Value::Array(items.iter().map(Resource::to_json).collect()),
        }
    }
}

/// A resource returned by the API.
///
/// Nested objects and arrays of objects are wrapped when the resource is
/// built; scalar leaves are kept as JSON. Resources are immutable:
/// [`Resource::refresh`] returns a new instance.
#[derive(Clone)]
pub struct Resource {
    kind: &'static ResourceKind,
    fields: Arc<BTreeMap<String, Field>>,
    client: HttpTransport,
}

impl Resource {
    /// Wrap a JSON object as a resource of `kind`.
    pub fn new(kind: &'static ResourceKind, value: Value, client: HttpTransport) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self::wrap(kind, map, client)),
            other => Err(Error::MalformedEnvelope(format!(
                "expected a {} object, got {}",
                kind.name, other
            ))),
        }
    }

    /// Wrap a JSON object as a resource without a dedicated kind.
    pub fn generic(value: Value, client: HttpTransport) -> Result<Self> {
        Self::new(&GENERIC, value, client)
    }

    fn wrap(kind: &'static ResourceKind, map: Map<String, Value>, client: HttpTransport) -> Self {
        let mut fields: BTreeMap<String, Field> = map
            .into_iter()
            .map(|(name, value)| {
                let field = Field::wrap(value, &client);
                (name, field)
            })
            .collect();

        for (name, default) in kind.defaults {
            if !fields.contains_key(*name) {
                fields.insert(name.to_string(), Field::wrap(default(), &client));
            }
        }

        Self {
            kind,
            fields: Arc::new(fields),
            client,
        }
    }

    /// GET `path` and wrap the payload as a resource of `kind`.
    pub fn fetch(kind: &'static ResourceKind, client: &HttpTransport, path: &str) -> Result<Self> {
        let response = client.get(path, &[], &HeaderMap::new())?;
        let envelope = client.envelope().parse(response)?;
        Self::new(kind, envelope.data, client.clone())
    }

    pub fn kind(&self) -> &'static ResourceKind {
        self.kind
    }

    pub fn client(&self) -> &HttpTransport {
        &self.client
    }

    /// Get a field. Reading a field the resource does not have is an error.
    pub fn get(&self, name: &str) -> Result<&Field> {
        self.fields.get(name).ok_or_else(|| Error::MissingField {
            kind: self.kind.name,
            field: name.to_string(),
        })
    }

    /// Get a field if present.
    pub fn try_get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field names in sorted order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn str(&self, name: &str) -> Result<&str> {
        self.get(name)?
            .as_str()
            .ok_or_else(|| self.invalid(name, "string"))
    }

    pub fn u64(&self, name: &str) -> Result<u64> {
        self.get(name)?
            .as_u64()
            .ok_or_else(|| self.invalid(name, "unsigned integer"))
    }

    pub fn bool(&self, name: &str) -> Result<bool> {
        self.get(name)?
            .as_bool()
            .ok_or_else(|| self.invalid(name, "boolean"))
    }

    /// Get a nullable string field; `null` reads as `None`.
    pub fn opt_str(&self, name: &str) -> Result<Option<&str>> {
        let field = self.get(name)?;
        if field.is_null() {
            return Ok(None);
        }
        field
            .as_str()
            .map(Some)
            .ok_or_else(|| self.invalid(name, "string or null"))
    }

    pub fn resource(&self, name: &str) -> Result<&Resource> {
        self.get(name)?
            .as_resource()
            .ok_or_else(|| self.invalid(name, "object"))
    }

    pub fn list(&self, name: &str) -> Result<&[Resource]> {
        self.get(name)?
            .as_list()
            .ok_or_else(|| self.invalid(name, "array of objects"))
    }

    /// The identifier, as found in the kind's id field. Numbers are
    /// rendered in decimal.
    pub fn id(&self) -> Result<String> {
        let name = self.kind.id_field;
        match self.get(name)?.as_scalar() {
            Some(Value::String(id)) => Ok(id.clone()),
            Some(Value::Number(id)) => Ok(id.to_string()),
            _ => Err(self.invalid(name, "string or number")),
        }
    }

    /// Re-fetch this resource by its identifier.
    ///
    /// Returns a new resource reflecting the current server state; `self`
    /// is left untouched.
    pub fn refresh(&self) -> Result<Resource> {
        let find_by_id = self.kind.find_by_id.ok_or(Error::UnsupportedOperation {
            kind: self.kind.name,
            operation: "refresh",
        })?;
        let id = self.id()?;
        tracing::debug!(kind = self.kind.name, %id, "refreshing resource");
        find_by_id(&self.client, &id)
    }

    /// Convert back into plain JSON.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(name, field)| (name.clone(), field.to_json()))
                .collect(),
        )
    }

    fn invalid(&self, name: &str, expected: &'static str) -> Error {
        Error::InvalidField {
            kind: self.kind.name,
            field: name.to_string(),
            expected,
        }
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.kind.name == other.kind.name && self.fields == other.fields
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.kind.name)
            .field("fields", &self.fields)
            .finish()
    }
}

impl Serialize for Resource {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<{} {}>", self.kind.name, self.to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{StubAdapter, UNICORN, transport_with};
    use reqwest::Method;
    use serde_json::json;

    fn client() -> HttpTransport {
        transport_with(StubAdapter::new())
    }

    #[test]
    fn test_plain_properties() {
        let unicorn = Resource::new(&UNICORN, json!({"name": "John"}), client()).unwrap();
        assert_eq!(unicorn.str("name").unwrap(), "John");
        assert_eq!(unicorn.get("name").unwrap(), &Field::Scalar(json!("John")));
    }

    #[test]
    fn test_wraps_objects_into_resources() {
        let unicorn = Resource::new(&UNICORN, json!({"friend": {"gid": "1"}}), client()).unwrap();
        let friend = unicorn.resource("friend").unwrap();
        assert_eq!(friend.kind().name, "Resource");
        assert_eq!(friend.str("gid").unwrap(), "1");
    }

    #[test]
    fn test_wraps_arrays_of_objects_into_lists() {
        let unicorn =
            Resource::new(&UNICORN, json!({"friends": [{"gid": "1"}]}), client()).unwrap();
        let friends = unicorn.list("friends").unwrap();
        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0].str("gid").unwrap(), "1");
    }

    #[test]
    fn test_arrays_of_scalars_stay_scalar() {
        let unicorn = Resource::new(
            &UNICORN,
            json!({"tags": ["a", "b"], "mixed": [{"gid": "1"}, 2], "none": []}),
            client(),
        )
        .unwrap();
        assert_eq!(unicorn.get("tags").unwrap(), &Field::Scalar(json!(["a", "b"])));
        assert!(matches!(unicorn.get("mixed").unwrap(), Field::Scalar(_)));
        assert_eq!(unicorn.list("none").unwrap().len(), 0);
    }

    #[test]
    fn test_deep_nesting() {
        let unicorn = Resource::new(
            &UNICORN,
            json!({"herd": {"leader": {"friends": [{"name": "Ann"}]}}}),
            client(),
        )
        .unwrap();
        let name = unicorn
            .resource("herd")
            .and_then(|herd| herd.resource("leader"))
            .and_then(|leader| leader.list("friends"))
            .map(|friends| friends[0].str("name").unwrap().to_string())
            .unwrap();
        assert_eq!(name, "Ann");
    }

    #[test]
    fn test_missing_field_is_an_error() {
        let unicorn = Resource::new(&UNICORN, json!({"name": "John"}), client()).unwrap();
        match unicorn.get("horn") {
            Err(Error::MissingField { kind, field }) => {
                assert_eq!(kind, "Unicorn");
                assert_eq!(field, "horn");
            }
            other => panic!("Expected MissingField, got {:?}", other),
        }
        assert!(unicorn.try_get("horn").is_none());
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let unicorn = Resource::new(&UNICORN, json!({"gid": "1"}), client()).unwrap();
        assert_eq!(unicorn.str("color").unwrap(), "white");

        let unicorn =
            Resource::new(&UNICORN, json!({"gid": "1", "color": "pink"}), client()).unwrap();
        assert_eq!(unicorn.str("color").unwrap(), "pink");
    }

    #[test]
    fn test_wrong_type_is_invalid_field() {
        let unicorn = Resource::new(&UNICORN, json!({"name": 5, "note": null}), client()).unwrap();
        assert!(matches!(
            unicorn.str("name"),
            Err(Error::InvalidField { expected: "string", .. })
        ));
        assert_eq!(unicorn.u64("name").unwrap(), 5);
        assert_eq!(unicorn.opt_str("note").unwrap(), None);
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(matches!(
            Resource::new(&UNICORN, json!([1, 2]), client()),
            Err(Error::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn test_id_accepts_strings_and_numbers() {
        let unicorn = Resource::new(&UNICORN, json!({"gid": "5"}), client()).unwrap();
        assert_eq!(unicorn.id().unwrap(), "5");

        let unicorn = Resource::new(&UNICORN, json!({"gid": 42}), client()).unwrap();
        assert_eq!(unicorn.id().unwrap(), "42");
    }

    #[test]
    fn test_refresh_refetches_itself() {
        let unicorn = Resource::new(&UNICORN, json!({"gid": "5", "name": "old"}), client()).unwrap();
        let refreshed = unicorn.refresh().unwrap();
        assert_eq!(refreshed.str("gid").unwrap(), "5");
        // The original is left untouched.
        assert_eq!(unicorn.str("name").unwrap(), "old");
        assert!(!refreshed.contains("name"));
    }

    #[test]
    fn test_refresh_unsupported_for_generic() {
        let resource = Resource::generic(json!({"id": 1}), client()).unwrap();
        assert!(matches!(
            resource.refresh(),
            Err(Error::UnsupportedOperation {
                kind: "Resource",
                operation: "refresh"
            })
        ));
    }

    #[test]
    fn test_fetch_wraps_payload() {
        let stub = StubAdapter::new();
        stub.on(
            Method::GET,
            "https://example.test/999999999/unicorns/7.json",
            200,
            json!({"gid": "7", "name": "Sparkle"}),
        );
        let transport = transport_with(stub.clone());

        let unicorn = Resource::fetch(&UNICORN, &transport, "/unicorns/7").unwrap();
        assert_eq!(unicorn.str("name").unwrap(), "Sparkle");
        assert_eq!(stub.calls(), 1);
    }

    #[test]
    fn test_to_json_round_trips_structure() {
        let json = json!({"friend": {"gid": "1"}, "friends": [{"gid": "2"}], "n": 1, "color": "white"});
        let unicorn = Resource::new(&UNICORN, json.clone(), client()).unwrap();
        assert_eq!(unicorn.to_json(), json);
        assert!(unicorn.to_string().starts_with("#<Unicorn "));
        assert_eq!(serde_json::to_value(&unicorn).unwrap(), json);
    }
}
