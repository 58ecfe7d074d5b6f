//! Paginated collections of resources.
//!
//! A [`Collection`] holds one page of resources plus the cursor to the
//! next page. The next page is fetched on first demand, at most once, and
//! kept: walking the same collection twice does not hit the network again.
//!
//! Iterating a collection walks every page and keeps each fetched page
//! alive through the chain of cached next pages, so memory grows with the
//! size of the whole result set. Prefer [`Collection::total_count`] when a
//! count is all that is needed.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::envelope::{Cursor, Envelope};
use crate::error::{Error, Result};
use crate::registry::ResourceKind;
use crate::resource::Resource;
use crate::transport::HttpTransport;

/// One page of resources of a single kind.
pub struct Collection {
    kind: &'static ResourceKind,
    elements: Vec<Resource>,
    client: HttpTransport,
    next_cursor: Option<Cursor>,
    total_count: Option<u64>,
    next_page: Mutex<Option<Arc<Collection>>>,
}

impl Collection {
    /// Build a collection from an already fetched page.
    pub fn new(kind: &'static ResourceKind, envelope: Envelope, client: HttpTransport) -> Result<Self> {
        let items = match envelope.data {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => {
                return Err(Error::MalformedEnvelope(format!(
                    "expected a list of {}, got {}",
                    kind.plural_name, other
                )));
            }
        };

        let elements = items
            .into_iter()
            .map(|item| Resource::new(kind, item, client.clone()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            kind,
            elements,
            client,
            next_cursor: envelope.page.next_page,
            total_count: envelope.page.total_count,
            next_page: Mutex::new(None),
        })
    }

    /// GET the first page at `path`.
    pub fn fetch(
        kind: &'static ResourceKind,
        client: &HttpTransport,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Self> {
        let response = client.get(path, params, &HeaderMap::new())?;
        let envelope = client.envelope().parse(response)?;
        Self::new(kind, envelope, client.clone())
    }

    pub fn kind(&self) -> &'static ResourceKind {
        self.kind
    }

    /// Elements of the current page.
    pub fn elements(&self) -> &[Resource] {
        &self.elements
    }

    /// The last element of the *current page*.
    ///
    /// Following pages are not consulted, even when they exist.
    pub fn last(&self) -> Option<&Resource> {
        self.elements.last()
    }

    /// Total number of resources as reported by the server, when it did.
    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    /// Whether a following page exists.
    pub fn has_next_page(&self) -> bool {
        self.next_cursor.is_some()
    }

    /// Number of resources across all pages.
    ///
    /// Fetches every remaining page.
    pub fn len(&self) -> Result<usize> {
        self.iter().try_fold(0, |count, item| item.map(|_| count + 1))
    }

    /// Whether the collection has no resources on any page.
    pub fn is_empty(&self) -> Result<bool> {
        match self.iter().next() {
            Some(item) => item.map(|_| false),
            None => Ok(true),
        }
    }

    /// The following page, fetched on first access and cached.
    ///
    /// Concurrent callers wait for a single fetch. A failed fetch is not
    /// cached; the next call tries again.
    pub fn next_page(&self) -> Result<Option<Arc<Collection>>> {
        let Some(cursor) = &self.next_cursor else {
            return Ok(None);
        };

        let mut cached = self.next_page.lock();
        if let Some(page) = cached.as_ref() {
            return Ok(Some(Arc::clone(page)));
        }

        tracing::debug!(kind = self.kind.name, %cursor, "fetching next page");
        let response = self.client.get_cursor(cursor)?;
        let envelope = self.client.envelope().parse(response)?;
        let page = Arc::new(Collection::new(self.kind, envelope, self.client.clone())?);

        *cached = Some(Arc::clone(&page));
        Ok(Some(page))
    }

    /// Iterate over every resource: this page first, then following pages.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            first: self,
            page: None,
            index: 0,
            done: false,
        }
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("kind", &self.kind.name)
            .field("elements", &self.elements)
            .field("next_cursor", &self.next_cursor)
            .field("total_count", &self.total_count)
            .finish()
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<Collection<{}> ", self.kind.name)?;
        if let Some(total) = self.total_count {
            write!(f, "({} total) ", total)?;
        }
        f.write_str("[")?;
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", element)?;
        }
        if self.next_cursor.is_some() {
            f.write_str(", ...")?;
        }
        f.write_str("]>")
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = Result<Resource>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over all pages of a [`Collection`].
///
/// Yields an error and stops if a following page cannot be fetched.
pub struct Iter<'a> {
    first: &'a Collection,
    page: Option<Arc<Collection>>,
    index: usize,
    done: bool,
}

impl Iterator for Iter<'_> {
    type Item = Result<Resource>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }

            let page = self.page.as_deref().unwrap_or(self.first);
            if let Some(element) = page.elements.get(self.index) {
                self.index += 1;
                return Some(Ok(element.clone()));
            }

            match page.next_page() {
                Ok(Some(next)) => {
                    self.page = Some(next);
                    self.index = 0;
                }
                Ok(None) => {
                    self.done = true;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{DataEnvelope, PageInfo};
    use crate::test_support::{StubAdapter, UNICORN, transport_with, transport_with_envelope};
    use reqwest::Method;
    use serde_json::json;
    use url::Url;

    fn unicorns(range: std::ops::RangeInclusive<u64>) -> Value {
        Value::Array(range.map(|gid| json!({"gid": gid})).collect())
    }

    fn gids(collection: &Collection) -> Vec<u64> {
        collection
            .iter()
            .map(|unicorn| unicorn.unwrap().u64("gid").unwrap())
            .collect()
    }

    fn page(data: Value, next: Option<Cursor>, total: Option<u64>) -> Envelope {
        Envelope::new(
            data,
            PageInfo {
                next_page: next,
                total_count: total,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_single_page_iterates_in_order() {
        let collection =
            Collection::new(&UNICORN, Envelope::single_page(unicorns(1..=5)), transport_with(StubAdapter::new()))
                .unwrap();
        assert_eq!(gids(&collection), vec![1, 2, 3, 4, 5]);
        assert!(collection.next_page().unwrap().is_none());
        assert!(!collection.has_next_page());
    }

    #[test]
    fn test_elements_last_and_len() {
        let collection =
            Collection::new(&UNICORN, Envelope::single_page(unicorns(1..=5)), transport_with(StubAdapter::new()))
                .unwrap();
        assert_eq!(collection.elements().len(), 5);
        assert_eq!(collection.last().unwrap().u64("gid").unwrap(), 5);
        assert_eq!(collection.len().unwrap(), 5);
        assert!(!collection.is_empty().unwrap());
    }

    #[test]
    fn test_total_count_from_metadata() {
        let collection = Collection::new(
            &UNICORN,
            page(unicorns(1..=5), None, Some(20)),
            transport_with(StubAdapter::new()),
        )
        .unwrap();
        assert_eq!(collection.total_count(), Some(20));
        assert_eq!(collection.elements().len(), 5);

        let collection =
            Collection::new(&UNICORN, Envelope::single_page(unicorns(1..=5)), transport_with(StubAdapter::new()))
                .unwrap();
        assert_eq!(collection.total_count(), None);
    }

    #[test]
    fn test_pagination_fetches_next_page_once() {
        let stub = StubAdapter::new();
        stub.on(
            Method::GET,
            "https://example.test/999999999/unicorns.json?page=2",
            200,
            unicorns(6..=10),
        );
        let transport = transport_with(stub.clone());

        let next = Url::parse("https://example.test/999999999/unicorns.json?page=2").unwrap();
        let collection =
            Collection::new(&UNICORN, page(unicorns(1..=5), Some(Cursor::Url(next)), Some(10)), transport)
                .unwrap();

        assert_eq!(gids(&collection), (1..=10).collect::<Vec<_>>());
        assert_eq!(stub.calls(), 1);

        let first = collection.next_page().unwrap().unwrap();
        let second = collection.next_page().unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(gids(&collection).len(), 10);
        assert_eq!(stub.calls(), 1);
    }

    #[test]
    fn test_last_is_current_page_only() {
        let stub = StubAdapter::new();
        stub.on(
            Method::GET,
            "https://example.test/999999999/unicorns.json?page=2",
            200,
            unicorns(6..=10),
        );
        let transport = transport_with(stub.clone());

        let next = Url::parse("https://example.test/999999999/unicorns.json?page=2").unwrap();
        let collection =
            Collection::new(&UNICORN, page(unicorns(1..=5), Some(Cursor::Url(next)), None), transport)
                .unwrap();

        assert_eq!(collection.len().unwrap(), 10);
        assert_eq!(collection.last().unwrap().u64("gid").unwrap(), 5);
    }

    #[test]
    fn test_legacy_data_envelope_pagination() {
        let stub = StubAdapter::new();
        stub.on(
            Method::GET,
            "https://example.test/999999999/unicorns.json?limit=5&offset=abc",
            200,
            json!({"data": unicorns(6..=10), "next_page": {"path": "/unicorns?limit=5&offset=def"}}),
        );
        stub.on(
            Method::GET,
            "https://example.test/999999999/unicorns.json?limit=5&offset=def",
            200,
            json!({"data": unicorns(11..=12), "next_page": null}),
        );
        let transport = transport_with_envelope(stub.clone(), Arc::new(DataEnvelope));

        let collection = Collection::new(
            &UNICORN,
            page(
                unicorns(1..=5),
                Some(Cursor::Path("/unicorns?limit=5&offset=abc".to_string())),
                None,
            ),
            transport,
        )
        .unwrap();

        assert_eq!(gids(&collection), (1..=12).collect::<Vec<_>>());
        assert_eq!(stub.calls(), 2);
    }

    #[test]
    fn test_failed_next_page_is_not_cached() {
        let stub = StubAdapter::new();
        stub.on(
            Method::GET,
            "https://example.test/999999999/unicorns.json?page=2",
            503,
            json!({"error": "maintenance"}),
        );
        let transport = transport_with(stub.clone());

        let next = Url::parse("https://example.test/999999999/unicorns.json?page=2").unwrap();
        let collection =
            Collection::new(&UNICORN, page(unicorns(1..=2), Some(Cursor::Url(next)), None), transport)
                .unwrap();

        let items: Vec<_> = collection.iter().collect();
        assert_eq!(items.len(), 3);
        assert!(items[0].is_ok());
        assert!(items[2].as_ref().unwrap_err().is_server_error());
        assert!(collection.len().is_err());

        stub.on(
            Method::GET,
            "https://example.test/999999999/unicorns.json?page=2",
            200,
            unicorns(3..=3),
        );
        assert_eq!(collection.len().unwrap(), 3);
    }

    #[test]
    fn test_concurrent_next_page_is_single_flight() {
        let stub = StubAdapter::new();
        stub.on(
            Method::GET,
            "https://example.test/999999999/unicorns.json?page=2",
            200,
            unicorns(2..=2),
        );
        let transport = transport_with(stub.clone());

        let next = Url::parse("https://example.test/999999999/unicorns.json?page=2").unwrap();
        let collection =
            Collection::new(&UNICORN, page(unicorns(1..=1), Some(Cursor::Url(next)), None), transport)
                .unwrap();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    assert!(collection.next_page().unwrap().is_some());
                });
            }
        });
        assert_eq!(stub.calls(), 1);
    }

    #[test]
    fn test_non_list_payload_is_malformed() {
        let result = Collection::new(
            &UNICORN,
            Envelope::single_page(json!({"gid": 1})),
            transport_with(StubAdapter::new()),
        );
        assert!(matches!(result, Err(Error::MalformedEnvelope(_))));

        let empty = Collection::new(
            &UNICORN,
            Envelope::single_page(Value::Null),
            transport_with(StubAdapter::new()),
        )
        .unwrap();
        assert!(empty.is_empty().unwrap());
        assert!(empty.last().is_none());
    }

    #[test]
    fn test_fetch_first_page() {
        let stub = StubAdapter::new();
        stub.on_with_headers(
            Method::GET,
            "https://example.test/999999999/unicorns.json?limit=5",
            200,
            &[("x-total-count", "20")],
            unicorns(1..=5),
        );
        let transport = transport_with(stub.clone());

        let collection = Collection::fetch(&UNICORN, &transport, "/unicorns", &[("limit", "5")]).unwrap();
        assert_eq!(collection.total_count(), Some(20));
        assert_eq!(collection.elements().len(), 5);
    }

    #[test]
    fn test_fetch_follows_relative_link() {
        let stub = StubAdapter::new();
        stub.on_with_headers(
            Method::GET,
            "https://example.test/999999999/unicorns.json",
            200,
            &[("link", r#"</999999999/unicorns.json?page=2>; rel="next""#)],
            unicorns(1..=2),
        );
        stub.on(
            Method::GET,
            "https://example.test/999999999/unicorns.json?page=2",
            200,
            unicorns(3..=3),
        );
        let transport = transport_with(stub.clone());

        let collection = Collection::fetch(&UNICORN, &transport, "/unicorns", &[]).unwrap();
        assert_eq!(gids(&collection), vec![1, 2, 3]);
        assert_eq!(stub.calls(), 2);
    }

    #[test]
    fn test_display() {
        let collection = Collection::new(
            &UNICORN,
            page(unicorns(1..=2), Some(Cursor::Path("/unicorns?page=2".to_string())), Some(20)),
            transport_with(StubAdapter::new()),
        )
        .unwrap();
        let rendered = collection.to_string();
        assert!(rendered.starts_with("#<Collection<Unicorn> (20 total) [#<Unicorn "));
        assert!(rendered.ends_with(", ...]>"));
    }
}
