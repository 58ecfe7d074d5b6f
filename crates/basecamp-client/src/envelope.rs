//! Response envelopes: separating the payload from pagination metadata.
//!
//! Two conventions are recognized:
//!
//! - [`HeaderEnvelope`] (canonical): the body is the bare payload, the total
//!   count comes from `X-Total-Count` and the next page from a
//!   `Link: <url>; rel="next"` header.
//! - [`DataEnvelope`] (legacy): the body is `{"data": ..., ...}` with the
//!   next page at `next_page.path` among the extra keys.
//!
//! Which one a deployment speaks is chosen when the client is built.

use std::fmt;

use reqwest::header::{HeaderMap, LINK};
use serde_json::{Map, Value};
use url::Url;

use crate::error::{Error, Result};
use crate::response::{Body, Response};

/// Header reporting the size of the whole collection.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Where the next page of a collection lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    /// A resource path relative to the account, as in the legacy envelope.
    Path(String),
    /// An absolute URL, as in a `Link` header.
    Url(Url),
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cursor::Path(path) => f.write_str(path),
            Cursor::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Pagination and count metadata of one response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageInfo {
    pub next_page: Option<Cursor>,
    pub total_count: Option<u64>,
    /// Envelope keys other than the payload.
    pub extra: Map<String, Value>,
}

/// A response split into payload and metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub data: Value,
    pub page: PageInfo,
}

impl Envelope {
    pub fn new(data: Value, page: PageInfo) -> Self {
        Self { data, page }
    }

    /// A payload with no pagination metadata at all.
    pub fn single_page(data: Value) -> Self {
        Self::new(data, PageInfo::default())
    }
}

/// A convention for extracting payload and metadata from a response.
pub trait EnvelopeConvention: Send + Sync + fmt::Debug {
    fn parse(&self, response: Response) -> Result<Envelope>;
}

/// Bare body plus `X-Total-Count` and `Link` headers.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderEnvelope;

impl EnvelopeConvention for HeaderEnvelope {
    fn parse(&self, response: Response) -> Result<Envelope> {
        let page = PageInfo {
            next_page: next_link(&response.url, &response.headers)?.map(Cursor::Url),
            total_count: total_count(&response.headers),
            extra: Map::new(),
        };
        Ok(Envelope::new(response.body.into_json(), page))
    }
}

/// `{"data": ..., "next_page": {"path": ...}}` bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataEnvelope;

impl EnvelopeConvention for DataEnvelope {
    fn parse(&self, response: Response) -> Result<Envelope> {
        let header_count = total_count(&response.headers);

        let mut extra = match response.body {
            Body::Json(Value::Object(map)) => map,
            other => return Err(Error::MalformedEnvelope(other.to_string())),
        };

        let Some(data) = extra.remove("data") else {
            return Err(Error::MalformedEnvelope(Value::Object(extra).to_string()));
        };

        let next_page = extra
            .get("next_page")
            .and_then(|next| next.get("path"))
            .and_then(Value::as_str)
            .map(|path| Cursor::Path(path.to_string()));

        let total_count =
            header_count.or_else(|| extra.get("total_count").and_then(Value::as_u64));

        Ok(Envelope::new(
            data,
            PageInfo {
                next_page,
                total_count,
                extra,
            },
        ))
    }
}

/// Read `X-Total-Count`. A malformed value counts as absent.
fn total_count(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(TOTAL_COUNT_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Find the `rel="next"` target in a `Link` header. Relative targets
/// resolve against the URL of the request.
fn next_link(base: &Url, headers: &HeaderMap) -> Result<Option<Url>> {
    for value in headers.get_all(LINK) {
        let Ok(value) = value.to_str() else {
            continue;
        };

        for link in value.split(',') {
            let mut parts = link.split(';');
            let target = parts.next().unwrap_or_default().trim();
            let is_next = parts.any(|param| {
                let param = param.trim().replace(' ', "");
                param == "rel=\"next\"" || param == "rel=next"
            });

            if is_next {
                let target = target
                    .strip_prefix('<')
                    .and_then(|t| t.strip_suffix('>'))
                    .ok_or_else(|| Error::MalformedEnvelope(format!("bad Link header: {}", value)))?;
                return Ok(Some(base.join(target)?));
            }
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use serde_json::json;

    fn response(headers: &[(&'static str, &'static str)], body: Body) -> Response {
        let mut map = HeaderMap::new();
        for &(name, value) in headers {
            map.append(name, HeaderValue::from_static(value));
        }
        Response {
            url: Url::parse("https://3.basecampapi.com/999/projects.json").unwrap(),
            status: 200,
            headers: map,
            body,
        }
    }

    #[test]
    fn test_header_envelope_reads_total_count_and_link() {
        let resp = response(
            &[
                ("x-total-count", "20"),
                (
                    "link",
                    r#"<https://3.basecampapi.com/999/projects.json?page=2>; rel="next""#,
                ),
            ],
            Body::Json(json!([{"id": 1}])),
        );

        let envelope = HeaderEnvelope.parse(resp).unwrap();
        assert_eq!(envelope.data, json!([{"id": 1}]));
        assert_eq!(envelope.page.total_count, Some(20));
        assert_eq!(
            envelope.page.next_page,
            Some(Cursor::Url(
                Url::parse("https://3.basecampapi.com/999/projects.json?page=2").unwrap()
            ))
        );
    }

    #[test]
    fn test_header_envelope_without_metadata() {
        let envelope = HeaderEnvelope
            .parse(response(&[], Body::Json(json!([]))))
            .unwrap();
        assert_eq!(envelope.page, PageInfo::default());
    }

    #[test]
    fn test_link_header_picks_next_among_many() {
        let resp = response(
            &[(
                "link",
                r#"<https://a.test/1/x.json?page=1>; rel="prev", <https://a.test/1/x.json?page=3>; rel="next""#,
            )],
            Body::Json(json!([])),
        );
        let envelope = HeaderEnvelope.parse(resp).unwrap();
        assert_eq!(
            envelope.page.next_page.unwrap().to_string(),
            "https://a.test/1/x.json?page=3"
        );
    }

    #[test]
    fn test_relative_link_resolves_against_request_url() {
        let resp = response(
            &[("link", r#"</999/projects.json?page=2>; rel="next""#)],
            Body::Json(json!([])),
        );
        let envelope = HeaderEnvelope.parse(resp).unwrap();
        assert_eq!(
            envelope.page.next_page,
            Some(Cursor::Url(
                Url::parse("https://3.basecampapi.com/999/projects.json?page=2").unwrap()
            ))
        );
    }

    #[test]
    fn test_malformed_total_count_is_ignored() {
        let resp = response(&[("x-total-count", "lots")], Body::Json(json!([])));
        assert_eq!(HeaderEnvelope.parse(resp).unwrap().page.total_count, None);
    }

    #[test]
    fn test_data_envelope_splits_data_and_extra() {
        let resp = response(
            &[],
            Body::Json(json!({
                "data": [{"gid": 1}],
                "next_page": {"path": "/unicorns?limit=5&offset=abc"}
            })),
        );

        let envelope = DataEnvelope.parse(resp).unwrap();
        assert_eq!(envelope.data, json!([{"gid": 1}]));
        assert_eq!(
            envelope.page.next_page,
            Some(Cursor::Path("/unicorns?limit=5&offset=abc".to_string()))
        );
        assert!(envelope.page.extra.contains_key("next_page"));
        assert!(!envelope.page.extra.contains_key("data"));
    }

    #[test]
    fn test_data_envelope_total_count_header_wins() {
        let resp = response(
            &[("x-total-count", "7")],
            Body::Json(json!({"data": [], "total_count": 3})),
        );
        assert_eq!(DataEnvelope.parse(resp).unwrap().page.total_count, Some(7));

        let resp = response(&[], Body::Json(json!({"data": [], "total_count": 3})));
        assert_eq!(DataEnvelope.parse(resp).unwrap().page.total_count, Some(3));
    }

    #[test]
    fn test_data_envelope_missing_data_is_malformed() {
        let resp = response(&[], Body::Json(json!({"foo": "bar"})));
        match DataEnvelope.parse(resp) {
            Err(Error::MalformedEnvelope(msg)) => assert!(msg.contains("foo")),
            other => panic!("Expected MalformedEnvelope, got {:?}", other),
        }

        let resp = response(&[], Body::Text("nope".to_string()));
        assert!(matches!(
            DataEnvelope.parse(resp),
            Err(Error::MalformedEnvelope(_))
        ));
    }
}
