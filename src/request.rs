use std::sync::Arc;
use std::time::SystemTime;

use http::header::{
    HeaderName, HeaderValue, CONTENT_TYPE, IF_MATCH, IF_MODIFIED_SINCE, IF_NONE_MATCH, IF_UNMODIFIED_SINCE,
};
use http::{HeaderMap, Method};
use tracing::debug;

use crate::conditional::EntityTagSet;
use crate::router::ParamVec;

/// `Content-MD5` has no constant in the `http` crate.
pub const CONTENT_MD5: HeaderName = HeaderName::from_static("content-md5");

/// Immutable view over one inbound request.
///
/// Wraps the verb, path, query and form parameters, the raw body and the
/// conditional-request headers the pipeline consumes. Built once per request
/// and only ever handed out by shared reference.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// HTTP method (GET, POST, etc.)
    pub method: Method,
    /// Request path without the query string
    pub path: String,
    /// Raw query string, if the URI had one
    pub query: Option<String>,
    /// Parsed query string parameters
    pub query_params: ParamVec,
    /// Parsed `application/x-www-form-urlencoded` body parameters
    pub form_params: ParamVec,
    /// HTTP headers
    pub headers: HeaderMap,
    /// Raw request body
    pub body: Vec<u8>,
}

impl RequestContext {
    /// Build a context from a transport-level request.
    ///
    /// Query parameters are always parsed; the body is parsed as form
    /// parameters only when the content type says it is urlencoded.
    #[must_use]
    pub fn from_http(req: http::Request<Vec<u8>>) -> Self {
        let (parts, body) = req.into_parts();
        let path = parts.uri.path().to_string();
        let query = parts.uri.query().map(str::to_string);
        let query_params = query
            .as_deref()
            .map(|q| parse_urlencoded(q.as_bytes()))
            .unwrap_or_default();

        let is_form = parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| {
                ct.split(';')
                    .next()
                    .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/x-www-form-urlencoded"))
            });
        let form_params = if is_form {
            parse_urlencoded(&body)
        } else {
            ParamVec::new()
        };

        debug!(
            method = %parts.method,
            path = %path,
            query_count = query_params.len(),
            form_count = form_params.len(),
            body_size_bytes = body.len(),
            "Request context built"
        );

        Self {
            method: parts.method,
            path,
            query,
            query_params,
            form_params,
            headers: parts.headers,
            body,
        }
    }

    /// Get a query parameter by name
    ///
    /// Uses "last write wins" semantics: `?limit=10&limit=20` yields `20`.
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a form body parameter by name (last write wins)
    #[inline]
    #[must_use]
    pub fn get_form_param(&self, name: &str) -> Option<&str> {
        self.form_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Entity tags from `If-Match`; an absent header matches anything.
    #[must_use]
    pub fn if_match(&self) -> EntityTagSet {
        EntityTagSet::from_headers(&self.headers, IF_MATCH, EntityTagSet::Any)
    }

    /// Entity tags from `If-None-Match`; an absent header matches nothing.
    #[must_use]
    pub fn if_none_match(&self) -> EntityTagSet {
        EntityTagSet::from_headers(&self.headers, IF_NONE_MATCH, EntityTagSet::none())
    }

    /// `If-Modified-Since`, ignored when it is not a valid HTTP-date
    #[must_use]
    pub fn if_modified_since(&self) -> Option<SystemTime> {
        self.http_date(IF_MODIFIED_SINCE)
    }

    /// `If-Unmodified-Since`, ignored when it is not a valid HTTP-date
    #[must_use]
    pub fn if_unmodified_since(&self) -> Option<SystemTime> {
        self.http_date(IF_UNMODIFIED_SINCE)
    }

    /// Raw `Content-MD5` bytes. Present even when they are not valid text,
    /// so a garbled digest still fails the body check.
    #[must_use]
    pub fn content_md5(&self) -> Option<&[u8]> {
        self.headers.get(CONTENT_MD5).map(HeaderValue::as_bytes)
    }

    fn http_date(&self, name: HeaderName) -> Option<SystemTime> {
        let raw = self.headers.get(&name)?.to_str().ok()?;
        httpdate::parse_http_date(raw.trim()).ok()
    }
}

/// Parse urlencoded pairs, percent-decoding names and values.
fn parse_urlencoded(input: &[u8]) -> ParamVec {
    url::form_urlencoded::parse(input)
        .map(|(k, v)| (Arc::from(k.as_ref()), v.into_owned()))
        .collect()
}
