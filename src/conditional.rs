//! Conditional request evaluation (`ETag` / `Last-Modified` / `If-*`).
//!
//! Runs strictly before the handler: verifies `Content-MD5`, asks the
//! resource for its current validators through the parameter binder, and
//! compares them with the request preconditions. The validators computed
//! here are surfaced on every outcome, short-circuit or success.
//!
//! Decision order:
//!
//! 1. `Content-MD5` mismatch → 400
//! 2. `ETag` present: not in `If-Match` → 412; in `If-None-Match` → 304 for
//!    GET/HEAD, 412 otherwise
//! 3. Only if step 2 decided nothing: `Last-Modified` ≤ `If-Modified-Since` → 304;
//!    `Last-Modified` > `If-Unmodified-Since` → 412

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::Engine as _;
use http::header::{HeaderName, HeaderValue, ETAG, LAST_MODIFIED};
use http::{HeaderMap, Method};
use md5::{Digest, Md5};
use tracing::debug;

use crate::binder;
use crate::error::DispatchError;
use crate::request::RequestContext;
use crate::resource::ResourceType;
use crate::router::PathParams;

/// Parsed `If-Match` / `If-None-Match` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityTagSet {
    /// `*`, or `If-Match` absent
    Any,
    /// Opaque tags with quotes and weakness prefix removed
    Tags(Vec<String>),
}

impl EntityTagSet {
    /// The empty set
    #[must_use]
    pub fn none() -> Self {
        EntityTagSet::Tags(Vec::new())
    }

    /// Parse a comma-separated list such as `"a", W/"b"` or `*`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let mut tags = Vec::new();
        for item in value.split(',') {
            let item = item.trim();
            if item == "*" {
                return EntityTagSet::Any;
            }
            let item = item.strip_prefix("W/").unwrap_or(item);
            let tag = item.replace('"', "");
            if !tag.is_empty() {
                tags.push(tag);
            }
        }
        EntityTagSet::Tags(tags)
    }

    /// Collect every occurrence of `name`; `absent` is used when there is none.
    pub(crate) fn from_headers(headers: &HeaderMap, name: HeaderName, absent: Self) -> Self {
        let mut values = headers.get_all(&name).iter().peekable();
        if values.peek().is_none() {
            return absent;
        }
        let joined = values
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>()
            .join(",");
        Self::parse(&joined)
    }

    /// Whether the unquoted `tag` is a member of this set
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        match self {
            EntityTagSet::Any => true,
            EntityTagSet::Tags(tags) => tags.iter().any(|t| t == tag),
        }
    }
}

/// Result of comparing validators against preconditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// No decision; continue to the handler
    Proceed,
    /// 304
    NotModified,
    /// 412
    Failed,
}

/// The validators computed once per request before invocation.
///
/// Handler-supplied headers of the same name win during the final merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultHeaders {
    /// Quoted entity tag, e.g. `"abc"`
    pub etag: Option<String>,
    /// Last modification time
    pub last_modified: Option<SystemTime>,
}

impl DefaultHeaders {
    /// Render the present validators; absent ones are simply left out.
    #[must_use]
    pub fn to_header_map(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(value) = self.etag.as_deref().and_then(|e| HeaderValue::from_str(e).ok()) {
            headers.insert(ETAG, value);
        }
        if let Some(ts) = self.last_modified {
            if let Ok(value) = HeaderValue::from_str(&httpdate::fmt_http_date(ts)) {
                headers.insert(LAST_MODIFIED, value);
            }
        }
        headers
    }
}

/// Validators plus the decision reached from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conditions {
    pub defaults: DefaultHeaders,
    pub decision: Precondition,
}

/// Wrap a raw entity tag in double quotes after removing embedded quotes.
///
/// Returns `None` when nothing is left to quote.
#[must_use]
pub fn quote_etag(raw: &str) -> Option<String> {
    let stripped = raw.replace('"', "");
    if stripped.is_empty() {
        None
    } else {
        Some(format!("\"{stripped}\""))
    }
}

/// Check a `Content-MD5` value against the body.
///
/// Accepts the hex digest (any case) as well as the RFC 1864 base64 form.
/// A value that is not valid UTF-8 never matches.
#[must_use]
pub fn content_md5_matches(header: &[u8], body: &[u8]) -> bool {
    let Ok(header) = std::str::from_utf8(header) else {
        return false;
    };
    let digest = Md5::digest(body);
    let header = header.trim();
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    if header.eq_ignore_ascii_case(&hex) {
        return true;
    }
    base64::engine::general_purpose::STANDARD.encode(digest) == header
}

/// Compare the entity tag against `If-Match` and `If-None-Match`.
#[must_use]
pub fn evaluate_etag(
    etag: Option<&str>,
    method: &Method,
    if_match: &EntityTagSet,
    if_none_match: &EntityTagSet,
) -> Precondition {
    let Some(etag) = etag else {
        return Precondition::Proceed;
    };
    let opaque = etag.replace('"', "");
    if !if_match.contains(&opaque) {
        return Precondition::Failed;
    }
    if if_none_match.contains(&opaque) {
        if *method == Method::GET || *method == Method::HEAD {
            return Precondition::NotModified;
        }
        return Precondition::Failed;
    }
    Precondition::Proceed
}

/// Compare the modification time against `If-Modified-Since` and
/// `If-Unmodified-Since`.
///
/// HTTP-dates carry whole seconds, so `last_modified` is truncated to the
/// second before comparing.
#[must_use]
pub fn evaluate_last_modified(
    last_modified: Option<SystemTime>,
    if_modified_since: Option<SystemTime>,
    if_unmodified_since: Option<SystemTime>,
) -> Precondition {
    let Some(last_modified) = last_modified.map(truncate_to_seconds) else {
        return Precondition::Proceed;
    };
    if if_modified_since.is_some_and(|since| last_modified <= since) {
        return Precondition::NotModified;
    }
    if if_unmodified_since.is_some_and(|since| last_modified > since) {
        return Precondition::Failed;
    }
    Precondition::Proceed
}

/// Run the full conditional check for one request.
///
/// # Errors
///
/// * [`DispatchError::BodyIntegrity`] on a `Content-MD5` mismatch
/// * [`DispatchError::Validation`] / [`DispatchError::Handler`] if binding or
///   invoking a validator provider fails
pub fn evaluate(
    resource: &ResourceType,
    path_params: &PathParams,
    request: &RequestContext,
) -> Result<Conditions, DispatchError> {
    if let Some(expected) = request.content_md5() {
        if !content_md5_matches(expected, &request.body) {
            return Err(DispatchError::BodyIntegrity);
        }
    }

    let etag = match resource.etag_provider() {
        Some(provider) => {
            let args = binder::bind(provider, resource, path_params, request)?;
            provider.call(&args)?.as_deref().and_then(quote_etag)
        }
        None => None,
    };

    let last_modified = match resource.last_modified_provider() {
        Some(provider) => {
            let args = binder::bind(provider, resource, path_params, request)?;
            provider.call(&args)?
        }
        None => None,
    };

    let mut decision = evaluate_etag(
        etag.as_deref(),
        &request.method,
        &request.if_match(),
        &request.if_none_match(),
    );
    if decision == Precondition::Proceed {
        decision = evaluate_last_modified(
            last_modified,
            request.if_modified_since(),
            request.if_unmodified_since(),
        );
    }

    debug!(
        resource = %resource.name(),
        etag = ?etag,
        has_last_modified = last_modified.is_some(),
        decision = ?decision,
        "Conditional request evaluated"
    );

    Ok(Conditions {
        defaults: DefaultHeaders {
            etag,
            last_modified,
        },
        decision,
    })
}

fn truncate_to_seconds(ts: SystemTime) -> SystemTime {
    match ts.duration_since(UNIX_EPOCH) {
        Ok(d) => UNIX_EPOCH + Duration::from_secs(d.as_secs()),
        Err(_) => ts,
    }
}
