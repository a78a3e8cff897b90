use http::header::{HeaderName, HeaderValue, ALLOW, CONTENT_TYPE};
use http::{HeaderMap, StatusCode};
use serde_json::Value;
use tracing::warn;

/// Outcome of one pass through the dispatch pipeline.
///
/// Produced either by a short-circuit (400/404/405/412/304/501) or by a
/// successful handler invocation wrapped with the default headers.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers, freshly allocated for every response
    pub headers: HeaderMap,
    /// Structured body; `None` for 304 and handlers that return nothing
    pub body: Option<Value>,
    /// Requested representation extension taken from the path (e.g. `.json`)
    pub extension: Option<String>,
}

impl Response {
    /// Create a response with the given status, headers and body
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap, body: Option<Value>) -> Self {
        Self {
            status,
            headers,
            body,
            extension: None,
        }
    }

    /// Create an error response carrying `{"error": message}`
    #[must_use]
    pub fn error(status: StatusCode, message: &str, headers: HeaderMap) -> Self {
        Self::new(status, headers, Some(serde_json::json!({ "error": message })))
    }

    /// `304 Not Modified`: no body, validators kept
    #[must_use]
    pub fn not_modified(headers: HeaderMap) -> Self {
        Self::new(StatusCode::NOT_MODIFIED, headers, None)
    }

    #[must_use]
    pub fn bad_request(headers: HeaderMap, message: &str) -> Self {
        Self::error(StatusCode::BAD_REQUEST, message, headers)
    }

    #[must_use]
    pub fn not_found(headers: HeaderMap) -> Self {
        Self::error(StatusCode::NOT_FOUND, "not found", headers)
    }

    /// `405 Method Not Allowed` with the `Allow` header set
    #[must_use]
    pub fn method_not_allowed(headers: HeaderMap, allow: &str) -> Self {
        Self::error(
            StatusCode::METHOD_NOT_ALLOWED,
            "Invalid method on resource",
            with_allow(headers, allow),
        )
    }

    #[must_use]
    pub fn precondition_failed(headers: HeaderMap) -> Self {
        Self::error(StatusCode::PRECONDITION_FAILED, "Precondition failed", headers)
    }

    /// `501 Not Implemented` with the `Allow` header set
    #[must_use]
    pub fn not_implemented(headers: HeaderMap, allow: &str) -> Self {
        Self::error(
            StatusCode::NOT_IMPLEMENTED,
            "Unknown method",
            with_allow(headers, allow),
        )
    }

    /// Get a header value as a string (case-insensitive)
    #[inline]
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Add or replace a header
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Render into a transport-level response.
    ///
    /// String bodies are written as `text/plain`, everything else as JSON.
    /// A `Content-Type` already present in the headers is left alone. When
    /// `strip_body` is set the body is dropped but headers are kept, which is
    /// what a HEAD response needs.
    #[must_use]
    pub fn into_http(self, strip_body: bool) -> http::Response<Vec<u8>> {
        let Response {
            status,
            mut headers,
            body,
            ..
        } = self;

        let (content_type, bytes) = match body {
            None => (None, Vec::new()),
            Some(Value::String(s)) => (Some("text/plain; charset=utf-8"), s.into_bytes()),
            Some(other) => match serde_json::to_vec(&other) {
                Ok(bytes) => (Some("application/json"), bytes),
                Err(err) => {
                    warn!(error = %err, "Failed to serialize response body");
                    (None, Vec::new())
                }
            },
        };

        if let Some(ct) = content_type {
            if !headers.contains_key(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(ct));
            }
        }

        let bytes = if strip_body { Vec::new() } else { bytes };
        let mut response = http::Response::new(bytes);
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}

fn with_allow(mut headers: HeaderMap, allow: &str) -> HeaderMap {
    match HeaderValue::from_str(allow) {
        Ok(value) => {
            headers.insert(ALLOW, value);
        }
        Err(err) => warn!(allow = %allow, error = %err, "Allow header value rejected"),
    }
    headers
}
