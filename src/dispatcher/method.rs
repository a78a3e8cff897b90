use http::Method;
use tracing::debug;

use crate::resource::{Handler, ResourceType};

/// Verbs that produce 405 rather than 501 when a resource lacks a handler.
pub const KNOWN_METHODS: [&str; 8] = [
    "OPTIONS", "GET", "HEAD", "POST", "PUT", "DELETE", "TRACE", "CONNECT",
];

/// Whether `method` is one of [`KNOWN_METHODS`]
#[inline]
#[must_use]
pub fn is_known_method(method: &Method) -> bool {
    KNOWN_METHODS.contains(&method.as_str())
}

/// Find the handler for `method`, falling back from HEAD to GET.
///
/// The fallback hands back the GET handler itself; whether its body is
/// emitted is decided when the response is rendered.
#[must_use]
pub fn resolve_method<'a>(resource: &'a ResourceType, method: &Method) -> Option<&'a Handler> {
    if let Some(handler) = resource.handler_for(method) {
        return Some(handler);
    }
    if *method == Method::HEAD {
        debug!(resource = %resource.name(), "HEAD falls back to GET handler");
        return resource.handler_for(&Method::GET);
    }
    None
}
