//! Error taxonomy for the dispatch pipeline.
//!
//! Every terminal condition the pipeline can hit is a [`DispatchError`]
//! variant. Each variant maps to exactly one HTTP status and one
//! human-readable reason, and is turned into a [`Response`] in a single
//! place inside the dispatcher so nothing escapes as an unhandled fault.

use http::{HeaderMap, StatusCode};
use thiserror::Error;

use crate::response::Response;

/// A bound parameter failed its validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The value was missing or the empty string.
    #[error("Value for {name} must not be empty.")]
    Empty {
        /// Declared parameter name
        name: String,
    },
    /// The value did not fully match the pattern, or could not be converted.
    #[error("{name} value {value} does not validate.")]
    Invalid {
        /// Declared parameter name
        name: String,
        /// The raw value as received
        value: String,
    },
}

/// Error raised by a handler or a conditional-header provider.
///
/// Lets business logic abort with a specific status, e.g. a 404 for an
/// entity that does not exist even though the route matched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HandlerError {
    /// Status code of the resulting response
    pub status: StatusCode,
    /// Message carried in the `error` field of the body
    pub message: String,
}

impl HandlerError {
    /// Create an error with an arbitrary status and message
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// `404 Not Found` with the same message the router uses
    #[must_use]
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "not found")
    }

    /// `400 Bad Request` with a custom message
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

/// Terminal outcomes of the dispatch pipeline other than a successful
/// handler invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No route matched the request path, or the path is ignored by the
    /// matched resource.
    #[error("Not found")]
    NoRoute,
    /// A recognized HTTP verb with no handler on the resource.
    #[error("Invalid method on resource")]
    MethodNotAllowed {
        /// Value for the `Allow` header
        allow: String,
    },
    /// A verb this pipeline does not recognize.
    #[error("Unknown method")]
    NotImplemented {
        /// Value for the `Allow` header
        allow: String,
    },
    /// `If-Match`, `If-None-Match` or `If-Unmodified-Since` rejected the request.
    #[error("Precondition failed")]
    PreconditionFailed,
    /// Cached representation is still fresh. A short-circuit, not a fault.
    #[error("Not modified")]
    NotModified,
    /// `Content-MD5` did not match the digest of the body.
    #[error("The Content-MD5 request header does not match the body.")]
    BodyIntegrity,
    /// A parameter failed validation before invocation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A handler or provider aborted with its own status.
    #[error(transparent)]
    Handler(#[from] HandlerError),
}

impl DispatchError {
    /// The single status code this error maps to
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::NoRoute => StatusCode::NOT_FOUND,
            DispatchError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            DispatchError::NotImplemented { .. } => StatusCode::NOT_IMPLEMENTED,
            DispatchError::PreconditionFailed => StatusCode::PRECONDITION_FAILED,
            DispatchError::NotModified => StatusCode::NOT_MODIFIED,
            DispatchError::BodyIntegrity | DispatchError::Validation(_) => StatusCode::BAD_REQUEST,
            DispatchError::Handler(err) => err.status,
        }
    }

    /// Build the short-circuit response, attaching `headers` (the ETag and
    /// Last-Modified computed so far, if any).
    #[must_use]
    pub fn into_response(self, headers: HeaderMap) -> Response {
        match self {
            DispatchError::NoRoute => Response::not_found(headers),
            DispatchError::MethodNotAllowed { allow } => {
                Response::method_not_allowed(headers, &allow)
            }
            DispatchError::NotImplemented { allow } => Response::not_implemented(headers, &allow),
            DispatchError::PreconditionFailed => Response::precondition_failed(headers),
            DispatchError::NotModified => Response::not_modified(headers),
            DispatchError::BodyIntegrity => {
                Response::bad_request(headers, &DispatchError::BodyIntegrity.to_string())
            }
            DispatchError::Validation(err) => Response::bad_request(headers, &err.to_string()),
            DispatchError::Handler(err) => Response::error(err.status, &err.message, headers),
        }
    }
}
