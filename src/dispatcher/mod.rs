//! # Dispatcher Module
//!
//! The dispatcher composes routing, method resolution, conditional-request
//! evaluation, parameter binding and handler invocation into one synchronous
//! pipeline that always produces a [`Response`](crate::response::Response).
//!
//! ## Request Flow
//!
//! 1. Router resolves the path → resource type + path parameters, or 404
//! 2. Ignored paths (`/robots.txt`, `/favicon.ico` on GET) → 404
//! 3. Method resolver finds the verb handler (HEAD falls back to GET); a
//!    missing handler is 405 for known verbs and 501 otherwise, both with
//!    an `Allow` header
//! 4. Conditional evaluator checks `Content-MD5` (400), computes `ETag` /
//!    `Last-Modified` and may short-circuit with 304 or 412
//! 5. Binder resolves and validates the declared parameters (400 on failure)
//! 6. The handler runs exactly once; its headers are merged over the
//!    computed defaults and the path extension is attached
//!
//! ## Error Handling
//!
//! Every stage returns `Result<_, DispatchError>`. The error is turned into
//! a response in one place, and logged there: `error` for 4xx/5xx, `info`
//! for 304. Nothing escapes [`Dispatcher::dispatch`].
//!
//! ## Logging
//!
//! Each request runs inside a `dispatch` span carrying `method` and `path`.
//! [`Dispatcher::with_log_dispatch`] scopes a specific `tracing` subscriber to
//! one dispatcher instead of relying on the global default.
//!
//! ## Example
//!
//! ```rust
//! use http::{Method, StatusCode};
//! use resource_dispatch::dispatcher::Dispatcher;
//! use resource_dispatch::resource::{Handler, Reply, ResourceType};
//!
//! # fn main() -> Result<(), regex::Error> {
//! let greeting = ResourceType::new("Greeting", "/hello/{name}").handler(
//!     Method::GET,
//!     Handler::new(|args| Ok(Reply::new(format!("hi {}", args.str("name").unwrap_or("?")))))
//!         .param("name"),
//! );
//! let dispatcher = Dispatcher::from_resources(vec![greeting])?;
//!
//! let req = http::Request::get("/hello/ann").body(Vec::new()).unwrap();
//! let res = dispatcher.handle(req);
//! assert_eq!(res.status(), StatusCode::OK);
//! assert_eq!(res.body(), b"hi ann");
//!
//! let req = http::Request::delete("/hello/ann").body(Vec::new()).unwrap();
//! let res = dispatcher.handle(req);
//! assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
//! assert_eq!(res.headers()["allow"], "GET");
//! # Ok(())
//! # }
//! ```

mod core;
mod method;

pub use self::core::Dispatcher;
pub use self::method::{is_known_method, resolve_method, KNOWN_METHODS};
