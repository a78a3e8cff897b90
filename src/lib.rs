//! # resource-dispatch
//!
//! **resource-dispatch** is a synchronous request-dispatch core for
//! resource-oriented HTTP services. Given a registry of resource types, each
//! exposing per-verb handlers and optional `ETag` / `Last-Modified`
//! providers, it turns one inbound request into one response with the right
//! status code and headers.
//!
//! ## Architecture
//!
//! The library is organized into the following modules:
//!
//! - **[`resource`]** - Resource types, handlers, declared parameters and validation rules
//! - **[`router`]** - The [`Router`](router::Router) interface and a regex-based reference router
//! - **[`request`]** - Immutable request context (verb, path, query, form, body, conditional headers)
//! - **[`conditional`]** - `Content-MD5`, `ETag` and `Last-Modified` precondition evaluation
//! - **[`binder`]** - Parameter resolution (path → query → form) and validation
//! - **[`dispatcher`]** - Method resolution and the orchestrating pipeline
//! - **[`response`]** - Response outcome and the status-response helpers
//! - **[`error`]** - Error taxonomy, one status per variant
//! - **[`config`]** - Environment-driven runtime configuration
//! - **[`logging`]** - Optional global `tracing` subscriber setup
//!
//! ### Request Lifecycle
//!
//! ```text
//! request ─▶ Router ─▶ method resolution ─▶ conditional check ─▶ bind + validate ─▶ handler
//!              │404           │405/501            │400/304/412          │400          │
//!              ▼              ▼                   ▼                     ▼             ▼
//!                               response (+ ETag / Last-Modified merge)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::time::{Duration, UNIX_EPOCH};
//!
//! use http::{Method, StatusCode};
//! use resource_dispatch::resource::{
//!     EtagProvider, Handler, LastModifiedProvider, Reply, ResourceType, ValidationRule,
//! };
//! use resource_dispatch::Dispatcher;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), regex::Error> {
//! let document = ResourceType::new("Document", "/docs/{id}")
//!     .validate("id", ValidationRule::pattern("[0-9]+")?)
//!     .etag(EtagProvider::new(|args| Ok(args.str("id").map(|id| format!("doc-{id}")))).param("id"))
//!     .last_modified(LastModifiedProvider::new(|_| {
//!         Ok(Some(UNIX_EPOCH + Duration::from_secs(784_111_777)))
//!     }))
//!     .handler(
//!         Method::GET,
//!         Handler::new(|args| Ok(Reply::new(json!({ "id": args.str("id") })))).param("id"),
//!     );
//!
//! let dispatcher = Dispatcher::from_resources(vec![document])?;
//!
//! let res = dispatcher.handle(http::Request::get("/docs/7").body(Vec::new()).unwrap());
//! assert_eq!(res.status(), StatusCode::OK);
//! assert_eq!(res.headers()["etag"], "\"doc-7\"");
//! assert_eq!(res.headers()["last-modified"], "Sun, 06 Nov 1994 08:49:37 GMT");
//!
//! let req = http::Request::get("/docs/7")
//!     .header("if-none-match", "\"doc-7\"")
//!     .body(Vec::new())
//!     .unwrap();
//! let res = dispatcher.handle(req);
//! assert_eq!(res.status(), StatusCode::NOT_MODIFIED);
//! assert!(res.body().is_empty());
//!
//! let res = dispatcher.handle(http::Request::get("/docs/x").body(Vec::new()).unwrap());
//! assert_eq!(res.status(), StatusCode::BAD_REQUEST);
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! The resource registry and router table are built once and never mutated.
//! A [`Dispatcher`] holds no per-request state, so one instance can be shared
//! by reference (or behind an `Arc`) across as many worker threads as the
//! hosting transport uses. No locks are taken inside the pipeline.
//!
//! ## Known Deviations
//!
//! HEAD is served by the GET handler and, unless `RESDISPATCH_STRIP_HEAD_BODY`
//! is set, the rendered response keeps the GET body.

pub mod binder;
pub mod conditional;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod request;
pub mod resource;
pub mod response;
pub mod router;

pub use config::DispatchConfig;
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, HandlerError, ValidationError};
pub use request::RequestContext;
pub use resource::{Handler, ParamSpec, Reply, ResourceType, ValidationRule};
pub use response::Response;
pub use router::{PathParams, PathRouter, Router};
