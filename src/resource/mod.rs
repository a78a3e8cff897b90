//! # Resource Module
//!
//! Resource types are the registered, capability-bearing units that the
//! dispatcher serves. Each one declares, at registration time:
//!
//! - a table of verb handlers (`GET`, `PUT`, custom verbs, ...)
//! - an optional `ETag` provider and an optional `Last-Modified` provider
//! - per-parameter [`ValidationRule`]s shared by all of its capabilities
//! - the request paths it refuses to serve (`/robots.txt`, `/favicon.ico`)
//!
//! Every capability carries an explicit, ordered list of [`ParamSpec`]s that
//! tells the binder where each argument comes from. Nothing is discovered at
//! request time; a resource type is immutable once it has been handed to a
//! router.
//!
//! ## Example
//!
//! ```rust
//! use http::Method;
//! use resource_dispatch::resource::{Handler, ParamSpec, Reply, ResourceType, ValidationRule};
//!
//! # fn main() -> Result<(), regex::Error> {
//! let document = ResourceType::new("Document", "/docs/{id}")
//!     .validate("id", ValidationRule::pattern("[0-9]+")?)
//!     .handler(
//!         Method::GET,
//!         Handler::new(|args| Ok(Reply::new(serde_json::json!({ "id": args.str("id") }))))
//!             .param(ParamSpec::path("id")),
//!     );
//! assert_eq!(document.allow_header(), "GET");
//! # Ok(())
//! # }
//! ```

mod capability;
mod core;
mod validation;

pub use self::capability::{
    Capability, EtagProvider, Handler, LastModifiedProvider, ParamSource, ParamSpec, Reply,
};
pub use self::core::ResourceType;
pub use self::validation::{Conversion, ValidationRule};
