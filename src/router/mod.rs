//! # Router Module
//!
//! Path resolution for the dispatch pipeline. The dispatcher only depends on
//! the [`Router`] trait: given a request path, return the matched resource
//! type and the extracted path parameters, or nothing (which becomes a 404).
//!
//! [`PathRouter`] is the reference implementation and doubles as the
//! resource registry. It is built once at startup and is read-only after
//! that, so it can be shared across any number of worker threads.
//!
//! ## Architecture
//!
//! 1. **Compilation**: each resource's mount path (e.g. `/users/{id}`) is
//!    converted into an anchored regex that captures one value per `{param}`
//!    segment, plus an optional trailing `.ext` on the last segment.
//!
//! 2. **Matching**: the request path is tested against the compiled patterns
//!    in registration order; the first match wins. A captured extension is
//!    exposed under the reserved [`EXTENSION_PARAM`] key.
//!
//! ## Example
//!
//! ```rust
//! use resource_dispatch::resource::ResourceType;
//! use resource_dispatch::router::{PathRouter, Router};
//!
//! # fn main() -> Result<(), regex::Error> {
//! let router = PathRouter::new(vec![ResourceType::new("User", "/users/{id}")])?;
//!
//! let matched = router.resolve("/users/42.json").unwrap();
//! assert_eq!(matched.resource.name(), "User");
//! assert_eq!(matched.path_params.get("id"), Some("42"));
//! assert_eq!(matched.path_params.extension(), Some(".json"));
//! assert!(router.resolve("/nope").is_none());
//! # Ok(())
//! # }
//! ```

mod core;

pub use self::core::{
    ParamVec, PathParams, PathRouter, RouteMatch, Router, EXTENSION_PARAM, MAX_INLINE_PARAMS,
};
