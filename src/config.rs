//! # Runtime Configuration Module
//!
//! Environment-variable configuration for the dispatcher.
//!
//! ## Environment Variables
//!
//! ### `RESDISPATCH_IGNORED_PATHS`
//!
//! Comma-separated request paths that resources refuse to serve on GET
//! unless they override the list themselves. Crawlers and browsers request
//! these constantly, and a catch-all root resource (`/{id}`) would otherwise
//! try to load an entity called `favicon`.
//!
//! Default: `/robots.txt,/favicon.ico`. Set to an empty string to disable.
//!
//! ### `RESDISPATCH_STRIP_HEAD_BODY`
//!
//! `true` drops the body when rendering a HEAD response through
//! [`Dispatcher::handle`](crate::dispatcher::Dispatcher::handle). HEAD is
//! served by the GET handler; by default its full body is returned.
//!
//! Default: `false`
//!
//! ## Usage
//!
//! ```rust
//! use resource_dispatch::config::DispatchConfig;
//!
//! let config = DispatchConfig::from_env();
//! println!("Ignored paths: {:?}", config.ignored_paths);
//! ```

use std::env;

/// Paths ignored on GET when neither the resource nor the environment says otherwise
pub const DEFAULT_IGNORED_PATHS: [&str; 2] = ["/robots.txt", "/favicon.ico"];

/// Dispatcher configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Default ignored paths for resources that do not declare their own
    pub ignored_paths: Vec<String>,
    /// Drop HEAD response bodies when rendering to HTTP
    pub strip_head_body: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            ignored_paths: DEFAULT_IGNORED_PATHS.iter().map(|p| p.to_string()).collect(),
            strip_head_body: false,
        }
    }
}

impl DispatchConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables fall back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let ignored_paths = match lookup("RESDISPATCH_IGNORED_PATHS") {
            Some(val) => val
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
            None => defaults.ignored_paths,
        };
        let strip_head_body = lookup("RESDISPATCH_STRIP_HEAD_BODY")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.strip_head_body);
        Self {
            ignored_paths,
            strip_head_body,
        }
    }
}
