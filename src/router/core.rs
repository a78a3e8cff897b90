use std::sync::Arc;

use regex::Regex;
use smallvec::SmallVec;
use tracing::{debug, info};

use crate::resource::ResourceType;

/// Maximum number of path/query parameters before heap allocation.
/// Most resource paths have ≤4 path params (e.g. /users/{id}/posts/{post_id}).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Reserved path parameter carrying the requested representation extension.
pub const EXTENSION_PARAM: &str = "_extension";

/// Stack-allocated parameter storage for the hot path.
///
/// Param names use `Arc<str>` because they come from the route table
/// (known at startup) and are cloned per request.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Named values extracted from the URL path for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(ParamVec);

impl PathParams {
    #[must_use]
    pub fn new(params: ParamVec) -> Self {
        Self(params)
    }

    /// Build from name/value pairs, mostly useful in tests and custom routers.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Arc<str>>,
        V: Into<String>,
    {
        Self(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Get a path parameter by name
    ///
    /// Uses "last write wins" semantics: if duplicate parameter names exist
    /// at different path depths (e.g., `/org/{id}/user/{id}`), returns the
    /// last occurrence.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Requested representation extension including the dot, e.g. `.json`
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        self.get(EXTENSION_PARAM)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_ref(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result of successfully resolving a request path
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched resource type (shared, never cloned deeply)
    pub resource: Arc<ResourceType>,
    /// Path parameters extracted from the URL (e.g., `{id}` → `{"id": "123"}`)
    pub path_params: PathParams,
}

/// Maps a request path to a resource type plus path parameters.
///
/// Implementations must be immutable after construction; the dispatcher
/// calls `resolve` concurrently from many threads without locking.
pub trait Router: Send + Sync {
    /// `None` means no route matched and the request ends in a 404.
    fn resolve(&self, path: &str) -> Option<RouteMatch>;
}

/// Regex-backed router over a fixed list of resource types.
#[derive(Debug, Clone)]
pub struct PathRouter {
    routes: Vec<(Regex, Vec<Arc<str>>, Arc<ResourceType>)>,
}

impl PathRouter {
    /// Compile the mount paths of `resources`, keeping registration order.
    ///
    /// # Errors
    ///
    /// Returns the regex error if a mount path cannot be compiled.
    pub fn new(resources: Vec<ResourceType>) -> Result<Self, regex::Error> {
        let mut routes = Vec::with_capacity(resources.len());
        for resource in resources {
            let (regex, param_names) = Self::path_to_regex(resource.mount())?;
            routes.push((regex, param_names, Arc::new(resource)));
        }

        let routes_summary: Vec<String> = routes
            .iter()
            .take(10)
            .map(|(_, _, res)| format!("{} -> {}", res.mount(), res.name()))
            .collect();
        info!(
            routes_count = routes.len(),
            routes_summary = ?routes_summary,
            "Routing table loaded"
        );

        Ok(Self { routes })
    }

    /// Registered resource types in matching order
    pub fn resources(&self) -> impl Iterator<Item = &Arc<ResourceType>> {
        self.routes.iter().map(|(_, _, res)| res)
    }

    /// Convert a mount path to a regex and extract parameter names
    ///
    /// Transforms `/users/{id}` into `^/users/([^/]+?)(\.[A-Za-z0-9]+)?$`
    /// and returns `["id"]`. Static segments are escaped. The trailing group
    /// captures an optional representation extension.
    pub(crate) fn path_to_regex(path: &str) -> Result<(Regex, Vec<Arc<str>>), regex::Error> {
        if path == "/" || path.is_empty() {
            return Ok((Regex::new(r"^/$")?, Vec::new()));
        }

        let mut pattern = String::with_capacity(path.len() + 32);
        pattern.push('^');
        let mut param_names = Vec::with_capacity(path.matches('{').count());

        for segment in path.split('/') {
            if segment.starts_with('{') && segment.ends_with('}') {
                let param_name = segment.trim_start_matches('{').trim_end_matches('}');
                pattern.push_str("/([^/]+?)");
                param_names.push(Arc::from(param_name));
            } else if !segment.is_empty() {
                pattern.push('/');
                pattern.push_str(&regex::escape(segment));
            }
        }

        pattern.push_str(r"(\.[A-Za-z0-9]+)?$");
        Ok((Regex::new(&pattern)?, param_names))
    }
}

/// Percent-decode a captured segment so path values arrive in the same form
/// as query and form values. Invalid UTF-8 after decoding keeps the raw text.
fn decode_segment(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}

impl Router for PathRouter {
    fn resolve(&self, path: &str) -> Option<RouteMatch> {
        for (regex, param_names, resource) in &self.routes {
            let Some(caps) = regex.captures(path) else {
                continue;
            };

            let mut params = ParamVec::new();
            for (i, name) in param_names.iter().enumerate() {
                if let Some(m) = caps.get(i + 1) {
                    params.push((Arc::clone(name), decode_segment(m.as_str())));
                }
            }
            if let Some(ext) = caps.get(param_names.len() + 1) {
                params.push((Arc::from(EXTENSION_PARAM), ext.as_str().to_string()));
            }

            debug!(
                path = %path,
                resource = %resource.name(),
                mount = %resource.mount(),
                path_params = ?params,
                "Route matched"
            );
            return Some(RouteMatch {
                resource: Arc::clone(resource),
                path_params: PathParams::new(params),
            });
        }

        debug!(path = %path, "No route matched");
        None
    }
}
