use std::collections::HashMap;

use http::Method;

use super::capability::{EtagProvider, Handler, LastModifiedProvider};
use super::validation::ValidationRule;

/// A registered resource: verb handlers plus optional validator providers.
///
/// Built once at startup with the builder methods below and treated as
/// read-only afterwards. The per-request "instance" is just a shared
/// reference to this value travelling through the pipeline together with
/// the path parameters and the request context.
#[derive(Debug, Clone)]
pub struct ResourceType {
    name: String,
    mount: String,
    handlers: HashMap<Method, Handler>,
    etag: Option<EtagProvider>,
    last_modified: Option<LastModifiedProvider>,
    validations: HashMap<String, ValidationRule>,
    ignored_paths: Option<Vec<String>>,
}

impl ResourceType {
    /// Create a resource mounted at `mount` (e.g. `/users/{id}`)
    pub fn new(name: impl Into<String>, mount: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mount: mount.into(),
            handlers: HashMap::new(),
            etag: None,
            last_modified: None,
            validations: HashMap::new(),
            ignored_paths: None,
        }
    }

    /// Register the handler for `method`, replacing any previous one.
    #[must_use]
    pub fn handler(mut self, method: Method, handler: Handler) -> Self {
        self.handlers.insert(method, handler);
        self
    }

    #[must_use]
    pub fn etag(mut self, provider: EtagProvider) -> Self {
        self.etag = Some(provider);
        self
    }

    #[must_use]
    pub fn last_modified(mut self, provider: LastModifiedProvider) -> Self {
        self.last_modified = Some(provider);
        self
    }

    /// Resource-level rule for `name`, used by every capability that does
    /// not declare its own rule for that name.
    #[must_use]
    pub fn validate(mut self, name: &str, rule: ValidationRule) -> Self {
        self.validations.insert(name.to_string(), rule);
        self
    }

    /// Override the configured ignored paths. An empty list serves everything.
    #[must_use]
    pub fn ignored_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_paths = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn mount(&self) -> &str {
        &self.mount
    }

    /// Handler registered for exactly this verb (no fallback)
    #[must_use]
    pub fn handler_for(&self, method: &Method) -> Option<&Handler> {
        self.handlers.get(method)
    }

    #[must_use]
    pub fn etag_provider(&self) -> Option<&EtagProvider> {
        self.etag.as_ref()
    }

    #[must_use]
    pub fn last_modified_provider(&self) -> Option<&LastModifiedProvider> {
        self.last_modified.as_ref()
    }

    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&ValidationRule> {
        self.validations.get(name)
    }

    /// `None` means "use the dispatcher's configured default"
    #[must_use]
    pub fn ignored_path_list(&self) -> Option<&[String]> {
        self.ignored_paths.as_deref()
    }

    /// Verbs with a registered handler, sorted alphabetically
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<&str> {
        let mut methods: Vec<&str> = self.handlers.keys().map(Method::as_str).collect();
        methods.sort_unstable();
        methods
    }

    /// Value of the `Allow` header, e.g. `DELETE, GET, PUT`
    #[must_use]
    pub fn allow_header(&self) -> String {
        self.allowed_methods().join(", ")
    }
}
