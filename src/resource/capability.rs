use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};
use serde_json::Value;

use super::validation::ValidationRule;
use crate::binder::Args;
use crate::error::HandlerError;

/// Where the binder looks for a declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSource {
    /// Path parameters, then query, then form body
    Any,
    /// Path parameters only
    Path,
    /// Query string only
    Query,
    /// `application/x-www-form-urlencoded` body only
    Form,
    /// The request context itself, reachable through [`Args::request`]
    Request,
}

/// One entry of a capability's declared parameter list.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: Arc<str>,
    pub source: ParamSource,
    /// Bound when the value is absent; validation is skipped in that case
    pub default: Option<Value>,
}

impl ParamSpec {
    /// Parameter resolved by precedence (path → query → form).
    ///
    /// The name `request` is special-cased to bind the request context.
    pub fn new(name: &str) -> Self {
        let source = if name == "request" {
            ParamSource::Request
        } else {
            ParamSource::Any
        };
        Self {
            name: Arc::from(name),
            source,
            default: None,
        }
    }

    pub fn path(name: &str) -> Self {
        Self::with_source(name, ParamSource::Path)
    }

    pub fn query(name: &str) -> Self {
        Self::with_source(name, ParamSource::Query)
    }

    pub fn form(name: &str) -> Self {
        Self::with_source(name, ParamSource::Form)
    }

    /// Declares that the capability wants the request context
    #[must_use]
    pub fn request() -> Self {
        Self::with_source("request", ParamSource::Request)
    }

    /// Value to bind when the request does not supply one
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    fn with_source(name: &str, source: ParamSource) -> Self {
        Self {
            name: Arc::from(name),
            source,
            default: None,
        }
    }
}

impl From<&str> for ParamSpec {
    fn from(name: &str) -> Self {
        ParamSpec::new(name)
    }
}

/// What a verb handler hands back: a body, optionally with headers.
///
/// Headers set here override the pipeline's default `ETag` and
/// `Last-Modified` of the same name. A `Null` body means "no body".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reply {
    /// Defaults to `200 OK`
    pub status: StatusCode,
    pub body: Value,
    pub headers: HeaderMap,
}

impl Reply {
    /// Plain body with no extra headers
    pub fn new(body: impl Into<Value>) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.into(),
            headers: HeaderMap::new(),
        }
    }

    /// Success status other than 200, e.g. `201 Created`
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// No body at all
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add or replace a response header
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

impl From<Value> for Reply {
    fn from(body: Value) -> Self {
        Reply::new(body)
    }
}

type CapabilityFn<T> = dyn Fn(&Args<'_>) -> Result<T, HandlerError> + Send + Sync;

/// A callable exposed by a resource type together with its declared
/// parameter list and handler-level validation rules.
pub struct Capability<T> {
    params: Vec<ParamSpec>,
    validations: HashMap<String, ValidationRule>,
    func: Arc<CapabilityFn<T>>,
}

/// Verb handler
pub type Handler = Capability<Reply>;
/// Produces the raw (unquoted) entity tag, or `None` when there is none
pub type EtagProvider = Capability<Option<String>>;
/// Produces the last modification time, or `None` when unknown
pub type LastModifiedProvider = Capability<Option<SystemTime>>;

impl<T> Capability<T> {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&Args<'_>) -> Result<T, HandlerError> + Send + Sync + 'static,
    {
        Self {
            params: Vec::new(),
            validations: HashMap::new(),
            func: Arc::new(func),
        }
    }

    /// Append a parameter to the declared list; order is preserved.
    #[must_use]
    pub fn param(mut self, spec: impl Into<ParamSpec>) -> Self {
        self.params.push(spec.into());
        self
    }

    /// Attach a rule for `name`. Takes precedence over a rule of the same
    /// name on the owning resource type.
    #[must_use]
    pub fn validate(mut self, name: &str, rule: ValidationRule) -> Self {
        self.validations.insert(name.to_string(), rule);
        self
    }

    #[must_use]
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&ValidationRule> {
        self.validations.get(name)
    }

    /// Invoke with already bound and validated arguments.
    pub fn call(&self, args: &Args<'_>) -> Result<T, HandlerError> {
        (self.func)(args)
    }
}

impl<T> Clone for Capability<T> {
    fn clone(&self) -> Self {
        Self {
            params: self.params.clone(),
            validations: self.validations.clone(),
            func: Arc::clone(&self.func),
        }
    }
}

impl<T> fmt::Debug for Capability<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("params", &self.params)
            .field("validations", &self.validations.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
