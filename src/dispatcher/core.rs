use http::header::HeaderMap;
use http::Method;
use serde_json::Value;
use tracing::{debug, error, info, info_span};

use super::method::{is_known_method, resolve_method};
use crate::binder;
use crate::conditional::{self, Precondition};
use crate::config::DispatchConfig;
use crate::error::DispatchError;
use crate::request::RequestContext;
use crate::resource::{Reply, ResourceType};
use crate::response::Response;
use crate::router::{PathRouter, RouteMatch, Router};

/// Runs the dispatch pipeline for requests against a fixed router.
///
/// Holds no per-request state. A single instance can serve any number of
/// threads at once through a shared reference.
#[derive(Debug)]
pub struct Dispatcher<R: Router = PathRouter> {
    router: R,
    config: DispatchConfig,
    log_dispatch: Option<tracing::Dispatch>,
}

impl Dispatcher<PathRouter> {
    /// Build a [`PathRouter`] over `resources` and wrap it.
    ///
    /// # Errors
    ///
    /// Returns the regex error if a mount path cannot be compiled.
    pub fn from_resources(resources: Vec<ResourceType>) -> Result<Self, regex::Error> {
        Ok(Self::new(PathRouter::new(resources)?))
    }
}

impl<R: Router> Dispatcher<R> {
    /// Create a dispatcher with [`DispatchConfig::default`]
    pub fn new(router: R) -> Self {
        Self {
            router,
            config: DispatchConfig::default(),
            log_dispatch: None,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Send this dispatcher's diagnostics to `dispatch` instead of the
    /// process-wide default subscriber.
    #[must_use]
    pub fn with_log_dispatch(mut self, dispatch: tracing::Dispatch) -> Self {
        self.log_dispatch = Some(dispatch);
        self
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Run one request through the pipeline.
    ///
    /// Never fails: every terminal condition becomes a response.
    #[must_use]
    pub fn dispatch(&self, request: &RequestContext) -> Response {
        match &self.log_dispatch {
            Some(sink) => tracing::dispatcher::with_default(sink, || self.dispatch_in_span(request)),
            None => self.dispatch_in_span(request),
        }
    }

    /// Transport-level entry point: parse, dispatch, render.
    ///
    /// HEAD bodies are dropped only when `strip_head_body` is configured.
    #[must_use]
    pub fn handle(&self, req: http::Request<Vec<u8>>) -> http::Response<Vec<u8>> {
        let request = RequestContext::from_http(req);
        let strip_body = self.config.strip_head_body && request.method == Method::HEAD;
        self.dispatch(&request).into_http(strip_body)
    }

    fn dispatch_in_span(&self, request: &RequestContext) -> Response {
        let span = info_span!("dispatch", method = %request.method, path = %request.path);
        let _enter = span.enter();

        // Validators computed before a short-circuit still go out with it.
        let mut defaults = HeaderMap::new();
        match self.run(request, &mut defaults) {
            Ok(response) => {
                debug!(status = response.status.as_u16(), "Request dispatched");
                response
            }
            Err(err) => Self::short_circuit(err, defaults),
        }
    }

    fn run(
        &self,
        request: &RequestContext,
        defaults: &mut HeaderMap,
    ) -> Result<Response, DispatchError> {
        let Some(RouteMatch {
            resource,
            path_params,
        }) = self.router.resolve(&request.path)
        else {
            return Err(DispatchError::NoRoute);
        };

        if self.is_ignored(&resource, request) {
            debug!(resource = %resource.name(), "Ignored path");
            return Err(DispatchError::NoRoute);
        }

        let Some(handler) = resolve_method(&resource, &request.method) else {
            let allow = resource.allow_header();
            return Err(if is_known_method(&request.method) {
                DispatchError::MethodNotAllowed { allow }
            } else {
                DispatchError::NotImplemented { allow }
            });
        };

        let conditions = conditional::evaluate(&resource, &path_params, request)?;
        *defaults = conditions.defaults.to_header_map();
        match conditions.decision {
            Precondition::Proceed => {}
            Precondition::NotModified => return Err(DispatchError::NotModified),
            Precondition::Failed => return Err(DispatchError::PreconditionFailed),
        }

        let args = binder::bind(handler, &resource, &path_params, request)?;
        let reply = handler.call(&args)?;

        let mut response = assemble(reply, defaults);
        response.extension = path_params.extension().map(str::to_string);
        Ok(response)
    }

    fn is_ignored(&self, resource: &ResourceType, request: &RequestContext) -> bool {
        if request.method != Method::GET || request.query.as_deref().is_some_and(|q| !q.is_empty())
        {
            return false;
        }
        resource
            .ignored_path_list()
            .unwrap_or(self.config.ignored_paths.as_slice())
            .iter()
            .any(|p| *p == request.path)
    }

    fn short_circuit(err: DispatchError, defaults: HeaderMap) -> Response {
        let status = err.status();
        if matches!(err, DispatchError::NotModified) {
            info!(status = status.as_u16(), reason = %err, "Not modified");
        } else {
            error!(status = status.as_u16(), reason = %err, "Request short-circuited");
        }
        err.into_response(defaults)
    }
}

/// Handler headers win; defaults fill in only the names the handler left unset.
fn assemble(reply: Reply, defaults: &HeaderMap) -> Response {
    let Reply {
        status,
        body,
        mut headers,
    } = reply;
    for (name, value) in defaults {
        if !headers.contains_key(name) {
            headers.insert(name.clone(), value.clone());
        }
    }
    let body = match body {
        Value::Null => None,
        other => Some(other),
    };
    Response::new(status, headers, body)
}
