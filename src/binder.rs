//! Parameter binding and validation.
//!
//! Walks a capability's declared parameter list and resolves each entry
//! from the request: the request context itself for `request`, then path
//! parameters, query parameters and form-body parameters, in that order.
//! A value found nowhere is absent.
//!
//! Each resolved value is checked against the rule for its name, looked up
//! on the capability first and on the owning resource type second. With no
//! rule the raw value (or its absence) passes straight through.

use std::sync::Arc;

use serde_json::Value;
use smallvec::SmallVec;
use tracing::debug;

use crate::error::ValidationError;
use crate::request::RequestContext;
use crate::resource::{Capability, ParamSource, ParamSpec, ResourceType};
use crate::router::{PathParams, MAX_INLINE_PARAMS};

/// Arguments bound for one capability invocation, in declared order.
#[derive(Debug, Clone)]
pub struct Args<'a> {
    request: &'a RequestContext,
    path_params: &'a PathParams,
    values: SmallVec<[(Arc<str>, Option<Value>); MAX_INLINE_PARAMS]>,
}

impl<'a> Args<'a> {
    /// Bound value for `name`; `None` when absent or not declared
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .and_then(|(_, v)| v.as_ref())
    }

    /// Bound value for `name` if it is a string
    #[must_use]
    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// The request context
    #[must_use]
    pub fn request(&self) -> &'a RequestContext {
        self.request
    }

    #[must_use]
    pub fn path_params(&self) -> &'a PathParams {
        self.path_params
    }

    /// Declared parameters (except the request context) with their values
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.values.iter().map(|(k, v)| (k.as_ref(), v.as_ref()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Bind and validate every declared parameter of `capability`.
///
/// # Errors
///
/// Returns the first [`ValidationError`] encountered; nothing is invoked
/// in that case.
pub fn bind<'a, T>(
    capability: &Capability<T>,
    resource: &ResourceType,
    path_params: &'a PathParams,
    request: &'a RequestContext,
) -> Result<Args<'a>, ValidationError> {
    let mut values = SmallVec::new();

    for spec in capability.params() {
        if spec.source == ParamSource::Request {
            continue;
        }
        let raw = resolve(spec, path_params, request);

        if raw.is_none() {
            if let Some(default) = &spec.default {
                values.push((Arc::clone(&spec.name), Some(default.clone())));
                continue;
            }
        }

        let rule = capability
            .rule(&spec.name)
            .or_else(|| resource.rule(&spec.name));
        let value = match rule {
            Some(rule) => Some(rule.check(&spec.name, raw)?),
            None => raw.map(|v| Value::String(v.to_string())),
        };
        values.push((Arc::clone(&spec.name), value));
    }

    debug!(
        resource = %resource.name(),
        bound = values.len(),
        "Parameters bound"
    );

    Ok(Args {
        request,
        path_params,
        values,
    })
}

fn resolve<'a>(
    spec: &ParamSpec,
    path_params: &'a PathParams,
    request: &'a RequestContext,
) -> Option<&'a str> {
    let name = spec.name.as_ref();
    match spec.source {
        ParamSource::Any => path_params
            .get(name)
            .or_else(|| request.get_query_param(name))
            .or_else(|| request.get_form_param(name)),
        ParamSource::Path => path_params.get(name),
        ParamSource::Query => request.get_query_param(name),
        ParamSource::Form => request.get_form_param(name),
        ParamSource::Request => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{Conversion, Handler, Reply, ValidationRule};

    fn request(uri: &str, form: &str) -> RequestContext {
        let req = http::Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(form.as_bytes().to_vec())
            .unwrap();
        RequestContext::from_http(req)
    }

    fn noop() -> Handler {
        Handler::new(|_| Ok(Reply::empty()))
    }

    #[test]
    fn test_precedence_path_query_form() {
        let path = PathParams::from_pairs([("id", "p")]);
        let req = request("/x?id=q&name=q", "id=f&name=f&extra=f");
        let handler = noop().param("id").param("name").param("extra").param("missing");
        let res = ResourceType::new("R", "/x");

        let args = bind(&handler, &res, &path, &req).unwrap();
        assert_eq!(args.str("id"), Some("p"));
        assert_eq!(args.str("name"), Some("q"));
        assert_eq!(args.str("extra"), Some("f"));
        assert_eq!(args.get("missing"), None);
        let order: Vec<&str> = args.iter().map(|(k, _)| k).collect();
        assert_eq!(order, vec!["id", "name", "extra", "missing"]);
    }

    #[test]
    fn test_explicit_sources() {
        let path = PathParams::from_pairs([("id", "p")]);
        let req = request("/x?id=q", "id=f");
        let handler = noop()
            .param(ParamSpec::query("id"))
            .param(ParamSpec::request());
        let args = bind(&handler, &ResourceType::new("R", "/x"), &path, &req).unwrap();
        assert_eq!(args.str("id"), Some("q"));
        assert_eq!(args.len(), 1);
        assert_eq!(args.request().path, "/x");
    }

    #[test]
    fn test_handler_rule_wins_over_resource_rule() {
        let path = PathParams::from_pairs([("id", "abc")]);
        let req = request("/x", "");
        let res = ResourceType::new("R", "/x").validate("id", ValidationRule::pattern("[0-9]+").unwrap());

        assert!(bind(&noop().param("id"), &res, &path, &req).is_err());

        let handler = noop()
            .param("id")
            .validate("id", ValidationRule::pattern("[a-z]+").unwrap());
        let args = bind(&handler, &res, &path, &req).unwrap();
        assert_eq!(args.str("id"), Some("abc"));
    }

    #[test]
    fn test_defaults() {
        let path = PathParams::default();
        let handler = noop()
            .param(ParamSpec::new("id").default_value(5))
            .validate("id", ValidationRule::required());
        let res = ResourceType::new("R", "/x");

        let req = request("/x?foo=bar", "");
        let args = bind(&handler, &res, &path, &req).unwrap();
        assert_eq!(args.get("id"), Some(&Value::from(5)));

        let req = request("/x?id=8", "");
        let args = bind(&handler, &res, &path, &req).unwrap();
        assert_eq!(args.str("id"), Some("8"));

        let err = bind(&handler, &res, &path, &request("/x?id=", "")).unwrap_err();
        assert_eq!(err.to_string(), "Value for id must not be empty.");
    }

    #[test]
    fn test_conversion_applied() {
        let handler = noop()
            .param("foo")
            .validate("foo", ValidationRule::required().convert(Conversion::Integer));
        let res = ResourceType::new("R", "/x");
        let path = PathParams::default();
        let req = request("/x?foo=193", "");
        let args = bind(&handler, &res, &path, &req).unwrap();
        assert_eq!(args.get("foo"), Some(&Value::from(193)));
    }

    #[test]
    fn test_path_params_visible_to_handler() {
        let path = PathParams::from_pairs([("id", "7"), ("_extension", ".xml")]);
        let req = request("/x/7.xml", "");
        let args = bind(&noop().param("id"), &ResourceType::new("R", "/x/{id}"), &path, &req).unwrap();
        assert_eq!(args.path_params().extension(), Some(".xml"));
        assert_eq!(args.path_params().get("id"), args.str("id"));
    }
}
