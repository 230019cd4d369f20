//! Request-side view handed to the argument binder.
//!
//! `RequestContext` is the narrow interface this crate consumes from the
//! transport layer: path-captured values, query values, and the context
//! itself as an injectable value. The transport builds one per request after
//! its own path matching and hands it to [`RouteEntry::dispatch`].
//!
//! [`RouteEntry::dispatch`]: crate::router::RouteEntry::dispatch

use crate::ids::RequestId;
use http::Method;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;

/// Maximum number of path/query parameters before heap allocation.
/// Most REST APIs have ≤4 path params (e.g. `/users/{id}/posts/{post_id}`).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the dispatch hot path.
///
/// Param names use `Arc<str>` because they come from the static route
/// pattern and are cloned per request; values are per-request data and stay
/// `String`.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// One inbound request, as seen by the argument binder.
///
/// Cloneable so the builtin identity injector can hand the context itself to
/// a handler that declares a parameter of this type.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique request ID for log correlation
    pub request_id: RequestId,
    /// HTTP method of the inbound request
    pub method: Method,
    /// Request path as matched by the external router
    pub path: String,
    /// Path parameters captured by the external matcher
    pub path_params: ParamVec,
    /// Query string parameters
    pub query_params: ParamVec,
}

impl RequestContext {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(),
            method,
            path: path.into(),
            path_params: ParamVec::new(),
            query_params: ParamVec::new(),
        }
    }

    /// Add a path-captured value (builder style, useful in tests and shims).
    #[must_use]
    pub fn with_path_param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.path_params.push((Arc::from(name), value.into()));
        self
    }

    /// Add a query value (builder style).
    #[must_use]
    pub fn with_query_param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.query_params.push((Arc::from(name), value.into()));
        self
    }

    /// Get a path parameter by name.
    ///
    /// Uses "last write wins" semantics: if duplicate parameter names exist
    /// at different path depths (e.g. `/org/{id}/user/{id}`), returns the
    /// last occurrence.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name ("last write wins" for repeated keys).
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Convert path params to a HashMap. Allocates; prefer `get_path_param`
    /// on the hot path.
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    /// Convert query params to a HashMap. Allocates; prefer
    /// `get_query_param` on the hot path.
    #[must_use]
    pub fn query_params_map(&self) -> HashMap<String, String> {
        self.query_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}
