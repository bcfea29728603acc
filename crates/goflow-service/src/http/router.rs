//! Two-pass router with parameterized path templates.
//!
//! Templates may contain `:name` segments that bind to `path_params` at
//! match time. Matching consults routes in registration order, in two
//! passes: literal templates first, then parameterized ones. That ordering
//! makes `/products/query` win over `/products/:id` no matter which was
//! registered first.

use crate::http::context::HttpContext;
use crate::http::request::HttpRequest;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A request handler. Implementations read the request from the context and
/// leave their response in it; the server writes it after `handle` returns.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: &mut HttpContext);
}

/// One registered route.
pub struct RouteEntry {
    method: String,
    path: String,
    handler: Arc<dyn Handler>,
    /// Parameter names extracted from `:segments`, kept for diagnostics;
    /// binding rederives them from the template.
    params: Vec<String>,
}

/// Outcome of routing one request.
pub enum Resolution {
    /// A route matched; path parameters are bound into the request.
    Matched(Arc<dyn Handler>),
    /// Some template matched the path shape but not the method.
    MethodNotAllowed,
    NotFound,
}

/// Insertion-ordered route table.
#[derive(Default)]
pub struct Router {
    routes: Vec<RouteEntry>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, path: &str, handler: Arc<dyn Handler>) {
        self.register("GET", path, handler);
    }

    pub fn post(&mut self, path: &str, handler: Arc<dyn Handler>) {
        self.register("POST", path, handler);
    }

    pub fn put(&mut self, path: &str, handler: Arc<dyn Handler>) {
        self.register("PUT", path, handler);
    }

    pub fn delete(&mut self, path: &str, handler: Arc<dyn Handler>) {
        self.register("DELETE", path, handler);
    }

    fn register(&mut self, method: &str, path: &str, handler: Arc<dyn Handler>) {
        let params: Vec<String> = segments(path)
            .iter()
            .filter_map(|segment| segment.strip_prefix(':'))
            .map(String::from)
            .collect();
        debug!(method, path, params = ?params, "route registered");
        self.routes.push(RouteEntry {
            method: method.to_string(),
            path: path.to_string(),
            handler,
            params,
        });
    }

    /// Route a request, binding any `:name` segments into its
    /// `path_params`.
    pub fn resolve(&self, request: &mut HttpRequest) -> Resolution {
        let request_segments = segments(&request.path);
        let mut path_matched = false;

        // Exact pass: literal templates only.
        for route in self.routes.iter().filter(|r| !r.path.contains(':')) {
            if segments(&route.path) != request_segments {
                continue;
            }
            if route.method == request.method {
                request.path_params.clear();
                return Resolution::Matched(route.handler.clone());
            }
            path_matched = true;
        }

        // Parameter pass: bind `:name` segments, literals must equal.
        for route in self.routes.iter().filter(|r| r.path.contains(':')) {
            let route_segments = segments(&route.path);
            if route_segments.len() != request_segments.len() {
                continue;
            }
            let mut bindings = HashMap::new();
            let matched = route_segments
                .iter()
                .zip(&request_segments)
                .all(|(route_segment, request_segment)| {
                    if let Some(name) = route_segment.strip_prefix(':') {
                        bindings.insert(name.to_string(), (*request_segment).to_string());
                        true
                    } else {
                        route_segment == request_segment
                    }
                });
            if !matched {
                continue;
            }
            if route.method == request.method {
                request.path_params = bindings;
                return Resolution::Matched(route.handler.clone());
            }
            path_matched = true;
        }

        if path_matched {
            Resolution::MethodNotAllowed
        } else {
            Resolution::NotFound
        }
    }

    /// Registered routes as `(method, path, params)`, for diagnostics.
    pub fn routes(&self) -> impl Iterator<Item = (&str, &str, &[String])> {
        self.routes
            .iter()
            .map(|route| (route.method.as_str(), route.path.as_str(), route.params.as_slice()))
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.trim_matches('/').split('/').collect()
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
