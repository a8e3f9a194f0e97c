//! Route lookup and upstream path rewriting.
//!
//! # Responsibilities
//! - Resolve (path, method) to a target service and upstream path
//! - Distinguish unknown paths (404) from known paths with a wrong
//!   method (405)
//! - Substitute the matched public prefix with the route's upstream path,
//!   preserving any suffix (path-parameter style routes)

use std::sync::Arc;

use axum::http::Method;

use crate::registry::{RouteSpec, ServiceDescriptor, ServiceRegistry};
use crate::routing::matcher::{prefix_matches, suffix_after};

/// Outcome of a failed route resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteFailure {
    NotFound,
    MethodNotAllowed { allowed: Vec<Method> },
}

/// A resolved route: where the request goes and under which rules.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteTarget {
    pub service: Arc<ServiceDescriptor>,
    pub route: RouteSpec,
    pub upstream_path: String,
}

/// Resolves inbound paths against the immutable service registry.
#[derive(Debug, Clone)]
pub struct Router {
    registry: Arc<ServiceRegistry>,
}

impl Router {
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Resolve a public path to its upstream target.
    ///
    /// The best match is the longest combined (namespace + public prefix)
    /// that matches on a segment boundary; among equal lengths the first
    /// registered wins. The method check runs against the best match only,
    /// so a known path with a wrong method reports 405, not 404.
    pub fn resolve(&self, path: &str, method: &Method) -> Result<RouteTarget, RouteFailure> {
        let path = normalize(path);

        let mut best: Option<(usize, &Arc<ServiceDescriptor>, &RouteSpec)> = None;
        for service in self.registry.services() {
            if !prefix_matches(path, &service.namespace) {
                continue;
            }
            let remainder = effective_remainder(path, &service.namespace);
            for route in &service.routes {
                if !prefix_matches(remainder, &route.public_prefix) {
                    continue;
                }
                let length = service.namespace.len() + route.public_prefix.len();
                if best.map_or(true, |(b, _, _)| length > b) {
                    best = Some((length, service, route));
                }
            }
        }

        let (_, service, route) = best.ok_or(RouteFailure::NotFound)?;
        if !route.allows(method) {
            return Err(RouteFailure::MethodNotAllowed {
                allowed: route.methods.clone(),
            });
        }

        let remainder = effective_remainder(path, &service.namespace);
        let suffix = suffix_after(remainder, &route.public_prefix);
        Ok(RouteTarget {
            service: Arc::clone(service),
            route: route.clone(),
            upstream_path: format!("{}{}", route.upstream_path, suffix),
        })
    }
}

/// Trailing slashes are not significant: `/api/check/` routes like
/// `/api/check`.
fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// Path remaining after the namespace is stripped; a bare namespace hit
/// behaves like a request for the service root.
fn effective_remainder<'a>(path: &'a str, namespace: &str) -> &'a str {
    let remainder = suffix_after(path, namespace);
    if remainder.is_empty() {
        "/"
    } else {
        remainder
    }
}
