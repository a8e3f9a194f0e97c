//! Upstream service registry.
//!
//! # Responsibilities
//! - Hold the static mapping from logical service name to base URL
//! - Hold each service's route table (public prefix → upstream path)
//! - Provide name lookup and ordered iteration for the catalog endpoint
//!
//! # Design Decisions
//! - Built once from validated config before serving, immutable thereafter
//! - Shared via `Arc`, never written in the request path, no locking
//! - `register` is idempotent by name; re-registering replaces in place so
//!   registration order (which breaks route ties) is stable

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::Method;
use url::Url;

use crate::config::{RouteConfig, ServiceConfig};

/// A rule mapping a public path prefix to an upstream path and the methods
/// it accepts. Service-specific behavior (redaction, required parameter,
/// admin gate) is route configuration, not code.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSpec {
    /// Public prefix within the service namespace, e.g. `/api/check`.
    pub public_prefix: String,
    /// Upstream path substituted for the matched prefix.
    pub upstream_path: String,
    /// Allowed methods; anything else is a 405.
    pub methods: Vec<Method>,
    /// Apply sensitive-field redaction to the response body.
    pub redact: bool,
    /// Parameter that must be present and non-empty (query param on GET,
    /// JSON body field otherwise) before any upstream call is made.
    pub require_param: Option<String>,
    /// Require the admin shared secret before forwarding.
    pub admin: bool,
}

impl RouteSpec {
    pub fn allows(&self, method: &Method) -> bool {
        self.methods.contains(method)
    }
}

/// One upstream service: where it lives and what it exposes.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDescriptor {
    pub name: String,
    pub base_url: Url,
    /// Public mount prefix (`/api/<service>` style). Empty string mounts the
    /// service at the bare root.
    pub namespace: String,
    pub routes: Vec<RouteSpec>,
}

/// Errors building the registry from configuration.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("service '{service}': invalid base_url '{url}': {source}")]
    InvalidBaseUrl {
        service: String,
        url: String,
        source: url::ParseError,
    },
    #[error("service '{service}': unsupported method '{method}'")]
    UnsupportedMethod { service: String, method: String },
}

/// Static, read-only mapping of logical service names to descriptors.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    /// Descriptors in registration order.
    services: Vec<Arc<ServiceDescriptor>>,
    by_name: HashMap<String, usize>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry from validated configuration.
    pub fn from_config(configs: &[ServiceConfig]) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for config in configs {
            registry.register(build_descriptor(config)?);
        }
        Ok(registry)
    }

    /// Add or replace a service by name. Replacement keeps the original
    /// registration position.
    pub fn register(&mut self, descriptor: ServiceDescriptor) {
        let descriptor = Arc::new(descriptor);
        match self.by_name.get(&descriptor.name) {
            Some(&index) => self.services[index] = descriptor,
            None => {
                self.by_name
                    .insert(descriptor.name.clone(), self.services.len());
                self.services.push(descriptor);
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Arc<ServiceDescriptor>> {
        self.by_name.get(name).map(|&index| &self.services[index])
    }

    /// Services in registration order.
    pub fn services(&self) -> impl Iterator<Item = &Arc<ServiceDescriptor>> {
        self.services.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

fn build_descriptor(config: &ServiceConfig) -> Result<ServiceDescriptor, RegistryError> {
    let base_url = Url::parse(&config.base_url).map_err(|source| RegistryError::InvalidBaseUrl {
        service: config.name.clone(),
        url: config.base_url.clone(),
        source,
    })?;

    let namespace = config
        .namespace
        .clone()
        .unwrap_or_default()
        .trim_end_matches('/')
        .to_string();

    let mut routes = Vec::with_capacity(config.routes.len());
    for route in &config.routes {
        routes.push(build_route(&config.name, route)?);
    }

    Ok(ServiceDescriptor {
        name: config.name.clone(),
        base_url,
        namespace,
        routes,
    })
}

fn build_route(service: &str, config: &RouteConfig) -> Result<RouteSpec, RegistryError> {
    let mut methods = Vec::with_capacity(config.methods.len());
    for name in &config.methods {
        let method = match name.to_ascii_uppercase().as_str() {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            other => {
                return Err(RegistryError::UnsupportedMethod {
                    service: service.to_string(),
                    method: other.to_string(),
                })
            }
        };
        methods.push(method);
    }

    Ok(RouteSpec {
        public_prefix: config.public_prefix.clone(),
        upstream_path: config.upstream_path.clone(),
        methods,
        redact: config.redact,
        require_param: config.require_param.clone(),
        admin: config.admin,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str, base_url: &str) -> ServiceDescriptor {
        ServiceDescriptor {
            name: name.to_string(),
            base_url: Url::parse(base_url).unwrap(),
            namespace: String::new(),
            routes: Vec::new(),
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ServiceRegistry::new();
        registry.register(descriptor("angkor", "http://127.0.0.1:5000"));
        registry.register(descriptor("json", "https://jsonplaceholder.typicode.com"));

        assert_eq!(registry.lookup("angkor").unwrap().name, "angkor");
        assert!(registry.lookup("missing").is_none());
    }

    #[test]
    fn test_register_is_idempotent_by_name() {
        let mut registry = ServiceRegistry::new();
        registry.register(descriptor("angkor", "http://127.0.0.1:5000"));
        registry.register(descriptor("json", "http://127.0.0.1:6000"));
        registry.register(descriptor("angkor", "http://127.0.0.1:7000"));

        // Replaced in place, order preserved.
        let names: Vec<_> = registry.services().map(|s| s.name.clone()).collect();
        assert_eq!(names, vec!["angkor", "json"]);
        assert_eq!(
            registry.lookup("angkor").unwrap().base_url.as_str(),
            "http://127.0.0.1:7000/"
        );
    }

    #[test]
    fn test_from_config_rejects_bad_method() {
        let config = ServiceConfig {
            name: "svc".into(),
            base_url: "http://127.0.0.1:5000".into(),
            namespace: None,
            routes: vec![RouteConfig {
                public_prefix: "/api/thing".into(),
                upstream_path: "/api/thing".into(),
                methods: vec!["PATCH".into()],
                redact: false,
                require_param: None,
                admin: false,
            }],
        };
        assert!(matches!(
            ServiceRegistry::from_config(std::slice::from_ref(&config)),
            Err(RegistryError::UnsupportedMethod { .. })
        ));
    }
}
