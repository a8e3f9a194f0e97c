//! Semantic configuration checks, separated from serde's syntactic ones.

use url::Url;

use crate::config::schema::GatewayConfig;

const SUPPORTED_METHODS: [&str; 4] = ["GET", "POST", "PUT", "DELETE"];

/// A single semantic problem with a config. All problems are collected
/// rather than stopping at the first.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("service name must not be empty")]
    EmptyServiceName,
    #[error("duplicate service name '{0}'")]
    DuplicateService(String),
    #[error("service '{service}': base_url '{url}' is not an absolute http(s) URL")]
    InvalidBaseUrl { service: String, url: String },
    #[error("service '{service}': namespace '{namespace}' must start with '/'")]
    BadNamespace { service: String, namespace: String },
    #[error("service '{service}': route prefix '{prefix}' must start with '/'")]
    BadPrefix { service: String, prefix: String },
    #[error("service '{service}': upstream path '{path}' must start with '/'")]
    BadUpstreamPath { service: String, path: String },
    #[error("service '{service}': route '{prefix}' declares no methods")]
    NoMethods { service: String, prefix: String },
    #[error("service '{service}': unsupported method '{method}'")]
    UnsupportedMethod { service: String, method: String },
    #[error("admin routes configured but admin.api_key is empty")]
    MissingAdminKey,
    #[error("timeouts.batch_secs must be at least timeouts.upstream_secs")]
    BatchBelowUpstream,
    #[error("search.max_queries must be at least 1")]
    ZeroMaxQueries,
}

/// Validate a deserialized config. Returns every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen_names = std::collections::HashSet::new();
    let mut any_admin_route = false;

    for service in &config.services {
        if service.name.is_empty() {
            errors.push(ValidationError::EmptyServiceName);
        } else if !seen_names.insert(service.name.as_str()) {
            errors.push(ValidationError::DuplicateService(service.name.clone()));
        }

        match Url::parse(&service.base_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            _ => errors.push(ValidationError::InvalidBaseUrl {
                service: service.name.clone(),
                url: service.base_url.clone(),
            }),
        }

        if let Some(namespace) = &service.namespace {
            if !namespace.is_empty() && !namespace.starts_with('/') {
                errors.push(ValidationError::BadNamespace {
                    service: service.name.clone(),
                    namespace: namespace.clone(),
                });
            }
        }

        for route in &service.routes {
            if !route.public_prefix.starts_with('/') {
                errors.push(ValidationError::BadPrefix {
                    service: service.name.clone(),
                    prefix: route.public_prefix.clone(),
                });
            }
            if !route.upstream_path.starts_with('/') {
                errors.push(ValidationError::BadUpstreamPath {
                    service: service.name.clone(),
                    path: route.upstream_path.clone(),
                });
            }
            if route.methods.is_empty() {
                errors.push(ValidationError::NoMethods {
                    service: service.name.clone(),
                    prefix: route.public_prefix.clone(),
                });
            }
            for method in &route.methods {
                if !SUPPORTED_METHODS.contains(&method.to_ascii_uppercase().as_str()) {
                    errors.push(ValidationError::UnsupportedMethod {
                        service: service.name.clone(),
                        method: method.clone(),
                    });
                }
            }
            any_admin_route |= route.admin;
        }
    }

    if any_admin_route && config.admin.api_key.is_empty() {
        errors.push(ValidationError::MissingAdminKey);
    }
    if config.timeouts.batch_secs < config.timeouts.upstream_secs {
        errors.push(ValidationError::BatchBelowUpstream);
    }
    if config.search.max_queries == 0 {
        errors.push(ValidationError::ZeroMaxQueries);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
