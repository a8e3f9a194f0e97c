//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! gateway. All types derive Serde traits for deserialization from config
//! files; every section has defaults so a minimal config works.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Upstream services and their public route tables.
    pub services: Vec<ServiceConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Multi-query search aggregation settings.
    pub search: SearchConfig,

    /// Admin shared secret.
    pub admin: AdminConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// One upstream service: base URL plus the routes it exposes publicly.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Logical service name, unique across the config.
    pub name: String,

    /// Absolute base URL of the upstream (e.g., "http://127.0.0.1:5000").
    pub base_url: String,

    /// Public mount prefix for this service's routes, e.g. "/api/json".
    /// Omitted = mounted at the bare root.
    #[serde(default)]
    pub namespace: Option<String>,

    /// Route table, in priority order (first registered wins ties).
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

/// One public route of a service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Public path prefix within the namespace, e.g. "/api/check".
    pub public_prefix: String,

    /// Upstream path substituted for the matched prefix.
    pub upstream_path: String,

    /// Allowed methods (GET/POST/PUT/DELETE).
    #[serde(default = "default_methods")]
    pub methods: Vec<String>,

    /// Redact sensitive fields from the response body.
    #[serde(default)]
    pub redact: bool,

    /// Parameter that must be present and non-empty before forwarding.
    #[serde(default)]
    pub require_param: Option<String>,

    /// Require the admin shared secret before forwarding.
    #[serde(default)]
    pub admin: bool,
}

fn default_methods() -> Vec<String> {
    vec!["GET".to_string()]
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Per-call deadline for one upstream request, in seconds.
    pub upstream_secs: u64,

    /// Deadline for a whole multi-query batch, in seconds.
    pub batch_secs: u64,

    /// Total inbound request timeout, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            upstream_secs: 10,
            batch_secs: 15,
            request_secs: 30,
        }
    }
}

/// Multi-query search aggregation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Hard cap on queries per batch; exceeding it is a client error.
    pub max_queries: usize,

    /// Public route each individual query is resolved through.
    pub query_route: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_queries: 20,
            query_route: "/api/check".to_string(),
        }
    }
}

/// Admin shared secret for admin-flagged routes.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AdminConfig {
    /// Expected value of the X-Admin-Key header (or admin_key param).
    /// Empty = admin routes are rejected outright.
    pub api_key: String,
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable the Prometheus metrics exporter.
    pub metrics_enabled: bool,

    /// Metrics exporter bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
