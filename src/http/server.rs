//! HTTP server setup and the table-driven proxy handler.
//!
//! # Responsibilities
//! - Create the axum router with all handlers
//! - Wire up middleware (timeout, request ID, tracing, CORS, body limit)
//! - Dispatch table-routed requests: resolve → validate → forward →
//!   transform → respond
//! - Graceful shutdown via the lifecycle coordinator
//!
//! # Design Decisions
//! - Every inbound request produces exactly one terminal response: either
//!   a (possibly transformed) upstream body or a classified GatewayError
//! - Router and parameter/credential failures are resolved locally and
//!   never reach the Forwarder
//! - CORS and the identification header are static layers, not handler
//!   logic

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router as AxumRouter,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin;
use crate::config::GatewayConfig;
use crate::error::{ErrorKind, GatewayError};
use crate::forward::{Forwarder, Outcome, Payload, ProxyRequest};
use crate::http::handlers;
use crate::observability::metrics;
use crate::registry::{RegistryError, RouteSpec, ServiceRegistry};
use crate::routing::Router;
use crate::transform::{transform, ProxyMetadata};

/// Application state injected into handlers. Cheap to clone; the registry
/// behind the router is the only shared structure and it is read-only.
#[derive(Clone)]
pub struct AppState {
    pub router: Router,
    pub forwarder: Forwarder,
    pub config: Arc<GatewayConfig>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    app: AxumRouter,
    bind_address: String,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, RegistryError> {
        let registry = Arc::new(ServiceRegistry::from_config(&config.services)?);
        let router = Router::new(registry);
        let forwarder = Forwarder::new(Duration::from_secs(config.timeouts.upstream_secs));

        let bind_address = config.listener.bind_address.clone();
        let config = Arc::new(config);
        let state = AppState {
            router,
            forwarder,
            config: Arc::clone(&config),
        };
        let app = build_router(&config, state);
        Ok(Self { app, bind_address })
    }

    pub fn bind_address(&self) -> &str {
        &self.bind_address
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.app.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the axum router with all middleware layers.
fn build_router(config: &GatewayConfig, state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/", get(handlers::catalog))
        .route("/api/search", post(handlers::search))
        .route("/api/proxy", get(handlers::universal_proxy))
        .route("/{*path}", any(proxy_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.timeouts.request_secs,
                )))
                .layer(cors_layer())
                .layer(SetResponseHeaderLayer::overriding(
                    header::HeaderName::from_static("x-proxy-server"),
                    HeaderValue::from_static("unified-gateway"),
                ))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}

/// Static CORS policy applied to every response, preflight included.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::HeaderName::from_static("x-requested-with"),
            header::HeaderName::from_static("x-admin-key"),
        ])
}

/// Table-driven proxy handler: every path not claimed by a dedicated
/// endpoint lands here.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let path = uri.path().to_string();

    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, state.config.listener.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(_) => {
            let err = GatewayError::internal("Failed to read request body");
            return respond_error(err, &method, "none", start);
        }
    };
    let proxy_request = ProxyRequest::from_parts(method.clone(), &uri, parts.headers, body);

    // 1. Resolve route
    let target = match state.router.resolve(&path, &method) {
        Ok(target) => target,
        Err(failure) => {
            tracing::debug!(path = %path, method = %method, "No route matched");
            let err = GatewayError::from_route_failure(failure, &path);
            return respond_error(err, &method, "none", start);
        }
    };
    let service = target.service.name.clone();

    tracing::debug!(
        method = %method,
        path = %path,
        service = %service,
        upstream_path = %target.upstream_path,
        "Proxying request"
    );

    // 2. Local validations, before any upstream call
    if let Err(err) = check_required_param(&target.route, &proxy_request) {
        return respond_error(err, &method, &service, start);
    }
    if target.route.admin
        && !admin::verify_admin_key(&state.config.admin.api_key, &proxy_request)
    {
        tracing::warn!(path = %path, "Admin credential missing or wrong");
        return respond_error(GatewayError::unauthorized(), &method, &service, start);
    }

    // 3. Forward
    let outcome = state
        .forwarder
        .forward(&target.service.base_url, &target.upstream_path, &proxy_request)
        .await;

    // 4. Transform and respond. The upstream address stays hidden: no
    // upstream_url in metadata for registered routes.
    let meta = ProxyMetadata::new(&service);
    respond_outcome(outcome, target.route.redact, &meta, &method, &service, start)
}

/// Reject early when a route's required parameter is absent or empty:
/// query param on GET, JSON body field otherwise.
fn check_required_param(route: &RouteSpec, request: &ProxyRequest) -> Result<(), GatewayError> {
    let Some(param) = &route.require_param else {
        return Ok(());
    };

    let value = if request.method == Method::GET {
        request.query_value(param).map(str::to_string)
    } else {
        serde_json::from_slice::<Value>(&request.body)
            .ok()
            .and_then(|body| body.get(param).and_then(Value::as_str).map(String::from))
    };

    match value {
        Some(v) if !v.is_empty() => Ok(()),
        _ => Err(GatewayError::missing_parameter(format!(
            "Parameter '{param}' is required and must not be empty"
        ))),
    }
}

/// Translate an `Outcome` into the one terminal response.
pub(crate) fn respond_outcome(
    outcome: Outcome,
    redact: bool,
    meta: &ProxyMetadata,
    method: &Method,
    service: &str,
    start: Instant,
) -> Response {
    match outcome {
        Outcome::Success { status, body, .. } => {
            let body = transform(body, meta, redact);
            respond_payload(status, body, method, service, start)
        }
        Outcome::UpstreamStatus { status, body } => {
            if body.is_empty() {
                // Nothing to forward; synthesize the uniform error shape.
                let err = GatewayError::new(
                    ErrorKind::UpstreamBadStatus(status.as_u16()),
                    format!("Upstream service returned status {}", status.as_u16()),
                )
                .with_service(service);
                return respond_error(err, method, service, start);
            }
            let body = transform(body, meta, redact);
            respond_payload(status, body, method, service, start)
        }
        Outcome::Timeout => {
            metrics::record_upstream_failure(service, "timeout");
            respond_error(GatewayError::upstream_timeout(service), method, service, start)
        }
        Outcome::ConnectionFailure { detail } => {
            metrics::record_upstream_failure(service, "connect");
            tracing::error!(service = %service, detail = %detail, "Upstream unavailable");
            respond_error(
                GatewayError::upstream_unavailable(service, &detail),
                method,
                service,
                start,
            )
        }
        Outcome::DecodeFailure { status, raw } => {
            // Upstream claimed JSON but sent something else; forward it as
            // text instead of failing the whole request.
            metrics::record_request(method.as_str(), status.as_u16(), service, start);
            (
                status,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                raw,
            )
                .into_response()
        }
    }
}

fn respond_payload(
    status: StatusCode,
    payload: Payload,
    method: &Method,
    service: &str,
    start: Instant,
) -> Response {
    metrics::record_request(method.as_str(), status.as_u16(), service, start);
    match payload {
        Payload::Json(value) => (status, Json(value)).into_response(),
        Payload::Text(text) => (status, text).into_response(),
        Payload::Empty => status.into_response(),
    }
}

pub(crate) fn respond_error(
    err: GatewayError,
    method: &Method,
    service: &str,
    start: Instant,
) -> Response {
    metrics::record_request(method.as_str(), err.status().as_u16(), service, start);
    err.into_response()
}
