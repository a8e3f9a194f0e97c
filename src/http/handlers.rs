//! Non-table endpoints: catalog, multi-query search, universal proxy.
//!
//! # Responsibilities
//! - `GET /` catalog built from the registry
//! - `POST /api/search` bounded fan-out over the single-query route
//! - `GET /api/proxy?url=` registry-bypassing passthrough
//!
//! # Design Decisions
//! - Search sub-calls run concurrently; results keep input order and a
//!   failed sub-call becomes an embedded marker, never aborting the batch
//! - The universal proxy trusts its caller (authenticated upstream of this
//!   core) and only validates URL shape

use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, Request},
    response::{IntoResponse, Response},
    Json,
};
use axum::body::Body;
use chrono::{SecondsFormat, Utc};
use futures_util::future::join_all;
use serde_json::{json, Value};
use url::Url;

use crate::error::GatewayError;
use crate::forward::{Outcome, Payload, ProxyRequest};
use crate::http::server::{respond_error, respond_outcome, AppState};
use crate::routing::RouteTarget;
use crate::transform::{transform, ProxyMetadata};

/// `GET /` — gateway and upstream service catalog.
pub async fn catalog(State(state): State<AppState>) -> Response {
    let start = Instant::now();

    let mut services = serde_json::Map::new();
    for service in state.router.registry().services() {
        services.insert(
            service.name.clone(),
            json!({
                "base_url": service.base_url.as_str().trim_end_matches('/'),
                "namespace": if service.namespace.is_empty() { "/" } else { service.namespace.as_str() },
                "endpoints": service
                    .routes
                    .iter()
                    .map(|r| r.public_prefix.as_str())
                    .collect::<Vec<_>>(),
            }),
        );
    }

    let body = json!({
        "api": "Unified HTTPS Gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "operational",
        "available_services": services,
        "endpoints": {
            "/": "This information",
            "/api/search": "Search multiple queries (POST)",
            "/api/proxy": "Universal proxy (GET, 'url' parameter)",
        },
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
    });

    crate::observability::metrics::record_request("GET", 200, "gateway", start);
    Json(body).into_response()
}

/// `POST /api/search` — fan out up to `max_queries` independent
/// single-query calls and aggregate in input order.
pub async fn search(State(state): State<AppState>, body: Bytes) -> Response {
    let start = Instant::now();

    let queries = match parse_queries(&body) {
        Ok(queries) => queries,
        Err(err) => return respond_error(err, &Method::POST, "search", start),
    };

    let max = state.config.search.max_queries;
    if queries.len() > max {
        let err = GatewayError::missing_parameter(format!(
            "Maximum {max} queries allowed per request"
        ));
        return respond_error(err, &Method::POST, "search", start);
    }

    // The batch rides the same route table as a single query.
    let target = match state
        .router
        .resolve(&state.config.search.query_route, &Method::GET)
    {
        Ok(target) => target,
        Err(_) => {
            let err = GatewayError::internal("Search is not configured on this gateway");
            return respond_error(err, &Method::POST, "search", start);
        }
    };

    let batch_deadline = Duration::from_secs(state.config.timeouts.batch_secs);
    let calls = queries
        .iter()
        .map(|query| run_query(&state, &target, query.clone()));

    let results = match tokio::time::timeout(batch_deadline, join_all(calls)).await {
        Ok(results) => results,
        Err(_) => {
            let err = GatewayError::upstream_timeout(&target.service.name);
            return respond_error(err, &Method::POST, "search", start);
        }
    };

    let processed = results.iter().filter(|(ok, _)| *ok).count();
    let values: Vec<Value> = results.into_iter().map(|(_, value)| value).collect();
    let total_queries = values.len();

    let body = json!({
        "results": values,
        "total_queries": total_queries,
        "processed": processed,
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
    });
    crate::observability::metrics::record_request("POST", 200, "search", start);
    Json(body).into_response()
}

fn parse_queries(body: &Bytes) -> Result<Vec<String>, GatewayError> {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.get("queries").cloned())
        .and_then(|q| serde_json::from_value::<Vec<String>>(q).ok())
        .ok_or_else(|| {
            GatewayError::missing_parameter("Field 'queries' (list of strings) is required")
        })
}

/// One sub-call of the batch. Returns (succeeded, result element); failures
/// are embedded markers so the batch never aborts.
async fn run_query(state: &AppState, target: &RouteTarget, query: String) -> (bool, Value) {
    let param = target.route.require_param.as_deref().unwrap_or("query");
    let request = ProxyRequest::new(Method::GET).with_query(param, query.clone());

    let outcome = state
        .forwarder
        .forward(&target.service.base_url, &target.upstream_path, &request)
        .await;

    match outcome {
        Outcome::Success { body, .. } => {
            let meta = ProxyMetadata::new(&target.service.name);
            match transform(body, &meta, target.route.redact) {
                Payload::Json(value) => (true, value),
                Payload::Text(text) => (true, json!({ "query": query, "data": text })),
                Payload::Empty => (true, json!({ "query": query })),
            }
        }
        Outcome::UpstreamStatus { status, .. } => (
            false,
            json!({
                "query": query,
                "error": format!("Upstream returned status {}", status.as_u16()),
            }),
        ),
        Outcome::Timeout => (
            false,
            json!({ "query": query, "error": "Upstream timeout" }),
        ),
        Outcome::ConnectionFailure { detail } => (
            false,
            json!({ "query": query, "error": format!("Upstream unavailable: {detail}") }),
        ),
        Outcome::DecodeFailure { .. } => (
            false,
            json!({ "query": query, "error": "Upstream returned an undecodable body" }),
        ),
    }
}

/// `GET /api/proxy?url=<absolute-url>` — deliberately unconstrained
/// escape hatch that bypasses the registry.
pub async fn universal_proxy(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let uri = request.uri().clone();
    let inbound =
        ProxyRequest::from_parts(Method::GET, &uri, request.headers().clone(), Bytes::new());

    let Some(raw_url) = inbound.query_value("url") else {
        let err = GatewayError::missing_parameter("Query parameter 'url' is required");
        return respond_error(err, &Method::GET, "proxy", start);
    };

    let url = match Url::parse(raw_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url,
        _ => {
            let err = GatewayError::missing_parameter(
                "Parameter 'url' must be an absolute http(s) URL",
            );
            return respond_error(err, &Method::GET, "proxy", start);
        }
    };

    // The target URL carries its own query; nothing else is forwarded.
    let outgoing = ProxyRequest {
        method: Method::GET,
        query: Vec::new(),
        headers: inbound.headers.clone(),
        body: Bytes::new(),
    };

    let outcome = state.forwarder.forward_url(url.clone(), &outgoing).await;
    let meta = ProxyMetadata::new("proxy").with_upstream_url(url.as_str());
    respond_outcome(outcome, false, &meta, &Method::GET, "proxy", start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_queries_accepts_list() {
        let body = Bytes::from(r#"{"queries": ["a@b.com", "c@d.com"]}"#);
        assert_eq!(parse_queries(&body).unwrap(), vec!["a@b.com", "c@d.com"]);
    }

    #[test]
    fn test_parse_queries_accepts_empty_list() {
        let body = Bytes::from(r#"{"queries": []}"#);
        assert_eq!(parse_queries(&body).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_parse_queries_rejects_missing_field() {
        assert!(parse_queries(&Bytes::from(r#"{}"#)).is_err());
        assert!(parse_queries(&Bytes::from("not json")).is_err());
        assert!(parse_queries(&Bytes::from(r#"{"queries": "one"}"#)).is_err());
    }
}
