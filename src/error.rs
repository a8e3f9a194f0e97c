//! Gateway error taxonomy.
//!
//! # Responsibilities
//! - Classify routing and upstream failures into a fixed set of kinds
//! - Map each kind to exactly one HTTP status
//! - Serialize every error with the same JSON shape
//!
//! # Design Decisions
//! - One terminal response per request: every failure path ends here
//! - Upstream error bodies are forwarded verbatim, never invented; a
//!   `GatewayError` is only produced when there is no upstream body to
//!   forward
//! - Client sees a short message, never a raw exception dump

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde_json::json;

use crate::routing::RouteFailure;

/// Fixed set of gateway error kinds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    #[error("not found")]
    NotFound,
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("missing parameter")]
    MissingParameter,
    #[error("unauthorized")]
    Unauthorized,
    #[error("upstream unavailable")]
    UpstreamUnavailable,
    #[error("upstream timeout")]
    UpstreamTimeout,
    #[error("upstream bad status")]
    UpstreamBadStatus(u16),
    #[error("internal error")]
    Internal,
}

/// A classified, client-facing gateway error.
///
/// Always serialized as `{"error": ..., "timestamp": ..., ...context}`
/// regardless of kind.
#[derive(Debug)]
pub struct GatewayError {
    pub kind: ErrorKind,
    pub message: String,
    /// Logical upstream service involved, when known.
    pub service: Option<String>,
}

impl GatewayError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            service: None,
        }
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn not_found(path: &str) -> Self {
        Self::new(ErrorKind::NotFound, format!("No route for path '{path}'"))
    }

    pub fn missing_parameter(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingParameter, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(ErrorKind::Unauthorized, "Valid admin credential required")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn upstream_unavailable(service: &str, detail: &str) -> Self {
        Self::new(
            ErrorKind::UpstreamUnavailable,
            format!("Cannot connect to upstream service: {detail}"),
        )
        .with_service(service)
    }

    pub fn upstream_timeout(service: &str) -> Self {
        Self::new(
            ErrorKind::UpstreamTimeout,
            "Upstream service did not respond in time",
        )
        .with_service(service)
    }

    /// Classify a routing failure. 404 and 405 must stay distinct.
    pub fn from_route_failure(failure: RouteFailure, path: &str) -> Self {
        match failure {
            RouteFailure::NotFound => Self::not_found(path),
            RouteFailure::MethodNotAllowed { allowed } => {
                let allowed = allowed
                    .iter()
                    .map(|m| m.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                Self::new(
                    ErrorKind::MethodNotAllowed,
                    format!("Method not allowed for '{path}' (allowed: {allowed})"),
                )
            }
        }
    }

    /// HTTP status for this error's kind.
    pub fn status(&self) -> StatusCode {
        match self.kind {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ErrorKind::MissingParameter => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::UpstreamUnavailable => StatusCode::BAD_GATEWAY,
            ErrorKind::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            ErrorKind::UpstreamBadStatus(code) => {
                StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut body = json!({
            "error": self.message,
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        });
        if let Some(service) = &self.service {
            body["service"] = json!(service);
        }
        (status, Json(body)).into_response()
    }
}
