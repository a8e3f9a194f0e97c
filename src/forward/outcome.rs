//! Result of one upstream call, before translation into a client response.

use axum::http::{HeaderMap, StatusCode};
use serde_json::Value;

/// Decoded upstream body.
///
/// Tagged so downstream stages pattern-match instead of probing types at
/// runtime: JSON bodies are transformable, text and empty bodies pass
/// through untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Text(String),
    Empty,
}

impl Payload {
    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }
}

/// Everything one upstream call can produce. Produced once per
/// `Forwarder` call and consumed immediately.
#[derive(Debug)]
pub enum Outcome {
    /// Upstream answered 2xx.
    Success {
        status: StatusCode,
        headers: HeaderMap,
        body: Payload,
    },
    /// Upstream answered, but not 2xx. Its body is carried unmodified; the
    /// gateway does not invent upstream error bodies.
    UpstreamStatus { status: StatusCode, body: Payload },
    /// Deadline exceeded before a complete response arrived.
    Timeout,
    /// Connect or DNS level failure; no response was received.
    ConnectionFailure { detail: String },
    /// Upstream claimed `application/json` but the body did not parse. The
    /// raw text is kept so the caller can still forward it as plain text.
    DecodeFailure { status: StatusCode, raw: String },
}
