//! Response transformation pipeline.
//!
//! # Data Flow
//! ```text
//! Payload (from a Success or UpstreamStatus outcome)
//!     → metadata.rs (inject `_proxy` into JSON objects)
//!     → redact.rs   (strip sensitive fields, redact-flagged routes only)
//!     → pass-through (text / empty / non-object JSON unchanged)
//! ```
//!
//! # Design Decisions
//! - Stages are pure functions over the tagged payload; order is fixed
//! - Non-object JSON and text bodies are never mutated

pub mod metadata;
pub mod redact;

pub use metadata::{inject_metadata, ProxyMetadata, METADATA_KEY};
pub use redact::{redact_sensitive, REDACTION_SENTINEL};

use crate::forward::Payload;

/// Apply the pipeline to one upstream body.
pub fn transform(payload: Payload, meta: &ProxyMetadata, redact: bool) -> Payload {
    match payload {
        Payload::Json(mut value) => {
            inject_metadata(&mut value, meta);
            if redact {
                redact_sensitive(&mut value);
            }
            Payload::Json(value)
        }
        other => other,
    }
}
