//! Upstream forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! RouteTarget + ProxyRequest
//!     → forwarder.rs (build upstream URL, apply header policy, send)
//!     → outcome.rs (classify: Success / UpstreamStatus / Timeout /
//!                   ConnectionFailure / DecodeFailure)
//!     → consumed by the response pipeline or the error classifier
//! ```
//!
//! # Design Decisions
//! - Exactly one attempt per call; retries are not this gateway's business
//!   (upstream operations are not guaranteed idempotent)
//! - The per-call deadline is the only cancellation signal
//! - Bodies are forwarded as raw bytes, byte-identical

pub mod forwarder;
pub mod outcome;

pub use forwarder::{Forwarder, ProxyRequest};
pub use outcome::{Outcome, Payload};
