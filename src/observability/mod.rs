//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging via `tracing`, initialized once in main
//! - Request ID generated at the edge and propagated to upstream calls
//! - Metric updates are cheap (atomic increments behind the `metrics`
//!   facade); the Prometheus exporter is optional

pub mod metrics;
