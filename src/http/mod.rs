//! HTTP surface of the gateway.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → server.rs (axum setup, middleware, table-driven proxy handler)
//!     → routing (resolve public path → upstream target)
//!     → forward (one upstream call, bounded deadline)
//!     → transform (metadata injection, redaction)
//!     → response (or a classified GatewayError)
//!
//! handlers.rs owns the non-table endpoints: catalog, multi-query search
//! aggregation, universal passthrough proxy.
//! ```

pub mod handlers;
pub mod server;

pub use server::{AppState, HttpServer};
