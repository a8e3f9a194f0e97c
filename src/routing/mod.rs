//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound (path, method)
//!     → router.rs (scan registry namespaces + route tables)
//!     → matcher.rs (segment-aligned prefix checks)
//!     → Return: RouteTarget (service + rewritten upstream path)
//!               or RouteFailure (NotFound / MethodNotAllowed)
//! ```
//!
//! # Design Decisions
//! - Registry is compiled before serving, immutable at runtime
//! - No regex in the hot path (prefix matching only)
//! - Longest prefix wins; ties broken by registration order
//! - Method mismatch on a matched route is 405, never 404

pub mod matcher;
pub mod router;

pub use router::{RouteFailure, RouteTarget, Router};
