//! Unified HTTP gateway library.
//!
//! A table-driven gateway in front of one or more upstream HTTP services:
//! stable namespaced public API, hidden upstream addresses, normalized
//! error shapes, optional redaction of sensitive response fields.

pub mod admin;
pub mod config;
pub mod error;
pub mod forward;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod registry;
pub mod routing;
pub mod transform;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
