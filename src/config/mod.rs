//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → registry + server built once from it at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the only runtime "reload" the
//!   gateway exposes is the admin route delegated to the upstream
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AdminConfig, GatewayConfig, ListenerConfig, ObservabilityConfig, RouteConfig, SearchConfig,
    ServiceConfig, TimeoutConfig,
};
