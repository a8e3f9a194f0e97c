//! Admin credential gate for admin-flagged routes.
//!
//! The gateway performs exactly one shared-secret check before forwarding;
//! the actual admin operation (e.g. database reload) is the upstream's
//! business.

pub mod auth;

pub use auth::{verify_admin_key, ADMIN_KEY_HEADER, ADMIN_KEY_PARAM};
