//! Lifecycle management.
//!
//! Startup order is config → registry → server → listener; shutdown is
//! signal → stop accepting → drain in-flight requests. Integration tests
//! drive the same `Shutdown` coordinator the binary uses.

pub mod shutdown;

pub use shutdown::Shutdown;
