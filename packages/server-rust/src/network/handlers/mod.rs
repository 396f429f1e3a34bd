//! HTTP handler definitions for the hook server.

pub mod health;
pub mod hook;

pub use health::liveness_handler;
pub use hook::hook_endpoint;
