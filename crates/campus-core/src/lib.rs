//! Ambient service plumbing shared by every campus service.
//!
//! Error envelope, health probes, request-id middleware, identity extraction,
//! env-based config loading and tracing setup.

pub mod config;
pub mod error;
pub mod health;
pub mod identity;
pub mod middleware;
pub mod serde;
pub mod tracing;
