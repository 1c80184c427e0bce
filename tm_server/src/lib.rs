//! Tournament sign-up HTTP server.
//!
//! The binary in `main.rs` wires configuration, logging, metrics and storage
//! around the router built in [`api`].

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
