//! Application initialization and resource setup.
//!
//! This module provides functions to initialize the shared resources of a
//! command:
//! - Logger
//! - DNS resolver
//! - HTTP clients for takeover probes and liveness fetches
//!
//! All initialization functions return proper error types for error handling.

mod client;
mod logger;
mod resolver;

// Re-export public API
pub use client::{init_liveness_client, init_probe_client, probe_client_builder};
pub use logger::init_logger_with;
pub use resolver::{init_resolver, ResolverOptions};
