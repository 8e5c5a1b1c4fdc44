//! DNS resolution.
//!
//! This module provides the bounded-retry resolver used by the zone engine and
//! the scanners:
//! - A [`DnsTransport`] seam sending exactly one query per call
//! - [`HickoryTransport`], the network transport over `hickory-resolver`
//! - [`DnsResolver`], retrying only timed-out queries and classifying
//!   response codes into [`crate::error_handling::ResolveError`]

mod resolver;
mod transport;

// Re-export public API
pub use resolver::{response_code_name, DnsResolver, Resolve};
pub use transport::{Answer, DnsTransport, HickoryTransport, QueryResponse, TransportError};
pub use crate::error_handling::ResolveError;

/// Response codes, re-exported for transports implemented outside this module.
pub use hickory_resolver::proto::op::ResponseCode;
