//! HTTP client initialization.
//!
//! Two clients are used: one for takeover probes, which must see certificate
//! failures to classify them, and one for liveness fetches, which only cares
//! whether anything answers.

use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::{FETCH_TIMEOUT_SECS, PROBE_MAX_REDIRECTS, PROBE_TIMEOUT_SECS};
use crate::error_handling::InitializationError;

/// Builder for the takeover scan HTTP client.
///
/// Short timeout with certificate verification on. Redirects are followed,
/// so an http to https hop reaches the TLS endpoint and its handshake or
/// certificate failure can be classified.
pub fn probe_client_builder() -> ClientBuilder {
    ClientBuilder::new()
        .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::limited(PROBE_MAX_REDIRECTS))
        .user_agent(concat!("zone_warden/", env!("CARGO_PKG_VERSION")))
}

/// Initializes the HTTP client for takeover probes.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_probe_client() -> Result<reqwest::Client, InitializationError> {
    let client = probe_client_builder().build()?;
    Ok(client)
}

/// Initializes the HTTP client for liveness fetches.
///
/// Certificates are not verified: the answer is only used to decide whether a
/// host is serving, never to trust it.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_liveness_client() -> Result<reqwest::Client, InitializationError> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .danger_accept_invalid_certs(true)
        .user_agent(concat!("zone_warden/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}
