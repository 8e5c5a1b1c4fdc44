//! HTTP probes for dangling object-storage and CDN references.

use std::error::Error as StdError;

use async_trait::async_trait;
use log::debug;
use reqwest::StatusCode;
use thiserror::Error;

use crate::config::{NO_SUCH_BUCKET_MARKER, PROBE_MAX_ATTEMPTS};
use crate::domain::denormalize_domain;
use crate::utils::RetryPolicy;

/// Classified probe failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("SSL not configured")]
    SslNotConfigured,

    #[error("Invalid SSL certificate")]
    InvalidCertificate,

    #[error("No such host")]
    NoSuchHost,

    #[error("Forbidden")]
    Forbidden,

    #[error("probe timed out")]
    Timeout,

    /// Anything not worth reporting.
    #[error("{0}")]
    Other(String),
}

impl ProbeError {
    /// The misconfiguration this failure reveals, if any.
    pub fn misconfiguration(&self) -> Option<String> {
        match self {
            ProbeError::SslNotConfigured
            | ProbeError::InvalidCertificate
            | ProbeError::NoSuchHost
            | ProbeError::Forbidden => Some(self.to_string()),
            ProbeError::Timeout | ProbeError::Other(_) => None,
        }
    }
}

/// Probes a hostname for a missing storage bucket.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Returns `true` if `host` answers 404 with the missing-bucket marker.
    async fn missing_bucket(&self, host: &str) -> Result<bool, ProbeError>;
}

// Checked in order: certificate failures also mention the handshake.
const CERTIFICATE_SIGNATURES: &[&str] = &[
    "certificate verify failed",
    "failed to verify certificate",
    "invalid peer certificate",
    "unknownissuer",
    "self signed certificate",
    "certificate has expired",
];
const HANDSHAKE_SIGNATURES: &[&str] = &[
    "handshake failure",
    "handshakefailure",
    "ssl handshake",
    "tls handshake",
    // A TLS client talking to a plain HTTP listener.
    "wrong version number",
    "invalidcontenttype",
    "first record does not look like a tls handshake",
];
const DNS_SIGNATURES: &[&str] = &[
    "no such host",
    "dns error",
    "failed to lookup address",
    "name or service not known",
    "nodename nor servname",
];

/// Classifies a transport error message by its signature.
pub fn classify_error_message(message: &str) -> ProbeError {
    let message = message.to_lowercase();
    let matches = |signatures: &[&str]| signatures.iter().any(|s| message.contains(s));

    if matches(CERTIFICATE_SIGNATURES) {
        ProbeError::InvalidCertificate
    } else if matches(HANDSHAKE_SIGNATURES) {
        ProbeError::SslNotConfigured
    } else if matches(DNS_SIGNATURES) {
        ProbeError::NoSuchHost
    } else {
        ProbeError::Other(message)
    }
}

/// Renders an error with its whole source chain.
fn error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![error.to_string()];
    let mut source = error.source();
    while let Some(cause) = source {
        parts.push(cause.to_string());
        source = cause.source();
    }
    parts.join(": ")
}

fn classify_reqwest_error(error: &reqwest::Error) -> ProbeError {
    if error.is_timeout() {
        return ProbeError::Timeout;
    }
    classify_error_message(&error_chain(error))
}

/// [`Prober`] issuing plain HTTP GETs with `reqwest`.
pub struct ReqwestProber {
    client: reqwest::Client,
    policy: RetryPolicy,
}

impl ReqwestProber {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            policy: RetryPolicy::immediate(PROBE_MAX_ATTEMPTS),
        }
    }
}

#[async_trait]
impl Prober for ReqwestProber {
    async fn missing_bucket(&self, host: &str) -> Result<bool, ProbeError> {
        let url = format!("http://{}", denormalize_domain(host));
        let response = self
            .policy
            .retry_if(|| self.client.get(&url).send(), reqwest::Error::is_timeout)
            .await
            .map_err(|e| {
                debug!("Probe of {url} failed: {e}");
                classify_reqwest_error(&e)
            })?;

        match response.status() {
            StatusCode::FORBIDDEN => Err(ProbeError::Forbidden),
            StatusCode::NOT_FOUND => Ok(response
                .text()
                .await
                .map(|body| body.contains(NO_SUCH_BUCKET_MARKER))
                .unwrap_or(false)),
            _ => Ok(false),
        }
    }
}
