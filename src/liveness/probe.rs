//! Low-level liveness probes: TCP connect and HTTP fetch.

use std::io::ErrorKind;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use thiserror::Error;
use tokio::net::TcpStream;

use crate::config::TCP_CONNECT_TIMEOUT_SECS;
use crate::domain::denormalize_domain;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LivenessError {
    #[error("timed out")]
    Timeout,

    #[error("{0}")]
    Failed(String),
}

impl LivenessError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, LivenessError::Timeout)
    }
}

/// Answers "is something listening on this host".
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    /// Opens a TCP connection to `host:port`.
    async fn connect(&self, host: &str, port: u16) -> Result<bool, LivenessError>;

    /// Fetches `http://host` then `https://host`.
    async fn fetch(&self, host: &str) -> Result<bool, LivenessError>;
}

/// [`LivenessProbe`] backed by tokio sockets and a `reqwest` client.
pub struct SystemProbe {
    client: reqwest::Client,
}

impl SystemProbe {
    /// `client` should skip certificate verification: answers are used for
    /// discovery only.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn reqwest_liveness_error(error: reqwest::Error) -> LivenessError {
    if error.is_timeout() {
        LivenessError::Timeout
    } else {
        LivenessError::Failed(error.to_string())
    }
}

/// A TLS alert sent by the peer proves the host is serving.
fn is_remote_tls_alert(error: &reqwest::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(cause) = source {
        let message = cause.to_string().to_lowercase();
        if message.contains("alert") {
            return true;
        }
        source = cause.source();
    }
    false
}

#[async_trait]
impl LivenessProbe for SystemProbe {
    async fn connect(&self, host: &str, port: u16) -> Result<bool, LivenessError> {
        let host = denormalize_domain(host);
        match tokio::time::timeout(
            Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS),
            TcpStream::connect((host, port)),
        )
        .await
        {
            Ok(Ok(_stream)) => Ok(true),
            Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => Ok(false),
            Ok(Err(e)) => Err(LivenessError::Failed(e.to_string())),
            Err(_) => Err(LivenessError::Timeout),
        }
    }

    async fn fetch(&self, host: &str) -> Result<bool, LivenessError> {
        let host = denormalize_domain(host);
        self.client
            .get(format!("http://{host}"))
            .send()
            .await
            .map_err(reqwest_liveness_error)?;

        match self.client.get(format!("https://{host}")).send().await {
            Ok(_) => Ok(true),
            Err(e) if is_remote_tls_alert(&e) => {
                debug!("{host} answered https with an alert: {e}");
                Ok(true)
            }
            Err(e) => Err(reqwest_liveness_error(e)),
        }
    }
}
