//! Single-exchange DNS transport.
//!
//! A transport sends one query and reports the response code and answers.
//! It never retries: retry policy lives in [`super::DnsResolver`].

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::config::{NameServerConfig, Protocol, ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::proto::error::ProtoErrorKind;
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::proto::rr::RecordType as WireRecordType;
use hickory_resolver::TokioAsyncResolver;
use thiserror::Error;

use crate::config::{DNS_PORT, DNS_TIMEOUT_SECS};
use crate::error_handling::InitializationError;
use crate::zone::RecordType;

/// One answer record, rendered as presentation text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub record_type: String,
    pub data: String,
}

impl Answer {
    pub fn new(record_type: RecordType, data: impl Into<String>) -> Self {
        Self {
            record_type: record_type.to_string(),
            data: data.into(),
        }
    }
}

/// Response to a single query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResponse {
    pub response_code: ResponseCode,
    pub answers: Vec<Answer>,
}

impl QueryResponse {
    pub fn new(response_code: ResponseCode, answers: Vec<Answer>) -> Self {
        Self {
            response_code,
            answers,
        }
    }
}

/// Transport-level failure of a single exchange.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// No response arrived in time.
    #[error("query timed out")]
    Timeout,

    /// Any other network or protocol failure.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout)
    }
}

/// Sends one DNS query.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn exchange(
        &self,
        name: &str,
        record_type: RecordType,
    ) -> Result<QueryResponse, TransportError>;
}

/// Transport backed by `hickory-resolver`, querying a single server over UDP.
pub struct HickoryTransport {
    resolver: TokioAsyncResolver,
}

impl HickoryTransport {
    /// Builds a transport for the first of `servers`.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::DnsResolverError` if no server is given
    /// or the first one is not an IP address.
    pub fn new(servers: &[String]) -> Result<Self, InitializationError> {
        let first = servers.first().ok_or_else(|| {
            InitializationError::DnsResolverError("no resolver configured".to_string())
        })?;
        let ip = IpAddr::from_str(first).map_err(|e| {
            InitializationError::DnsResolverError(format!("invalid resolver {first}: {e}"))
        })?;

        Ok(Self::with_server(
            SocketAddr::new(ip, DNS_PORT),
            Duration::from_secs(DNS_TIMEOUT_SECS),
        ))
    }

    /// Builds a transport sending one UDP datagram per exchange to `server`.
    pub fn with_server(server: SocketAddr, timeout: Duration) -> Self {
        let mut config = ResolverConfig::new();
        config.add_name_server(NameServerConfig::new(server, Protocol::Udp));

        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        // hickory counts retries after the first send; the resolver does its own.
        opts.attempts = 0;
        opts.ndots = 0;

        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

#[async_trait]
impl DnsTransport for HickoryTransport {
    async fn exchange(
        &self,
        name: &str,
        record_type: RecordType,
    ) -> Result<QueryResponse, TransportError> {
        let wire_type = WireRecordType::from(record_type.code());
        match self.resolver.lookup(name, wire_type).await {
            Ok(lookup) => {
                let answers = lookup
                    .record_iter()
                    .filter_map(|record| {
                        record.data().map(|data| Answer {
                            record_type: record.record_type().to_string(),
                            data: data.to_string(),
                        })
                    })
                    .collect();
                Ok(QueryResponse::new(ResponseCode::NoError, answers))
            }
            Err(e) => match e.kind() {
                ResolveErrorKind::NoRecordsFound { response_code, .. } => {
                    Ok(QueryResponse::new(*response_code, Vec::new()))
                }
                ResolveErrorKind::Timeout => Err(TransportError::Timeout),
                ResolveErrorKind::Proto(proto) if matches!(proto.kind(), ProtoErrorKind::Timeout) => {
                    Err(TransportError::Timeout)
                }
                ResolveErrorKind::Io(io) if io.kind() == std::io::ErrorKind::TimedOut => {
                    Err(TransportError::Timeout)
                }
                _ => Err(TransportError::Other(e.to_string())),
            },
        }
    }
}
