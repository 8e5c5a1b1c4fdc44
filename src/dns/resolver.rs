//! Bounded-retry authoritative queries.

use std::sync::Arc;

use async_trait::async_trait;
use hickory_resolver::proto::op::ResponseCode;
use log::debug;
use tokio_util::sync::CancellationToken;

use super::transport::{DnsTransport, QueryResponse, TransportError};
use crate::config::DNS_MAX_ATTEMPTS;
use crate::domain::{denormalize_domain, normalize_domain};
use crate::error_handling::ResolveError;
use crate::utils::RetryPolicy;
use crate::zone::RecordType;

/// Answers DNS questions for the rest of the crate.
#[async_trait]
pub trait Resolve: Send + Sync {
    /// Queries `domain` for `record_type` and returns the answer data.
    async fn resolve(&self, domain: &str, record_type: RecordType)
        -> Result<Vec<String>, ResolveError>;

    /// Returns the public nameservers of `domain`, without trailing dots.
    ///
    /// Any non-success response code is reported as `NotFound`.
    async fn nameservers(&self, domain: &str) -> Result<Vec<String>, ResolveError>;
}

/// Resolver retrying timed-out queries over a [`DnsTransport`].
pub struct DnsResolver {
    transport: Arc<dyn DnsTransport>,
    policy: RetryPolicy,
    cancel: CancellationToken,
}

impl DnsResolver {
    pub fn new(transport: Arc<dyn DnsTransport>, cancel: CancellationToken) -> Self {
        Self {
            transport,
            policy: RetryPolicy::immediate(DNS_MAX_ATTEMPTS),
            cancel,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Runs one query under the retry policy. Only timeouts are retried.
    async fn query(
        &self,
        fqdn: &str,
        record_type: RecordType,
    ) -> Result<QueryResponse, ResolveError> {
        let attempt = self.policy.retry_if(
            || self.transport.exchange(fqdn, record_type),
            TransportError::is_timeout,
        );

        let outcome = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                return Err(ResolveError::Cancelled {
                    domain: fqdn.to_string(),
                });
            }
            outcome = attempt => outcome,
        };

        outcome.map_err(|e| match e {
            TransportError::Timeout => ResolveError::Timeout {
                domain: fqdn.to_string(),
                attempts: self.policy.max_attempts,
            },
            TransportError::Other(message) => ResolveError::Transport {
                domain: fqdn.to_string(),
                message,
            },
        })
    }
}

#[async_trait]
impl Resolve for DnsResolver {
    async fn resolve(
        &self,
        domain: &str,
        record_type: RecordType,
    ) -> Result<Vec<String>, ResolveError> {
        let fqdn = normalize_domain(domain);
        let response = self.query(&fqdn, record_type).await?;
        debug!(
            "{fqdn} {record_type}: {} ({} answers)",
            response_code_name(response.response_code),
            response.answers.len()
        );

        match response.response_code {
            ResponseCode::NoError => Ok(response
                .answers
                .into_iter()
                .map(|answer| answer.data)
                .collect()),
            ResponseCode::NXDomain => Err(ResolveError::NotFound { domain: fqdn }),
            code => Err(ResolveError::Failed {
                domain: fqdn,
                classification: response_code_name(code),
            }),
        }
    }

    async fn nameservers(&self, domain: &str) -> Result<Vec<String>, ResolveError> {
        let fqdn = normalize_domain(domain);
        let response = self.query(&fqdn, RecordType::Ns).await?;

        if response.response_code != ResponseCode::NoError {
            return Err(ResolveError::NotFound { domain: fqdn });
        }

        let ns_type = RecordType::Ns.to_string();
        Ok(response
            .answers
            .iter()
            .filter(|answer| answer.record_type == ns_type)
            .map(|answer| denormalize_domain(&answer.data).to_string())
            .collect())
    }
}

/// Mnemonic for a response code (`SERVFAIL`, `REFUSED`, ...).
pub fn response_code_name(code: ResponseCode) -> String {
    match code {
        ResponseCode::NoError => "NOERROR".to_string(),
        ResponseCode::FormErr => "FORMERR".to_string(),
        ResponseCode::ServFail => "SERVFAIL".to_string(),
        ResponseCode::NXDomain => "NXDOMAIN".to_string(),
        ResponseCode::NotImp => "NOTIMP".to_string(),
        ResponseCode::Refused => "REFUSED".to_string(),
        ResponseCode::YXDomain => "YXDOMAIN".to_string(),
        ResponseCode::YXRRSet => "YXRRSET".to_string(),
        ResponseCode::NXRRSet => "NXRRSET".to_string(),
        ResponseCode::NotAuth => "NOTAUTH".to_string(),
        ResponseCode::NotZone => "NOTZONE".to_string(),
        other => format!("RCODE{}", u16::from(other)),
    }
}
