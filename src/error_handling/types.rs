//! Error type definitions.
//!
//! This module defines the error types shared across the resolver, the waiter,
//! the zone engine and application initialization.

use std::time::Duration;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// Error initializing the DNS resolver.
    #[error("DNS resolver initialization error: {0}")]
    DnsResolverError(String),
}

/// Failure of a DNS query after the retry policy has run.
///
/// `NotFound` is the definitive negative answer (NXDOMAIN). Callers branch on
/// it to tell an undelegated or deleted name apart from any other failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The name does not exist.
    #[error("{domain} does not exist (NXDOMAIN)")]
    NotFound { domain: String },

    /// The server answered with a non-success response code other than NXDOMAIN.
    #[error("failed to resolve {domain}: {classification}")]
    Failed {
        domain: String,
        classification: String,
    },

    /// Every attempt timed out.
    #[error("timed out resolving {domain} after {attempts} attempts")]
    Timeout { domain: String, attempts: usize },

    /// A transport failure that is not a timeout. Never retried.
    #[error("transport error resolving {domain}: {message}")]
    Transport { domain: String, message: String },

    /// The query type is not a known record type.
    #[error("invalid query type: {0}")]
    InvalidType(String),

    /// The caller cancelled the query.
    #[error("resolution of {domain} was cancelled")]
    Cancelled { domain: String },
}

impl ResolveError {
    /// Short classification of the failure (`NXDOMAIN`, `SERVFAIL`, `timeout`, ...).
    pub fn classification(&self) -> &str {
        match self {
            ResolveError::NotFound { .. } => "NXDOMAIN",
            ResolveError::Failed { classification, .. } => classification,
            ResolveError::Timeout { .. } => "timeout",
            ResolveError::Transport { .. } => "transport",
            ResolveError::InvalidType(_) => "invalid type",
            ResolveError::Cancelled { .. } => "cancelled",
        }
    }

    /// Returns `true` for the definitive negative answer.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::NotFound { .. })
    }
}

/// Failure of a state-polling wait.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WaitError {
    /// The overall wait duration must be positive.
    #[error("maximum wait time for waiter must be greater than zero")]
    InvalidMaxWait,

    /// The minimum delay exceeds the maximum delay.
    #[error("minimum waiter delay {min:?} must be less than or equal to maximum waiter delay {max:?}")]
    InvalidDelays { min: Duration, max: Duration },

    /// The operation reached a terminal failure state.
    #[error("operation failed: {0}")]
    Failed(String),

    /// The operation did not reach a terminal state in time.
    #[error("exceeded max wait time of {max_wait:?}")]
    DeadlineExceeded { max_wait: Duration },

    /// The caller cancelled the wait.
    #[error("request cancelled while waiting")]
    Cancelled,
}

/// An error returned by a DNS-hosting or registrar API call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation} failed: {message}")]
pub struct ApiError {
    /// The API operation that failed.
    pub operation: String,
    /// Provider-side message.
    pub message: String,
}

impl ApiError {
    pub fn new(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Error types for hosted-zone operations.
#[derive(Error, Debug)]
pub enum ZoneError {
    /// No hosted zone exactly matches the requested name.
    #[error("hosted zone not found: {zone}")]
    ZoneNotFound { zone: String },

    /// The zone has no NS record set.
    #[error("no NS records found in zone {zone_id}")]
    NoNsRecord { zone_id: String },

    /// A record set violates the values-or-alias invariant.
    #[error("invalid record {name}: {reason}")]
    InvalidRecord { name: String, reason: String },

    /// No registrar session was configured for a registrar operation.
    #[error("no registrar configured for {domain}")]
    NoRegistrar { domain: String },

    /// Provider API failure.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Waiting for a change failed.
    #[error("error waiting for change: {0}")]
    Wait(#[from] WaitError),

    /// DNS resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl ZoneError {
    /// Returns `true` if the error is a zone lookup miss.
    pub fn is_zone_not_found(&self) -> bool {
        matches!(self, ZoneError::ZoneNotFound { .. })
    }
}
