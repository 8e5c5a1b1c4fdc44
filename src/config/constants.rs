//! Configuration constants.
//!
//! This module defines the timeouts, delays, attempt counts and provider
//! patterns used throughout the application.

use std::time::Duration;

// DNS resolver
/// Client-side timeout for a single DNS query in seconds
pub const DNS_TIMEOUT_SECS: u64 = 15;
/// Total attempts (initial + retries) for a DNS query that times out
pub const DNS_MAX_ATTEMPTS: usize = 3;
/// Port queried on the configured resolvers
pub const DNS_PORT: u16 = 53;
/// Resolvers used when none are given on the command line.
/// Only the first one is queried.
pub const DEFAULT_RESOLVERS: &[&str] = &["8.8.8.8", "8.8.4.4"];

// Network probes
/// Timeout for takeover HTTP probes in seconds
pub const PROBE_TIMEOUT_SECS: u64 = 3;
/// Timeout for liveness HTTP fetches in seconds
pub const FETCH_TIMEOUT_SECS: u64 = 5;
/// Total attempts for an HTTP probe that times out
pub const PROBE_MAX_ATTEMPTS: usize = 2;
/// Redirects followed by a takeover probe
pub const PROBE_MAX_REDIRECTS: usize = 10;
/// TCP connection timeout in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 5;

// Propagation and operation polling
/// Minimum delay between record-change status polls
pub const CHANGE_MIN_DELAY: Duration = Duration::from_secs(15);
/// Maximum delay between record-change status polls
pub const CHANGE_MAX_DELAY: Duration = Duration::from_secs(120);
/// Minimum delay between registrar operation polls
pub const OPERATION_MIN_DELAY: Duration = Duration::from_secs(30);
/// Maximum delay between registrar operation polls
pub const OPERATION_MAX_DELAY: Duration = Duration::from_secs(120);

/// How long `copy` waits for the copied records to be in sync
pub const COPY_MAX_WAIT: Duration = Duration::from_secs(2 * 60);
/// How long zone creation waits before re-fetching the zone
pub const CREATE_MAX_WAIT: Duration = Duration::from_secs(60);
/// How long parking waits for its changes
pub const PARK_MAX_WAIT: Duration = Duration::from_secs(60);
/// How long `delete` waits for record and zone deletion
pub const DELETE_MAX_WAIT: Duration = Duration::from_secs(2 * 60);
/// How long a registrar nameserver update is awaited
pub const NAMESERVER_UPDATE_MAX_WAIT: Duration = Duration::from_secs(10 * 60);

// Parking
/// TTL of the records written when parking a zone
pub const PARK_TTL: i64 = 3600;
/// Tag marking a zone as parked
pub const PARKED_TAG: &str = "parked";
/// Zones with more records than this are considered in use
pub const PARK_MAX_RECORDS: i64 = 2;

/// Comment attached to zones created by this tool
pub const CREATED_ZONE_COMMENT: &str = "Created by zone_warden";

// Takeover detection
/// Body marker returned by object storage for a missing bucket
pub const NO_SUCH_BUCKET_MARKER: &str = "Code: NoSuchBucket";
/// CDN distribution suffix
pub const CDN_SUFFIX: &str = ".cloudfront.net";
/// PaaS environment suffix
pub const PAAS_SUFFIX: &str = ".elasticbeanstalk.com";
/// Object storage endpoints end with this and contain `s3`
pub const OBJECT_STORAGE_SUFFIX: &str = "amazonaws.com";
/// Static website endpoints of object storage
pub const OBJECT_STORAGE_WEBSITE_MARKER: &str = ".s3-website";

// Liveness sweep
/// Hosts containing this are probed on database ports
pub const DATABASE_HOST_MARKER: &str = "rds";
/// Hosts containing this are probed on the cache port
pub const CACHE_HOST_MARKER: &str = "cache.amazonaws";
/// Database ports probed for database hosts (MySQL, PostgreSQL)
pub const DATABASE_PORTS: &[u16] = &[3306, 5432];
/// Cache port probed for cache hosts (Redis)
pub const CACHE_PORTS: &[u16] = &[6379];
/// Ports used as the generic reachability probe
pub const REACHABILITY_PORTS: &[u16] = &[443, 80];
/// DKIM selector records are never swept
pub const DOMAINKEY_MARKER: &str = "._domainkey.";
/// Certificate validation CNAMEs point at provider-managed records
pub const ACM_VALIDATION_MARKER: &str = "acm-validations.aws";

// Zone-file export
/// Default TTL written when a zone has no TTL-bearing records
pub const EXPORT_FALLBACK_TTL: i64 = 300;
