// Shared test helpers: scripted DNS and HTTP fakes and record builders.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use zone_warden::dns::Resolve;
use zone_warden::error_handling::ResolveError;
use zone_warden::scan::{ProbeError, Prober};
use zone_warden::zone::{AliasTarget, RecordType, ResourceRecordSet};

/// Resolver answering every query unless the name is listed as missing or
/// failing. Nameserver lookups use the delegation map.
#[derive(Default)]
#[allow(dead_code)] // Used by other test files
pub struct FakeResolver {
    missing: Vec<String>,
    failing: Vec<String>,
    delegations: HashMap<String, Vec<String>>,
}

#[allow(dead_code)]
impl FakeResolver {
    /// Every query for `name` is NXDOMAIN.
    pub fn missing(mut self, name: &str) -> Self {
        self.missing.push(name.to_string());
        self
    }

    /// Every query for `name` is SERVFAIL.
    pub fn failing(mut self, name: &str) -> Self {
        self.failing.push(name.to_string());
        self
    }

    pub fn delegate(mut self, domain: &str, nameservers: &[&str]) -> Self {
        self.delegations.insert(
            domain.to_string(),
            nameservers.iter().map(|ns| ns.to_string()).collect(),
        );
        self
    }
}

#[async_trait]
impl Resolve for FakeResolver {
    async fn resolve(&self, domain: &str, _record_type: RecordType) -> Result<Vec<String>, ResolveError> {
        if self.failing.iter().any(|n| n == domain) {
            return Err(ResolveError::Failed {
                domain: domain.to_string(),
                classification: "SERVFAIL".to_string(),
            });
        }
        if self.missing.iter().any(|n| n == domain) {
            return Err(ResolveError::NotFound {
                domain: domain.to_string(),
            });
        }
        Ok(vec!["192.0.2.1".to_string()])
    }

    async fn nameservers(&self, domain: &str) -> Result<Vec<String>, ResolveError> {
        self.delegations
            .get(domain)
            .cloned()
            .ok_or_else(|| ResolveError::NotFound {
                domain: domain.to_string(),
            })
    }
}

/// Prober with scripted results per host; unknown hosts are clean.
#[derive(Default)]
#[allow(dead_code)]
pub struct FakeProber {
    results: HashMap<String, Result<bool, ProbeError>>,
    calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakeProber {
    pub fn with(mut self, host: &str, result: Result<bool, ProbeError>) -> Self {
        self.results.insert(host.to_string(), result);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Prober for FakeProber {
    async fn missing_bucket(&self, host: &str) -> Result<bool, ProbeError> {
        self.calls.lock().unwrap().push(host.to_string());
        self.results.get(host).cloned().unwrap_or(Ok(false))
    }
}

#[allow(dead_code)]
pub fn record(name: &str, record_type: RecordType, values: &[&str]) -> ResourceRecordSet {
    ResourceRecordSet::new(
        name,
        record_type,
        300,
        values.iter().map(|v| v.to_string()).collect(),
    )
}

#[allow(dead_code)]
pub fn alias(name: &str, record_type: RecordType, dns_name: &str) -> ResourceRecordSet {
    ResourceRecordSet::alias(
        name,
        record_type,
        AliasTarget {
            hosted_zone_id: "Z2FDTNDATAQYW2".to_string(),
            dns_name: dns_name.to_string(),
            evaluate_target_health: false,
        },
    )
}

/// Apex NS and SOA sets of `zone`.
#[allow(dead_code)]
pub fn apex_infrastructure(zone: &str, nameservers: &[&str]) -> Vec<ResourceRecordSet> {
    vec![
        record(zone, RecordType::Ns, nameservers),
        record(
            zone,
            RecordType::Soa,
            &["ns1.example.net. hostmaster.example.com. 1 7200 900 1209600 86400"],
        ),
    ]
}
