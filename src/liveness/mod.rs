//! Host liveness and the zone-wide record sweep.
//!
//! A host is in use if any of its checkers says so. Checkers run as
//! independent tasks and are all joined before their results are combined,
//! so one failing checker never cancels the others. The sweep spawns one task
//! per record and collects each result into the slot of its record.

mod probe;

use std::sync::Arc;

use futures::future::join_all;
use log::{debug, info, warn};

use crate::config::{
    ACM_VALIDATION_MARKER, CACHE_HOST_MARKER, CACHE_PORTS, DATABASE_HOST_MARKER, DATABASE_PORTS,
    DOMAINKEY_MARKER, REACHABILITY_PORTS,
};
use crate::zone::{RecordType, ResourceRecordSet};

// Re-export public API
pub use probe::{LivenessError, LivenessProbe, SystemProbe};

/// One way of deciding that a host is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checker {
    /// Generic reachability on the web ports.
    Reachability,
    /// Database listener ports.
    Database,
    /// Cache listener ports.
    Cache,
    /// HTTP and HTTPS fetch.
    Web,
}

impl Checker {
    /// Checkers for `host`: reachability plus one chosen by host name.
    pub fn for_host(host: &str) -> Vec<Checker> {
        let specific = if host.contains(DATABASE_HOST_MARKER) {
            Checker::Database
        } else if host.contains(CACHE_HOST_MARKER) {
            Checker::Cache
        } else {
            Checker::Web
        };
        vec![Checker::Reachability, specific]
    }

    async fn run(self, probe: &dyn LivenessProbe, host: &str) -> Result<bool, LivenessError> {
        match self {
            Checker::Reachability => any_port_open(probe, host, REACHABILITY_PORTS).await,
            Checker::Database => any_port_open(probe, host, DATABASE_PORTS).await,
            Checker::Cache => any_port_open(probe, host, CACHE_PORTS).await,
            Checker::Web => probe.fetch(host).await,
        }
    }
}

/// Timeouts count as closed ports; any other error ends the check.
async fn any_port_open(
    probe: &dyn LivenessProbe,
    host: &str,
    ports: &[u16],
) -> Result<bool, LivenessError> {
    for &port in ports {
        match probe.connect(host, port).await {
            Ok(true) => return Ok(true),
            Ok(false) => {}
            Err(e) if e.is_timeout() => debug!("{host}:{port} timed out"),
            Err(e) => return Err(e),
        }
    }
    Ok(false)
}

/// Returns `true` if any checker finds `host` alive.
pub async fn host_in_use(probe: Arc<dyn LivenessProbe>, host: &str) -> bool {
    let mut tasks = Vec::new();
    for checker in Checker::for_host(host) {
        let probe = Arc::clone(&probe);
        let host = host.to_string();
        tasks.push(tokio::spawn(async move {
            (checker, checker.run(probe.as_ref(), &host).await)
        }));
    }

    // Barrier: every checker finishes before the results are combined.
    let mut in_use = false;
    for result in join_all(tasks).await {
        match result {
            Ok((_, Ok(alive))) => in_use |= alive,
            Ok((checker, Err(e))) => debug!("{checker:?} check of {host} failed: {e}"),
            Err(e) => warn!("Liveness check of {host} panicked: {e}"),
        }
    }
    in_use
}

/// Returns `true` if `record` still points at something alive, or cannot be
/// judged.
pub async fn record_in_use(probe: Arc<dyn LivenessProbe>, record: &ResourceRecordSet) -> bool {
    match record.record_type {
        RecordType::Soa | RecordType::Ns | RecordType::Txt => true,
        RecordType::Cname | RecordType::A | RecordType::Aaaa => {
            if record.name.contains(DOMAINKEY_MARKER) {
                return true;
            }
            if let Some(alias) = &record.alias_target {
                return host_in_use(probe, &alias.dns_name).await;
            }
            for value in &record.values {
                // Certificate validation CNAMEs point at provider-managed names.
                if value.contains(ACM_VALIDATION_MARKER) {
                    continue;
                }
                if !host_in_use(Arc::clone(&probe), value).await {
                    return false;
                }
            }
            true
        }
        other => {
            info!("Unsupported record type {} {}", other, record.name);
            true
        }
    }
}

/// Classifies every record concurrently and returns the ones that can be
/// deleted, in input order.
pub async fn sweep(
    probe: Arc<dyn LivenessProbe>,
    records: &[ResourceRecordSet],
) -> Vec<ResourceRecordSet> {
    let mut tasks = Vec::with_capacity(records.len());
    for record in records {
        let probe = Arc::clone(&probe);
        let record = record.clone();
        tasks.push(tokio::spawn(
            async move { record_in_use(probe, &record).await },
        ));
    }

    // One slot per record, filled in record order.
    let mut in_use = Vec::with_capacity(tasks.len());
    for (task, record) in tasks.into_iter().zip(records) {
        match task.await {
            Ok(alive) => in_use.push(alive),
            Err(e) => {
                warn!("Error verifying record {}: {e}", record.name);
                in_use.push(true);
            }
        }
    }

    records
        .iter()
        .zip(in_use)
        .filter(|(_, alive)| !alive)
        .map(|(record, _)| {
            info!("Record {} can be deleted", record.name);
            record.clone()
        })
        .collect()
}
