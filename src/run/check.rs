//! Compares public delegation with the zone NS records.

use anyhow::Result;
use log::{info, warn};

use crate::dns::Resolve;
use crate::zone::{match_ns_records, HostedZone, RouteManager};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneCheck {
    pub zone: String,
    pub zone_id: String,
    /// Nameservers the public DNS delegates to.
    pub public: Vec<String>,
    /// Nameservers of the zone's own NS record.
    pub zone_ns: Vec<String>,
}

impl ZoneCheck {
    pub fn matches(&self) -> bool {
        match_ns_records(self.public.as_slice(), self.zone_ns.as_slice())
    }
}

async fn check_zone(
    manager: &RouteManager,
    resolver: &dyn Resolve,
    zone: &HostedZone,
) -> Result<ZoneCheck> {
    info!("Checking {} ...", zone.name);
    let public = resolver.nameservers(&zone.name).await.inspect_err(|_| {
        info!("No NS records found for {} zone {}", zone.name, zone.id);
    })?;
    let ns_record = manager.get_ns_records(&zone.id).await?;

    let check = ZoneCheck {
        zone: zone.name.clone(),
        zone_id: zone.id.clone(),
        public,
        zone_ns: ns_record.values,
    };
    if check.matches() {
        info!("Public delegation and zone NS records of {} match", zone.name);
    } else {
        warn!(
            "{} zone {} has different NS servers:\n - nameservers: {}\n - zone record: {}",
            zone.name,
            zone.id,
            check.public.join(","),
            check.zone_ns.join(",")
        );
    }
    Ok(check)
}

/// Checks one zone, or every zone of the account when `domain` is `None`.
///
/// In the account-wide sweep a failing zone is logged and skipped.
pub async fn check_zones(
    manager: &RouteManager,
    resolver: &dyn Resolve,
    domain: Option<&str>,
) -> Result<Vec<ZoneCheck>> {
    if let Some(domain) = domain {
        let zone = manager.get_zone(domain).await?;
        return Ok(vec![check_zone(manager, resolver, &zone).await?]);
    }

    let mut checks = Vec::new();
    for zone in manager.list_zones().await? {
        match check_zone(manager, resolver, &zone).await {
            Ok(check) => checks.push(check),
            Err(e) => warn!("Skipping zone {}: {e:#}", zone.name),
        }
    }
    Ok(checks)
}
