//! Takeover and mail scan over one zone or a whole account.

use anyhow::Result;
use log::{info, warn};

use crate::scan::{Findings, Scanner, ZoneMeta};
use crate::zone::{HostedZone, RouteManager};

async fn scan_zone(manager: &RouteManager, scanner: &Scanner, zone: &HostedZone) -> Result<Findings> {
    let records = manager.fetch_records(&zone.id).await?;
    let meta = ZoneMeta {
        zone_id: zone.id.clone(),
        name: zone.name.clone(),
    };
    Ok(scanner.scan(&meta, &records).await)
}

/// Scans one zone, or every zone of the account when `domain` is `None`.
///
/// In the account-wide sweep a zone whose records cannot be fetched is logged
/// and skipped.
pub async fn scan_zones(
    manager: &RouteManager,
    scanner: &Scanner,
    domain: Option<&str>,
) -> Result<Vec<Findings>> {
    if let Some(domain) = domain {
        let zone = manager.get_zone(domain).await?;
        return Ok(vec![scan_zone(manager, scanner, &zone).await?]);
    }

    let zones = manager.list_zones().await?;
    info!("Scanning {} zones", zones.len());
    let mut all = Vec::with_capacity(zones.len());
    for zone in &zones {
        match scan_zone(manager, scanner, zone).await {
            Ok(findings) => all.push(findings),
            Err(e) => warn!("Failed to scan zone {}: {e:#}", zone.name),
        }
    }

    let vulnerable: usize = all.iter().map(Findings::vulnerable_count).sum();
    let misconfigured: usize = all.iter().map(Findings::misconfigured_count).sum();
    info!("Scan finished: {vulnerable} vulnerable, {misconfigured} misconfigured");
    Ok(all)
}
