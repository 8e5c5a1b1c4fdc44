//! Parks zones: apex address (or alias) plus a `www` CNAME to the apex.

use std::net::IpAddr;

use anyhow::{bail, Context, Result};
use log::{info, warn};

use super::confirm::Confirm;
use crate::config::{PARKED_TAG, PARK_MAX_RECORDS, PARK_MAX_WAIT, PARK_TTL};
use crate::domain::normalize_domain;
use crate::zone::{
    find_parked_records, AliasTarget, ChangeAction, ChangeSet, HostedZone, RecordType,
    ResourceRecordSet, RouteManager, Tag,
};

/// Where a parked apex points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParkTarget {
    Addresses {
        ipv4: Vec<String>,
        ipv6: Vec<String>,
    },
    Alias {
        hostname: String,
        hosted_zone_id: String,
    },
}

impl ParkTarget {
    /// Parses `park` arguments: IP addresses, or hostname and zone id with
    /// `alias`.
    pub fn from_args(alias: bool, targets: &[String]) -> Result<Self> {
        if alias {
            let [hostname, hosted_zone_id] = targets else {
                bail!("alias requires a hostname and a zone id");
            };
            return Ok(ParkTarget::Alias {
                hostname: hostname.clone(),
                hosted_zone_id: hosted_zone_id.clone(),
            });
        }

        let mut ipv4 = Vec::new();
        let mut ipv6 = Vec::new();
        for target in targets {
            let ip: IpAddr = target
                .parse()
                .with_context(|| format!("Invalid IP address {target}"))?;
            match ip {
                IpAddr::V4(v4) => ipv4.push(v4.to_string()),
                IpAddr::V6(v6) => ipv6.push(v6.to_string()),
            }
        }
        if ipv4.is_empty() && ipv6.is_empty() {
            bail!("at least one destination IP is required");
        }
        Ok(ParkTarget::Addresses { ipv4, ipv6 })
    }
}

/// Changes that park `zone_name`. IPv6 addresses go into an AAAA record.
pub fn park_changes(zone_name: &str, target: &ParkTarget) -> ChangeSet {
    let apex = normalize_domain(zone_name);
    let mut changes = ChangeSet::new(&apex);
    changes.push(
        ChangeAction::Upsert,
        ResourceRecordSet::new(format!("www.{apex}"), RecordType::Cname, PARK_TTL, vec![apex.clone()]),
    );

    match target {
        ParkTarget::Alias {
            hostname,
            hosted_zone_id,
        } => {
            changes.push(
                ChangeAction::Upsert,
                ResourceRecordSet::alias(
                    apex.as_str(),
                    RecordType::A,
                    AliasTarget {
                        hosted_zone_id: hosted_zone_id.clone(),
                        dns_name: hostname.clone(),
                        evaluate_target_health: false,
                    },
                ),
            );
        }
        ParkTarget::Addresses { ipv4, ipv6 } => {
            for (record_type, values) in [(RecordType::A, ipv4), (RecordType::Aaaa, ipv6)] {
                if !values.is_empty() {
                    changes.push(
                        ChangeAction::Upsert,
                        ResourceRecordSet::new(apex.as_str(), record_type, PARK_TTL, values.clone()),
                    );
                }
            }
        }
    }
    changes
}

fn has_parked_tag(tags: &[Tag]) -> bool {
    tags.iter()
        .any(|tag| tag.key == PARKED_TAG && tag.value.eq_ignore_ascii_case("true"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParkOutcome {
    /// The zone holds records and `force` was not given.
    Skipped,
    Declined,
    DryRun,
    Parked { newly_parked: bool },
}

/// Parks one zone.
pub async fn park_zone(
    manager: &RouteManager,
    confirm: &dyn Confirm,
    zone: &HostedZone,
    target: &ParkTarget,
    force: bool,
    dry: bool,
) -> Result<ParkOutcome> {
    let parked = has_parked_tag(&manager.get_zone_tags(&zone.id).await?);

    if zone.record_count > PARK_MAX_RECORDS {
        if !force {
            info!("Skipping {} (has {} records)", zone.name, zone.record_count);
            return Ok(ParkOutcome::Skipped);
        }
        let records = manager.fetch_records(&zone.id).await?;
        let (_, resources) = find_parked_records(&records, &zone.name);
        if resources.is_parked()
            && !parked
            && !confirm
                .confirm("[WARNING] Domain is in use. Do you want to overwrite those entries?")
                .await?
        {
            info!("Aborting");
            return Ok(ParkOutcome::Declined);
        }
    }

    if parked
        && !confirm
            .confirm("Domain already parked. Do you want to update those entries?")
            .await?
    {
        info!("Aborting");
        return Ok(ParkOutcome::Declined);
    }

    let changes = park_changes(&zone.name, target);
    if dry {
        info!("Would park {} with {} changes", zone.name, changes.len());
        return Ok(ParkOutcome::DryRun);
    }

    info!("Parking {}...", zone.name);
    let comment = format!("parking {}", zone.name);
    let change = manager.apply(&zone.id, &changes, Some(&comment)).await?;
    manager.settle(&change, PARK_MAX_WAIT).await?;
    if !parked {
        manager
            .upsert_tags(&zone.id, &[Tag::new(PARKED_TAG, "true")])
            .await?;
    }
    info!("Parked {}", zone.name);
    Ok(ParkOutcome::Parked {
        newly_parked: !parked,
    })
}

/// Parks one zone, or every zone of the account when `domain` is `None`.
///
/// In the account-wide sweep a failing zone is logged and skipped.
pub async fn park(
    manager: &RouteManager,
    confirm: &dyn Confirm,
    domain: Option<&str>,
    target: &ParkTarget,
    force: bool,
    dry: bool,
) -> Result<Vec<(String, ParkOutcome)>> {
    if let Some(domain) = domain {
        let zone = manager.get_zone(domain).await?;
        let outcome = park_zone(manager, confirm, &zone, target, force, dry).await?;
        return Ok(vec![(zone.name, outcome)]);
    }

    let mut outcomes = Vec::new();
    for zone in manager.list_zones().await? {
        match park_zone(manager, confirm, &zone, target, force, dry).await {
            Ok(outcome) => outcomes.push((zone.name, outcome)),
            Err(e) => warn!("Error parking zone {}: {e:#}", zone.name),
        }
    }
    Ok(outcomes)
}
