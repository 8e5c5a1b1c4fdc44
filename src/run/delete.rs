//! Safe zone deletion.

use anyhow::{Context, Result};
use log::info;

use super::confirm::Confirm;
use crate::config::DELETE_MAX_WAIT;
use crate::dns::Resolve;
use crate::zone::{find_ns_record, match_ns_records, remove_record_types, RecordType, RouteManager};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The zone is still delegated to its own nameservers.
    StillDelegated,
    DryRun { records: usize },
    Declined,
    Deleted { records: usize },
}

/// Deletes the records and then the zone of `domain`, unless the public
/// delegation still points at the zone.
///
/// A domain without public NS records is deleted as if `force` was given.
pub async fn delete_zone(
    manager: &RouteManager,
    resolver: &dyn Resolve,
    confirm: &dyn Confirm,
    domain: &str,
    force: bool,
    dry: bool,
) -> Result<DeleteOutcome> {
    let zone = manager.get_zone(domain).await?;
    let records = manager.fetch_records(&zone.id).await?;

    let mut force = force;
    let public_ns = match resolver.nameservers(domain).await {
        Ok(ns) => ns,
        Err(e) if e.is_not_found() => {
            info!("No NS records found for {domain}");
            force = true;
            Vec::new()
        }
        Err(e) => return Err(e).context(format!("Failed to look up nameservers of {domain}")),
    };

    let ns_record = find_ns_record(&zone.id, &records)?;
    info!("Public NS servers: {}", public_ns.join(","));
    info!("Zone NS servers: {}", ns_record.values.join(","));
    if match_ns_records(public_ns.as_slice(), ns_record.values.as_slice()) && !force {
        info!("Nameservers for {domain} match, not deleting zone");
        return Ok(DeleteOutcome::StillDelegated);
    }

    let records = remove_record_types(records, &[RecordType::Ns, RecordType::Soa]);
    info!("Found {} records for domain {domain} to delete", records.len());
    for record in &records {
        info!("  {} {} {}", record.name, record.record_type, record.destination().unwrap_or_default());
    }

    if dry {
        info!("Dry run, exiting");
        return Ok(DeleteOutcome::DryRun {
            records: records.len(),
        });
    }
    if !confirm.confirm("Delete all records?").await? {
        info!("Aborting");
        return Ok(DeleteOutcome::Declined);
    }

    match manager.delete_records(&zone.id, &zone.name, &records).await? {
        Some(change) => {
            info!("Deleting records...");
            manager.wait_for_propagation(&change.id, DELETE_MAX_WAIT).await?;
            info!("Deleted all records for domain {domain}");
        }
        None => info!("No records to delete for domain {domain}"),
    }

    info!("Removing zone {}...", zone.id);
    let change = manager.delete_zone(&zone.id).await?;
    manager.wait_for_propagation(&change.id, DELETE_MAX_WAIT).await?;
    info!("Deleted zone {}", zone.id);

    Ok(DeleteOutcome::Deleted {
        records: records.len(),
    })
}
