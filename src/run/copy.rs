//! Copies the records of a zone between accounts.

use anyhow::{Context, Result};
use log::info;
use tokio::time::Instant;

use crate::config::COPY_MAX_WAIT;
use crate::zone::{diff, RouteManager};

/// What a copy did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyReport {
    /// Changes computed from the source zone.
    pub changes: usize,
    /// Destination zone id, unset on a dry run.
    pub destination_zone: Option<String>,
    /// Whether the registrar was pointed at the destination.
    pub registrar_updated: bool,
}

/// Copies every record of `domain` except the apex NS/SOA from `source` to
/// `destination`, creating the destination zone if needed.
///
/// # Arguments
///
/// * `source_name` - Name of the source account, used as the change comment
/// * `update_ns` - Reconcile the destination registrar nameservers afterwards
/// * `dry` - Only report what would be copied
///
/// # Errors
///
/// Returns an error if the source zone cannot be read, the destination zone
/// cannot be created or the change does not propagate in time.
pub async fn copy_zone(
    source: &RouteManager,
    source_name: &str,
    destination: &RouteManager,
    domain: &str,
    update_ns: bool,
    dry: bool,
) -> Result<CopyReport> {
    let zone = source
        .get_zone(domain)
        .await
        .with_context(|| format!("Failed to find source zone {domain}"))?;
    let records = source.fetch_records(&zone.id).await?;
    let changes = diff(domain, &records);
    info!("Number of records to copy: {}", changes.len());

    if dry {
        info!("Not copying records since --dry is given");
        let existing = destination.get_zone(domain).await?;
        info!(
            "Destination contains {} records, including NS and SOA",
            existing.record_count
        );
        return Ok(CopyReport {
            changes: changes.len(),
            destination_zone: None,
            registrar_updated: false,
        });
    }

    let zone = destination.get_or_create_zone(domain).await?;
    if changes.is_empty() {
        info!("No records to copy for '{domain}'");
    } else {
        let change = destination
            .apply(&zone.id, &changes, Some(source_name))
            .await?;
        info!("{} records in '{domain}' were copied from {source_name}", changes.len());
        let start = Instant::now();
        destination.settle(&change, COPY_MAX_WAIT).await?;
        info!(
            "{} records in '{domain}' are in sync after {:?}",
            changes.len(),
            start.elapsed()
        );
    }

    let mut registrar_updated = false;
    if update_ns {
        info!("Updating registrar NS records");
        registrar_updated = destination.update_registrar_ns(domain, &zone.id).await?;
        if registrar_updated {
            info!("Registrar NS records for '{domain}' updated");
        } else {
            info!("Registrar NS records for '{domain}' are already up to date");
        }
    }

    Ok(CopyReport {
        changes: changes.len(),
        destination_zone: Some(zone.id),
        registrar_updated,
    })
}
