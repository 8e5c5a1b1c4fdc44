//! Finds records pointing at hosts that no longer answer.

use std::sync::Arc;

use anyhow::Result;
use log::info;

use crate::liveness::{sweep, LivenessProbe};
use crate::zone::{ResourceRecordSet, RouteManager};

/// Returns the records of `domain` that can be deleted. Nothing is changed.
pub async fn cleanup_zone(
    manager: &RouteManager,
    probe: Arc<dyn LivenessProbe>,
    domain: &str,
) -> Result<Vec<ResourceRecordSet>> {
    let zone = manager.get_zone(domain).await?;
    let records = manager.fetch_records(&zone.id).await?;
    info!("Checking {} records of {}", records.len(), zone.name);

    let deletable = sweep(probe, &records).await;
    info!("{} of {} records can be deleted", deletable.len(), records.len());
    Ok(deletable)
}
