//! Writes a zone-file export of a zone.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use log::info;

use crate::domain::denormalize_domain;
use crate::zone::{render_zone_file, RouteManager};

/// `<zone>-<YYYYmmdd-HHMMSS>.zone`.
pub fn default_export_path(zone_name: &str, now: DateTime<Local>) -> PathBuf {
    PathBuf::from(format!(
        "{}-{}.zone",
        denormalize_domain(zone_name),
        now.format("%Y%m%d-%H%M%S")
    ))
}

/// Exports `zone` to `output` (or the default path).
///
/// # Returns
///
/// The path written, or `None` on a dry run.
pub async fn export_zone(
    manager: &RouteManager,
    zone: &str,
    output: Option<&Path>,
    dry: bool,
) -> Result<Option<PathBuf>> {
    let hosted = manager.get_zone(zone).await?;
    let records = manager.fetch_records(&hosted.id).await?;
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_export_path(&hosted.name, Local::now()));

    info!(
        "Exporting zone {} to {} (records: {})",
        hosted.name,
        output.display(),
        records.len()
    );
    if dry {
        info!("--dry provided; not writing file");
        return Ok(None);
    }

    tokio::fs::write(&output, render_zone_file(&hosted.name, &records))
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!("Zone file written to {}", output.display());
    Ok(Some(output))
}
