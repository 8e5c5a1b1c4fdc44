//! Searches record names, alias targets and values across every zone.

use anyhow::Result;
use log::{info, warn};
use regex::Regex;

use crate::zone::{ResourceRecordSet, RouteManager};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindMatch {
    pub zone: String,
    pub name: String,
    /// Joined values, or the alias target.
    pub value: String,
}

impl std::fmt::Display for FindMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} -> {}", self.zone, self.name, self.value)
    }
}

fn record_matches(pattern: &Regex, record: &ResourceRecordSet) -> bool {
    pattern.is_match(&record.name)
        || record
            .alias_target
            .as_ref()
            .is_some_and(|alias| pattern.is_match(&alias.dns_name))
        || record.values.iter().any(|value| pattern.is_match(value))
}

fn display_value(record: &ResourceRecordSet) -> String {
    match &record.alias_target {
        Some(alias) if record.values.is_empty() => alias.dns_name.clone(),
        _ => record.values.join(", "),
    }
}

/// Every record of every zone matching `pattern`, in zone order.
pub async fn find_records(manager: &RouteManager, pattern: &Regex) -> Result<Vec<FindMatch>> {
    let zones = manager.list_zones().await?;
    info!("Found {} zones", zones.len());
    info!("Fetching records...");

    let mut matches = Vec::new();
    for zone in zones {
        let records = match manager.fetch_records(&zone.id).await {
            Ok(records) => records,
            Err(e) => {
                warn!("Failed to list records for zone {}: {e}", zone.name);
                continue;
            }
        };
        matches.extend(
            records
                .iter()
                .filter(|record| record_matches(pattern, record))
                .map(|record| FindMatch {
                    zone: zone.name.clone(),
                    name: record.name.clone(),
                    value: display_value(record),
                }),
        );
    }
    Ok(matches)
}
