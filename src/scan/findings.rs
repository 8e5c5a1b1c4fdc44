//! Per-zone findings.

use colored::Colorize;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::zone::{RecordType, ResourceRecordSet};

/// Zone being scanned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneMeta {
    pub zone_id: String,
    pub name: String,
}

/// The record a finding refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

impl From<&ResourceRecordSet> for FindingRecord {
    fn from(record: &ResourceRecordSet) -> Self {
        Self {
            name: record.name.clone(),
            record_type: record.record_type,
            alias: record.alias_target.as_ref().map(|a| a.dns_name.clone()),
            values: record.values.clone(),
        }
    }
}

/// One result of a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    /// The record can be taken over or is exploitable as is.
    Vulnerable {
        record: FindingRecord,
        reason: String,
    },
    /// The record points somewhere broken but is not exploitable.
    Misconfigured {
        record: FindingRecord,
        reason: String,
    },
}

impl Finding {
    pub fn record(&self) -> &FindingRecord {
        match self {
            Finding::Vulnerable { record, .. } | Finding::Misconfigured { record, .. } => record,
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            Finding::Vulnerable { reason, .. } | Finding::Misconfigured { reason, .. } => reason,
        }
    }

    pub fn is_vulnerable(&self) -> bool {
        matches!(self, Finding::Vulnerable { .. })
    }
}

/// Findings of one zone, in the order they were produced.
///
/// Never deduplicated: one record may be reported for several reasons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Findings {
    pub zone_id: String,
    pub name: String,
    pub findings: Vec<Finding>,
}

impl Findings {
    pub fn new(zone: &ZoneMeta) -> Self {
        Self {
            zone_id: zone.zone_id.clone(),
            name: zone.name.clone(),
            findings: Vec::new(),
        }
    }

    pub fn vulnerable(&mut self, record: &ResourceRecordSet, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(
            "{} Zone {}: {} {} {}",
            "[VULN]".red(),
            self.name,
            record.record_type,
            record.name,
            reason
        );
        self.findings.push(Finding::Vulnerable {
            record: record.into(),
            reason,
        });
    }

    pub fn misconfigured(&mut self, record: &ResourceRecordSet, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(
            "{} Zone {}: {} {} {}",
            "[MISCONFIG]".yellow(),
            self.name,
            record.record_type,
            record.name,
            reason
        );
        self.findings.push(Finding::Misconfigured {
            record: record.into(),
            reason,
        });
    }

    pub fn vulnerable_count(&self) -> usize {
        self.findings.iter().filter(|f| f.is_vulnerable()).count()
    }

    pub fn misconfigured_count(&self) -> usize {
        self.findings.len() - self.vulnerable_count()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}
