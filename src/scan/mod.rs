//! Subdomain takeover and mail hygiene scanning.
//!
//! This module provides:
//! - [`Scanner`], which runs the mail checks and every [`Detector`] over a zone
//! - HTTP probe classification ([`Prober`], [`ReqwestProber`])
//! - SPF/DMARC checks
//! - The [`Findings`] model

mod detectors;
mod findings;
mod mail;
mod probe;

use std::sync::Arc;

use colored::Colorize;
use log::info;
use strum::IntoEnumIterator;

use crate::dns::Resolve;
use crate::domain::normalize_domain;
use crate::zone::{RecordType, ResourceRecordSet};

// Re-export public API
pub use detectors::{Detector, Outcome};
pub use findings::{Finding, FindingRecord, Findings, ZoneMeta};
pub use mail::{check_dmarc, check_spf, MailIssue, Severity};
pub use probe::{classify_error_message, ProbeError, Prober, ReqwestProber};

/// Which check families a [`Scanner`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannerOptions {
    pub mail_checks: bool,
    pub takeover_checks: bool,
}

impl Default for ScannerOptions {
    fn default() -> Self {
        Self {
            mail_checks: true,
            takeover_checks: true,
        }
    }
}

/// A scanning session. Owns its resolver and prober.
pub struct Scanner {
    resolver: Arc<dyn Resolve>,
    prober: Arc<dyn Prober>,
    options: ScannerOptions,
}

impl Scanner {
    pub fn new(resolver: Arc<dyn Resolve>, prober: Arc<dyn Prober>, options: ScannerOptions) -> Self {
        Self {
            resolver,
            prober,
            options,
        }
    }

    /// Scans the records of one zone.
    ///
    /// Never fails: probe errors become findings or are logged and skipped.
    pub async fn scan(&self, zone: &ZoneMeta, records: &[ResourceRecordSet]) -> Findings {
        let mut findings = Findings::new(zone);
        info!("Checking zone {}", zone.name.bold());

        if self.options.mail_checks {
            info!(" - {}...", "Checking mail vulnerabilities".bold());
            check_mail(&mut findings, records);
        }

        if self.options.takeover_checks {
            info!(" - {}...", "Checking subdomain takeover".bold());
            for record in records {
                self.check_record(&mut findings, record).await;
            }
        }

        findings
    }

    async fn check_record(&self, findings: &mut Findings, record: &ResourceRecordSet) {
        for detector in Detector::iter() {
            match detector
                .run(record, self.resolver.as_ref(), self.prober.as_ref())
                .await
            {
                Outcome::Vulnerable(reason) => findings.vulnerable(record, reason),
                Outcome::Misconfigured(reason) => findings.misconfigured(record, reason),
                Outcome::NotApplicable | Outcome::Clean => {}
            }
        }
    }
}

/// Runs SPF and DMARC checks once per distinct MX name, reporting issues on
/// the MX record.
fn check_mail(findings: &mut Findings, records: &[ResourceRecordSet]) {
    let mut seen: Vec<String> = Vec::new();
    for mx in records.iter().filter(|r| r.record_type == RecordType::Mx) {
        let name = normalize_domain(&mx.name);
        if seen.contains(&name) {
            continue;
        }

        let issues = check_spf(&name, records)
            .into_iter()
            .chain(check_dmarc(&name, records));
        for issue in issues {
            match issue.severity {
                Severity::Vulnerable => findings.vulnerable(mx, issue.message),
                Severity::Misconfigured => findings.misconfigured(mx, issue.message),
            }
        }
        seen.push(name);
    }
}
