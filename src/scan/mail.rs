//! SPF and DMARC presence and policy checks.
//!
//! Both checks only look at TXT records whose name matches exactly; they never
//! resolve anything.

use crate::domain::normalize_domain;
use crate::zone::{RecordType, ResourceRecordSet};

const SPF_VERSION_TAG: &str = "v=spf1";
const DMARC_VERSION_TAG: &str = "v=DMARC1";
const ENFORCING_POLICIES: &[&str] = &["reject", "quarantine"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Misconfigured,
    Vulnerable,
}

/// One mail hygiene problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailIssue {
    pub severity: Severity,
    pub message: String,
}

impl MailIssue {
    fn misconfigured(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Misconfigured,
            message: message.into(),
        }
    }

    fn vulnerable(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Vulnerable,
            message: message.into(),
        }
    }
}

/// TXT values published at exactly `name`, unquoted.
fn txt_values<'a>(name: &str, records: &'a [ResourceRecordSet]) -> impl Iterator<Item = String> + 'a {
    let name = normalize_domain(name);
    records
        .iter()
        .filter(move |r| r.record_type == RecordType::Txt && normalize_domain(&r.name) == name)
        .flat_map(|r| r.values.iter())
        .map(|v| unquote(v))
}

/// Joins the character-strings of a TXT value: `"a" "b"` becomes `ab`.
fn unquote(value: &str) -> String {
    let value = value.trim();
    if !value.starts_with('"') {
        return value.to_string();
    }
    value
        .split('"')
        .enumerate()
        .filter(|(i, _)| i % 2 == 1)
        .map(|(_, part)| part)
        .collect()
}

/// Checks the SPF records of mail domain `name`.
pub fn check_spf(name: &str, records: &[ResourceRecordSet]) -> Vec<MailIssue> {
    let mut count = 0;
    let mut issues = Vec::new();
    for value in txt_values(name, records).filter(|v| v.contains(SPF_VERSION_TAG)) {
        count += 1;
        issues.extend(spf_policy_issues(&value));
    }

    match count {
        0 => issues.insert(0, MailIssue::misconfigured("no SPF record")),
        1 => {}
        _ => issues.insert(0, MailIssue::misconfigured("multiple SPF records")),
    }
    issues
}

/// Policy checks of a single SPF record. Mechanism chains are not evaluated.
fn spf_policy_issues(_record: &str) -> Vec<MailIssue> {
    Vec::new()
}

/// Checks the DMARC records published at `_dmarc.<name>`.
pub fn check_dmarc(name: &str, records: &[ResourceRecordSet]) -> Vec<MailIssue> {
    let dmarc_name = format!("_dmarc.{}", normalize_domain(name));
    let mut count = 0;
    let mut issues = Vec::new();
    for value in txt_values(&dmarc_name, records).filter(|v| v.contains(DMARC_VERSION_TAG)) {
        count += 1;
        issues.extend(dmarc_policy_issues(&value));
    }

    match count {
        0 => issues.insert(0, MailIssue::misconfigured("no DMARC record")),
        1 => {}
        _ => issues.insert(0, MailIssue::misconfigured("multiple DMARC records")),
    }
    issues
}

fn dmarc_policy_issues(record: &str) -> Vec<MailIssue> {
    let mut issues = Vec::new();
    for term in record.split(';') {
        let Some((tag, value)) = term.split_once('=') else {
            continue;
        };
        let (tag, value) = (tag.trim(), value.trim());
        match tag {
            "p" | "sp" if !ENFORCING_POLICIES.contains(&value) => {
                let scope = if tag == "p" { "policy" } else { "subdomain policy" };
                issues.push(MailIssue::vulnerable(format!(
                    "DMARC {scope} is {value}, which allows spoofed emails"
                )));
            }
            "pct" => {
                let pct = value.parse::<i64>().ok();
                // Zero and negative values are both out of range and below 100.
                if let Some(pct) = pct.filter(|pct| *pct < 100) {
                    issues.push(MailIssue::vulnerable(format!(
                        "DMARC policy is only applied to {pct}% of emails"
                    )));
                }
                if !pct.is_some_and(|pct| pct > 0 && pct <= 100) {
                    issues.push(MailIssue::vulnerable(format!(
                        "DMARC policy pct has invalid value: {value}"
                    )));
                }
            }
            _ => {}
        }
    }
    issues
}
