//! Zone-file export.
//!
//! Writes a master-file style text export of a zone. Alias records have no
//! zone-file form: they are listed in the header comments instead.

use std::collections::HashMap;
use std::fmt::Write as _;

use super::types::{RecordType, ResourceRecordSet};
use crate::config::EXPORT_FALLBACK_TTL;
use crate::domain::{denormalize_domain, normalize_domain, relative_label};

/// Most frequent TTL among non-NS records. Ties go to the smallest TTL.
pub fn most_common_ttl<'a, I>(records: I) -> i64
where
    I: IntoIterator<Item = &'a ResourceRecordSet>,
{
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for record in records
        .into_iter()
        .filter(|r| r.record_type != RecordType::Ns)
    {
        if let Some(ttl) = record.ttl {
            *counts.entry(ttl).or_default() += record.values.len().max(1);
        }
    }
    counts
        .into_iter()
        .max_by(|(ttl_a, count_a), (ttl_b, count_b)| count_a.cmp(count_b).then(ttl_b.cmp(ttl_a)))
        .map(|(ttl, _)| ttl)
        .unwrap_or(EXPORT_FALLBACK_TTL)
}

fn type_rank(record_type: RecordType) -> u8 {
    match record_type {
        RecordType::Soa => 0,
        RecordType::Ns => 1,
        _ => 2,
    }
}

/// Renders `records` of zone `zone` as zone-file text.
pub fn render_zone_file(zone: &str, records: &[ResourceRecordSet]) -> String {
    let origin = normalize_domain(zone);
    let mut skipped: Vec<String> = Vec::new();
    let mut plain: Vec<&ResourceRecordSet> = Vec::new();

    for record in records {
        match &record.alias_target {
            Some(alias) => skipped.push(format!(
                "{} {} -> {}",
                record.name, record.record_type, alias.dns_name
            )),
            None if record.values.is_empty() => {}
            None => plain.push(record),
        }
    }
    skipped.sort();

    let default_ttl = most_common_ttl(plain.iter().copied());

    let mut lines: Vec<(bool, String, u8, String, String)> = Vec::new();
    for record in plain {
        let label = relative_label(&record.name, &origin);
        let ttl = match record.ttl {
            Some(ttl) if ttl != default_ttl => format!(" {ttl}"),
            _ => String::new(),
        };
        for value in &record.values {
            lines.push((
                label != "@",
                label.clone(),
                type_rank(record.record_type),
                record.record_type.to_string(),
                format!("{label}{ttl} IN {} {}", record.record_type, value.trim()),
            ));
        }
    }
    // Stable sort keeps value order within a record set.
    lines.sort_by(|a, b| (a.0, &a.1, a.2, &a.3).cmp(&(b.0, &b.1, b.2, &b.3)));

    let mut out = String::new();
    let _ = writeln!(
        out,
        "; Exported by zone_warden. Zone: {}",
        denormalize_domain(&origin)
    );
    if !skipped.is_empty() {
        out.push_str("; NOTE: The following alias records were skipped (not supported in zone files):\n");
        for line in &skipped {
            let _ = writeln!(out, ";   {line}");
        }
    }
    let _ = writeln!(out, "$ORIGIN {origin}");
    let _ = writeln!(out, "$TTL {default_ttl}");
    for (.., line) in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::types::AliasTarget;

    fn record(name: &str, record_type: RecordType, ttl: i64, values: &[&str]) -> ResourceRecordSet {
        ResourceRecordSet::new(
            name,
            record_type,
            ttl,
            values.iter().map(|v| v.to_string()).collect(),
        )
    }

    #[test]
    fn test_most_common_ttl_ignores_ns() {
        let records = vec![
            record("example.com.", RecordType::Ns, 172_800, &["a.", "b.", "c.", "d."]),
            record("example.com.", RecordType::A, 300, &["192.0.2.1"]),
            record("www.example.com.", RecordType::A, 300, &["192.0.2.2"]),
            record("mail.example.com.", RecordType::A, 60, &["192.0.2.3"]),
        ];
        assert_eq!(most_common_ttl(&records), 300);
    }

    #[test]
    fn test_most_common_ttl_tie_and_fallback() {
        let records = vec![
            record("a.example.com.", RecordType::A, 600, &["192.0.2.1"]),
            record("b.example.com.", RecordType::A, 60, &["192.0.2.2"]),
        ];
        assert_eq!(most_common_ttl(&records), 60);
        assert_eq!(most_common_ttl(&Vec::<ResourceRecordSet>::new()), EXPORT_FALLBACK_TTL);
    }

    #[test]
    fn test_render_zone_file() {
        let records = vec![
            record("www.example.com.", RecordType::Cname, 60, &["example.com."]),
            record("example.com.", RecordType::A, 300, &["192.0.2.1", "192.0.2.2"]),
            record("example.com.", RecordType::Ns, 172_800, &["ns1.example.net."]),
            ResourceRecordSet::alias(
                "cdn.example.com.",
                RecordType::A,
                AliasTarget {
                    hosted_zone_id: "Z2FDTNDATAQYW2".to_string(),
                    dns_name: "d1.cloudfront.net.".to_string(),
                    evaluate_target_health: false,
                },
            ),
        ];

        let text = render_zone_file("example.com", &records);
        let expected = "\
; Exported by zone_warden. Zone: example.com
; NOTE: The following alias records were skipped (not supported in zone files):
;   cdn.example.com. A -> d1.cloudfront.net.
$ORIGIN example.com.
$TTL 300
@ 172800 IN NS ns1.example.net.
@ IN A 192.0.2.1
@ IN A 192.0.2.2
www 60 IN CNAME example.com.
";
        assert_eq!(text, expected);
    }
}
