//! Scanner behavior over whole zones, with scripted DNS and HTTP answers.

mod helpers;

use std::sync::Arc;

use helpers::{alias, record, FakeProber, FakeResolver};
use zone_warden::scan::{check_dmarc, Finding, ProbeError, Scanner, ScannerOptions, Severity, ZoneMeta};
use zone_warden::zone::RecordType;

fn zone() -> ZoneMeta {
    ZoneMeta {
        zone_id: "/hostedzone/Z1".to_string(),
        name: "example.com.".to_string(),
    }
}

fn scanner(resolver: FakeResolver, prober: Arc<FakeProber>) -> Scanner {
    Scanner::new(Arc::new(resolver), prober, ScannerOptions::default())
}

#[tokio::test]
async fn test_mixed_zone_findings() {
    let prober = Arc::new(
        FakeProber::default()
            .with("assets.example.com.s3-website-us-east-1.amazonaws.com", Ok(true))
            .with("cdn.example.com.", Err(ProbeError::InvalidCertificate)),
    );
    let resolver = FakeResolver::default().missing("old.example.com.");
    let records = vec![
        record("example.com.", RecordType::A, &["192.0.2.1"]),
        record("example.com.", RecordType::Mx, &["10 mail.example.com."]),
        record("example.com.", RecordType::Txt, &["\"v=spf1 -all\""]),
        record("_dmarc.example.com.", RecordType::Txt, &["\"v=DMARC1; p=none\""]),
        record(
            "assets.example.com.",
            RecordType::Cname,
            &["assets.example.com.s3-website-us-east-1.amazonaws.com."],
        ),
        alias("cdn.example.com.", RecordType::A, "d111111abcdef8.cloudfront.net."),
        record("old.example.com.", RecordType::Cname, &["old-app.example.net."]),
    ];

    let findings = scanner(resolver, prober.clone()).scan(&zone(), &records).await;

    let summary: Vec<(bool, &str, &str)> = findings
        .findings
        .iter()
        .map(|f| (f.is_vulnerable(), f.record().name.as_str(), f.reason()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (
                true,
                "example.com.",
                "DMARC policy is none, which allows spoofed emails"
            ),
            (true, "assets.example.com.", "dangling reference"),
            (false, "cdn.example.com.", "Invalid SSL certificate"),
            (true, "old.example.com.", "points to missing name"),
        ]
    );
    assert_eq!(findings.vulnerable_count(), 3);
    assert_eq!(findings.misconfigured_count(), 1);
}

#[tokio::test]
async fn test_disabled_checks_produce_nothing() {
    let prober = Arc::new(FakeProber::default());
    let records = vec![
        record("example.com.", RecordType::Mx, &["10 mail.example.com."]),
        record("gone.example.com.", RecordType::Cname, &["gone.example.net."]),
    ];
    let scanner = Scanner::new(
        Arc::new(FakeResolver::default().missing("gone.example.com.")),
        prober.clone(),
        ScannerOptions {
            mail_checks: false,
            takeover_checks: false,
        },
    );

    let findings = scanner.scan(&zone(), &records).await;
    assert!(findings.is_empty());
    assert!(prober.calls().is_empty());
}

#[tokio::test]
async fn test_resolver_failure_is_not_a_finding() {
    let records = vec![record("flaky.example.com.", RecordType::Cname, &["flaky.example.net."])];
    let findings = scanner(
        FakeResolver::default().failing("flaky.example.com."),
        Arc::new(FakeProber::default()),
    )
    .scan(&zone(), &records)
    .await;
    assert!(findings.is_empty());
}

#[tokio::test]
async fn test_findings_json_shape() {
    let records = vec![record("gone.example.com.", RecordType::Cname, &["gone.example.net."])];
    let findings = scanner(
        FakeResolver::default().missing("gone.example.com."),
        Arc::new(FakeProber::default()),
    )
    .scan(&zone(), &records)
    .await;

    let json = serde_json::to_value(&findings).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "zone_id": "/hostedzone/Z1",
            "name": "example.com.",
            "findings": [{
                "kind": "vulnerable",
                "record": {
                    "name": "gone.example.com.",
                    "type": "CNAME",
                    "values": ["gone.example.net."]
                },
                "reason": "points to missing name"
            }]
        })
    );
    let parsed: Vec<Finding> = serde_json::from_value(json["findings"].clone()).unwrap();
    assert_eq!(parsed, findings.findings);
}

#[test]
fn test_dmarc_missing_and_duplicated() {
    let none = check_dmarc("example.com.", &[]);
    assert_eq!(none.len(), 1);
    assert_eq!(none[0].severity, Severity::Misconfigured);
    assert_eq!(none[0].message, "no DMARC record");

    let records = vec![record(
        "_dmarc.example.com.",
        RecordType::Txt,
        &["\"v=DMARC1; p=reject\"", "\"v=DMARC1; p=quarantine\""],
    )];
    let duplicated = check_dmarc("example.com.", &records);
    assert_eq!(duplicated[0].message, "multiple DMARC records");
}
