use super::*;
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error_handling::ResolveError;
use crate::zone::AliasTarget;

/// Answers every query with data unless the name is listed as missing.
#[derive(Default)]
struct FakeResolver {
    missing: Vec<(String, RecordType)>,
    failing: Vec<String>,
}

impl FakeResolver {
    fn missing(mut self, name: &str, record_type: RecordType) -> Self {
        self.missing.push((name.to_string(), record_type));
        self
    }

    fn failing(mut self, name: &str) -> Self {
        self.failing.push(name.to_string());
        self
    }
}

#[async_trait]
impl Resolve for FakeResolver {
    async fn resolve(&self, domain: &str, record_type: RecordType) -> Result<Vec<String>, ResolveError> {
        if self.failing.iter().any(|n| n == domain) {
            return Err(ResolveError::Failed {
                domain: domain.to_string(),
                classification: "SERVFAIL".to_string(),
            });
        }
        if self
            .missing
            .iter()
            .any(|(n, t)| n == domain && *t == record_type)
        {
            return Err(ResolveError::NotFound {
                domain: domain.to_string(),
            });
        }
        Ok(vec!["192.0.2.1".to_string()])
    }

    async fn nameservers(&self, _domain: &str) -> Result<Vec<String>, ResolveError> {
        Ok(Vec::new())
    }
}

/// Scripted probe results per host; unknown hosts are clean.
#[derive(Default)]
struct FakeProber {
    results: HashMap<String, Result<bool, ProbeError>>,
    calls: Mutex<Vec<String>>,
}

impl FakeProber {
    fn with(mut self, host: &str, result: Result<bool, ProbeError>) -> Self {
        self.results.insert(host.to_string(), result);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Prober for FakeProber {
    async fn missing_bucket(&self, host: &str) -> Result<bool, ProbeError> {
        self.calls.lock().unwrap().push(host.to_string());
        self.results.get(host).cloned().unwrap_or(Ok(false))
    }
}

fn zone() -> ZoneMeta {
    ZoneMeta {
        zone_id: "/hostedzone/Z1".to_string(),
        name: "example.com.".to_string(),
    }
}

fn cname(name: &str, target: &str) -> ResourceRecordSet {
    ResourceRecordSet::new(name, RecordType::Cname, 300, vec![target.to_string()])
}

fn alias(name: &str, record_type: RecordType, dns_name: &str) -> ResourceRecordSet {
    ResourceRecordSet::alias(
        name,
        record_type,
        AliasTarget {
            hosted_zone_id: "Z2FDTNDATAQYW2".to_string(),
            dns_name: dns_name.to_string(),
            evaluate_target_health: false,
        },
    )
}

fn takeover_only() -> ScannerOptions {
    ScannerOptions {
        mail_checks: false,
        takeover_checks: true,
    }
}

async fn scan_with(
    resolver: FakeResolver,
    prober: Arc<FakeProber>,
    records: &[ResourceRecordSet],
) -> Findings {
    Scanner::new(Arc::new(resolver), prober, takeover_only())
        .scan(&zone(), records)
        .await
}

const BUCKET: &str = "assets.example.com.s3-website-us-east-1.amazonaws.com";

#[tokio::test]
async fn test_missing_bucket_is_one_vulnerable_finding() {
    let prober = Arc::new(FakeProber::default().with(BUCKET, Ok(true)));
    let records = vec![cname("assets.example.com.", &format!("{BUCKET}."))];

    let findings = scan_with(FakeResolver::default(), prober.clone(), &records).await;

    assert_eq!(findings.vulnerable_count(), 1);
    assert_eq!(findings.misconfigured_count(), 0);
    assert_eq!(findings.findings[0].reason(), "dangling reference");
    assert_eq!(prober.calls(), vec![BUCKET.to_string()]);
}

#[tokio::test]
async fn test_tls_handshake_failure_is_one_misconfiguration() {
    let prober = Arc::new(FakeProber::default().with(BUCKET, Err(ProbeError::SslNotConfigured)));
    let records = vec![cname("assets.example.com.", BUCKET)];

    let findings = scan_with(FakeResolver::default(), prober, &records).await;

    assert_eq!(findings.vulnerable_count(), 0);
    assert_eq!(findings.misconfigured_count(), 1);
    assert_eq!(findings.findings[0].reason(), "SSL not configured");
}

#[tokio::test]
async fn test_unclassified_probe_error_is_clean() {
    let prober = Arc::new(
        FakeProber::default().with(BUCKET, Err(ProbeError::Other("connection reset".into()))),
    );
    let records = vec![cname("assets.example.com.", BUCKET)];

    let findings = scan_with(FakeResolver::default(), prober, &records).await;
    assert!(findings.is_empty());
}

#[tokio::test]
async fn test_detectors_do_not_short_circuit() {
    // Both the storage probe and the resolution check flag the same record.
    let prober = Arc::new(FakeProber::default().with(BUCKET, Ok(true)));
    let resolver = FakeResolver::default().missing("assets.example.com.", RecordType::A);
    let records = vec![cname("assets.example.com.", BUCKET)];

    let findings = scan_with(resolver, prober, &records).await;

    let reasons: Vec<&str> = findings.findings.iter().map(|f| f.reason()).collect();
    assert_eq!(reasons, vec!["dangling reference", "points to missing name"]);
    assert!(findings
        .findings
        .iter()
        .all(|f| f.record().name == "assets.example.com."));
}

#[tokio::test]
async fn test_cdn_alias_probes_record_name_and_skips_aaaa() {
    let prober = Arc::new(FakeProber::default().with("cdn.example.com.", Ok(true)));
    let records = vec![
        alias("cdn.example.com.", RecordType::A, "d111111abcdef8.cloudfront.net."),
        alias("cdn.example.com.", RecordType::Aaaa, "d111111abcdef8.cloudfront.net."),
    ];

    let findings = scan_with(FakeResolver::default(), prober.clone(), &records).await;

    assert_eq!(findings.vulnerable_count(), 1);
    assert_eq!(findings.findings[0].record().record_type, RecordType::A);
    assert_eq!(prober.calls(), vec!["cdn.example.com.".to_string()]);
}

#[tokio::test]
async fn test_forbidden_cdn_cname_is_misconfigured() {
    let prober = Arc::new(FakeProber::default().with("www.example.com.", Err(ProbeError::Forbidden)));
    let records = vec![cname("www.example.com.", "d111111abcdef8.cloudfront.net.")];

    let findings = scan_with(FakeResolver::default(), prober, &records).await;
    assert_eq!(findings.misconfigured_count(), 1);
    assert_eq!(findings.findings[0].reason(), "Forbidden");
}

#[tokio::test]
async fn test_paas_cname_needs_cname_confirmation() {
    let records = vec![cname("app.example.com.", "app-prod.us-east-1.elasticbeanstalk.com.")];

    // NXDOMAIN for A, but the CNAME itself is still published.
    let resolver = FakeResolver::default().missing("app.example.com.", RecordType::A);
    let findings = scan_with(resolver, Arc::new(FakeProber::default()), &records).await;
    let reasons: Vec<&str> = findings.findings.iter().map(|f| f.reason()).collect();
    assert_eq!(
        reasons,
        vec!["PaaS environment does not exist", "points to missing name"]
    );

    // Neither A nor CNAME: only the generic resolution check fires.
    let resolver = FakeResolver::default()
        .missing("app.example.com.", RecordType::A)
        .missing("app.example.com.", RecordType::Cname);
    let findings = scan_with(resolver, Arc::new(FakeProber::default()), &records).await;
    let reasons: Vec<&str> = findings.findings.iter().map(|f| f.reason()).collect();
    assert_eq!(reasons, vec!["points to missing name"]);
}

#[tokio::test]
async fn test_paas_alias_missing_environment() {
    let records = vec![alias(
        "app.example.com.",
        RecordType::A,
        "app-prod.us-east-1.elasticbeanstalk.com.",
    )];
    let resolver = FakeResolver::default().missing("app.example.com.", RecordType::A);

    let findings = scan_with(resolver, Arc::new(FakeProber::default()), &records).await;
    assert_eq!(findings.vulnerable_count(), 2);
}

#[tokio::test]
async fn test_non_nxdomain_resolution_failure_is_clean() {
    let resolver = FakeResolver::default().failing("old.example.com.");
    let records = vec![cname("old.example.com.", "legacy.example.net.")];

    let findings = scan_with(resolver, Arc::new(FakeProber::default()), &records).await;
    assert!(findings.is_empty());
}

#[tokio::test]
async fn test_plain_records_are_not_probed() {
    let prober = Arc::new(FakeProber::default());
    let records = vec![
        ResourceRecordSet::new("example.com.", RecordType::A, 300, vec!["192.0.2.1".into()]),
        ResourceRecordSet::new("example.com.", RecordType::Txt, 300, vec!["\"hello\"".into()]),
    ];

    let findings = scan_with(FakeResolver::default(), prober.clone(), &records).await;
    assert!(findings.is_empty());
    assert!(prober.calls().is_empty());
}

#[tokio::test]
async fn test_mail_checks_run_once_per_mx_name() {
    let records = vec![
        ResourceRecordSet::new("example.com.", RecordType::Mx, 300, vec!["10 mx1.example.net.".into()]),
        ResourceRecordSet::new("example.com", RecordType::Mx, 300, vec!["20 mx2.example.net.".into()]),
        ResourceRecordSet::new(
            "_dmarc.example.com.",
            RecordType::Txt,
            300,
            vec!["\"v=DMARC1; p=none\"".into()],
        ),
    ];
    let scanner = Scanner::new(
        Arc::new(FakeResolver::default()),
        Arc::new(FakeProber::default()),
        ScannerOptions {
            mail_checks: true,
            takeover_checks: false,
        },
    );

    let findings = scanner.scan(&zone(), &records).await;

    let reasons: Vec<&str> = findings.findings.iter().map(|f| f.reason()).collect();
    assert_eq!(
        reasons,
        vec!["no SPF record", "DMARC policy is none, which allows spoofed emails"]
    );
    assert_eq!(findings.vulnerable_count(), 1);
    assert!(findings
        .findings
        .iter()
        .all(|f| f.record().record_type == RecordType::Mx));
}

#[test]
fn test_findings_serialize_with_kind_tag() {
    let mut findings = Findings::new(&zone());
    findings.misconfigured(&cname("www.example.com.", BUCKET), "Forbidden");

    let json = serde_json::to_value(&findings).unwrap();
    assert_eq!(json["zone_id"], "/hostedzone/Z1");
    assert_eq!(json["findings"][0]["kind"], "misconfigured");
    assert_eq!(json["findings"][0]["record"]["type"], "CNAME");
    assert_eq!(json["findings"][0]["reason"], "Forbidden");
}

#[test]
fn test_detector_order_is_fixed() {
    let names: Vec<String> = Detector::iter().map(|d| d.to_string()).collect();
    assert_eq!(
        names,
        vec![
            "cdn-alias",
            "cdn-cname",
            "paas-alias",
            "paas-cname",
            "object-storage-cname",
            "object-storage-alias",
            "cname-resolves",
            "alias-resolves",
        ]
    );
}
