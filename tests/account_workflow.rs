//! End-to-end command runs against account state files.

mod helpers;

use clap::Parser;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use helpers::{apex_infrastructure, record};
use zone_warden::zone::{MemoryProvider, RecordType, Tag};
use zone_warden::{run_command, Cli};

fn account_with(dir: &TempDir, file: &str, zones: &[(&str, bool)]) -> std::path::PathBuf {
    let provider = MemoryProvider::default();
    for (zone, populated) in zones {
        let apex = format!("{zone}.");
        let mut records = Vec::new();
        if *populated {
            records.push(record(&apex, RecordType::A, &["198.51.100.7"]));
            records.push(record(&format!("www.{apex}"), RecordType::Cname, &[apex.as_str()]));
            records.extend(apex_infrastructure(&apex, &["ns1.example.net."]));
        }
        provider.insert_zone(zone, records);
    }
    let path = dir.path().join(file);
    provider.save(&path).unwrap();
    path
}

async fn run(args: &[&str]) -> anyhow::Result<()> {
    let cli = Cli::try_parse_from(std::iter::once("zone_warden").chain(args.iter().copied()))?;
    run_command(cli, CancellationToken::new()).await
}

#[tokio::test]
async fn test_park_command_updates_state_file() {
    let dir = TempDir::new().unwrap();
    let path = account_with(&dir, "prod.json", &[("parked.example", false), ("busy.example", true)]);
    let path_arg = path.to_str().unwrap();

    run(&["--yes", "park", path_arg, "192.0.2.10", "2001:db8::10"])
        .await
        .unwrap();

    let state = MemoryProvider::load(&path).unwrap().snapshot();
    let parked = state.zones.iter().find(|z| z.name == "parked.example.").unwrap();
    let mut types: Vec<RecordType> = parked.records.iter().map(|r| r.record_type).collect();
    types.sort();
    assert_eq!(types, vec![RecordType::A, RecordType::Aaaa, RecordType::Cname]);
    assert_eq!(parked.tags, vec![Tag::new("parked", "true")]);

    // Zones holding records are left alone without --force.
    let busy = state.zones.iter().find(|z| z.name == "busy.example.").unwrap();
    assert_eq!(busy.records.len(), 4);
    assert!(busy.tags.is_empty());
}

#[tokio::test]
async fn test_dry_park_leaves_state_file_untouched() {
    let dir = TempDir::new().unwrap();
    let path = account_with(&dir, "prod.json", &[("parked.example", false)]);
    let before = std::fs::read_to_string(&path).unwrap();

    run(&["--dry", "park", path.to_str().unwrap(), "192.0.2.10"])
        .await
        .unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[tokio::test]
async fn test_copy_command_writes_destination() {
    let dir = TempDir::new().unwrap();
    let source = account_with(&dir, "source.json", &[("example.com", true)]);
    let destination = dir.path().join("destination.json");

    run(&[
        "copy",
        source.to_str().unwrap(),
        destination.to_str().unwrap(),
        "example.com",
    ])
    .await
    .unwrap();

    let state = MemoryProvider::load(&destination).unwrap().snapshot();
    assert_eq!(state.zones.len(), 1);
    let zone = &state.zones[0];
    assert_eq!(zone.name, "example.com.");
    assert!(zone
        .records
        .iter()
        .any(|r| r.name == "www.example.com." && r.record_type == RecordType::Cname));
    // NS and SOA come from the destination, not the source.
    let ns = zone.records.iter().find(|r| r.record_type == RecordType::Ns).unwrap();
    assert!(!ns.values.contains(&"ns1.example.net.".to_string()));
}

#[tokio::test]
async fn test_export_command_writes_zone_file() {
    let dir = TempDir::new().unwrap();
    let path = account_with(&dir, "prod.json", &[("example.com", true)]);
    let output = dir.path().join("example.zone");

    run(&[
        "export",
        path.to_str().unwrap(),
        "example.com",
        "-o",
        output.to_str().unwrap(),
    ])
    .await
    .unwrap();

    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.contains("$ORIGIN example.com."));
    assert!(text.contains("@ IN A 198.51.100.7"));
}

#[tokio::test]
async fn test_missing_zone_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = account_with(&dir, "prod.json", &[("example.com", true)]);

    let err = run(&["export", path.to_str().unwrap(), "example.org"])
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("hosted zone not found: example.org"));
}
