//! zone_warden library: hosted DNS zone management and auditing
//!
//! This library copies, parks and deletes hosted zones, waits for record
//! changes to propagate, and audits zones for dangling records (subdomain
//! takeover candidates), weak SPF/DMARC setups and records pointing at
//! hosts that are no longer alive.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use zone_warden::run::Account;
//! use zone_warden::zone::RouteManagerOptions;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let account = Account::open(Path::new("prod.json"), &RouteManagerOptions::default())?;
//! for zone in account.manager().list_zones().await? {
//!     println!("{} ({} records)", zone.name, zone.record_count);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime.

pub mod config;
pub mod dns;
pub mod domain;
pub mod error_handling;
pub mod initialization;
pub mod liveness;
pub mod run;
pub mod scan;
pub mod utils;
pub mod waiter;
pub mod zone;

// Re-export public API
pub use config::{Cli, Command, LogFormat, LogLevel};
pub use error_handling::{ResolveError, ZoneError};
pub use run::run_command;
pub use scan::{Finding, Findings, Scanner, ScannerOptions};
pub use zone::{ChangeSet, HostedZone, RecordType, ResourceRecordSet, RouteManager};
