//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Command-line interface.
///
/// Accounts are JSON state files holding the hosted zones, records, tags and
/// registered domains of one provider account.
#[derive(Debug, Parser)]
#[command(name = "zone_warden", version, about = "Manage and audit hosted DNS zones")]
pub struct Cli {
    /// Log level
    #[arg(long, value_enum, default_value = "info", global = true)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value = "plain", global = true)]
    pub log_format: LogFormat,

    /// Resolver to query (repeatable, only the first one is used)
    #[arg(long = "resolver", global = true)]
    pub resolvers: Vec<String>,

    /// Do not wait for changes to propagate
    #[arg(long, global = true)]
    pub no_wait: bool,

    /// Report what would be done without changing anything
    #[arg(long, global = true)]
    pub dry: bool,

    /// Answer yes to every confirmation prompt
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Copy the records of a zone from one account to another
    Copy {
        /// Source account state file
        source: PathBuf,
        /// Destination account state file
        destination: PathBuf,
        /// Zone to copy
        domain: String,
        /// Point the registrar at the destination nameservers
        #[arg(long)]
        update_ns: bool,
    },
    /// Safely remove a zone and its records
    Delete {
        /// Account state file
        account: PathBuf,
        /// Zone to delete
        domain: String,
        /// Delete even if the zone is still delegated
        #[arg(long)]
        force: bool,
    },
    /// Compare public nameservers with the zone NS records
    CheckZone {
        /// Account state file
        account: PathBuf,
        #[command(flatten)]
        target: ZoneTarget,
    },
    /// List records pointing at hosts that no longer answer
    CleanupZone {
        /// Account state file
        account: PathBuf,
        /// Zone to sweep
        domain: String,
    },
    /// Park zones with apex and www records
    Park(ParkArgs),
    /// Scan zones for subdomain takeover and mail misconfiguration
    Scan {
        /// Account state file
        account: PathBuf,
        #[command(flatten)]
        target: ZoneTarget,
        /// Print findings as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search every record for a pattern
    Find {
        /// Account state file
        account: PathBuf,
        /// Regular expression matched against names, aliases and values
        key: String,
    },
    /// Export a zone to a zone file
    Export {
        /// Account state file
        account: PathBuf,
        /// Zone to export
        zone: String,
        /// Output path (default: <zone>-<timestamp>.zone)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// One zone (`-d`) or every zone in the account.
#[derive(Debug, Clone, Args)]
pub struct ZoneTarget {
    /// Only this zone
    #[arg(short = 'd', long = "domain")]
    pub domain: Option<String>,
}

/// Arguments of the `park` subcommand.
#[derive(Debug, Clone, Args)]
pub struct ParkArgs {
    /// Account state file
    pub account: PathBuf,
    #[command(flatten)]
    pub target: ZoneTarget,
    /// Park zones that already hold records
    #[arg(long)]
    pub force: bool,
    /// Park with an alias: <hostname> <zone-id>
    #[arg(long)]
    pub alias: bool,
    /// Destination IPs, or hostname and zone id with --alias
    #[arg(required = true)]
    pub targets: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_cli_parses_copy() {
        let cli = Cli::try_parse_from([
            "zone_warden",
            "copy",
            "src.json",
            "dst.json",
            "example.com",
            "--update-ns",
        ])
        .unwrap();
        match cli.command {
            Command::Copy {
                domain, update_ns, ..
            } => {
                assert_eq!(domain, "example.com");
                assert!(update_ns);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "zone_warden",
            "scan",
            "acct.json",
            "-d",
            "example.com",
            "--no-wait",
            "--resolver",
            "1.1.1.1",
        ])
        .unwrap();
        assert!(cli.no_wait);
        assert_eq!(cli.resolvers, vec!["1.1.1.1".to_string()]);
        match cli.command {
            Command::Scan { target, json, .. } => {
                assert_eq!(target.domain.as_deref(), Some("example.com"));
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_park_requires_targets() {
        let result = Cli::try_parse_from(["zone_warden", "park", "acct.json"]);
        assert!(result.is_err());
    }
}
