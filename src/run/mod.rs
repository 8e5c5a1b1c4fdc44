//! Top-level workflows.
//!
//! Each command builds its own sessions (accounts, resolver, scanner) from the
//! parsed CLI and passes them explicitly to the workflow functions. Accounts
//! are JSON state files; commands that change an account write it back.

mod check;
mod cleanup;
mod confirm;
mod copy;
mod delete;
mod export;
mod find;
mod park;
mod scan;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;
use regex::Regex;
use tokio_util::sync::CancellationToken;

use crate::config::{Cli, Command};
use crate::initialization::{init_liveness_client, init_probe_client, init_resolver, ResolverOptions};
use crate::liveness::SystemProbe;
use crate::scan::{ReqwestProber, Scanner, ScannerOptions};
use crate::zone::{MemoryProvider, RouteManager, RouteManagerOptions};

// Re-export public API
pub use check::{check_zones, ZoneCheck};
pub use cleanup::cleanup_zone;
pub use confirm::{AssumeYes, Confirm, LinePrompt, StdinPrompt};
pub use copy::{copy_zone, CopyReport};
pub use delete::{delete_zone, DeleteOutcome};
pub use export::{default_export_path, export_zone};
pub use find::{find_records, FindMatch};
pub use park::{park, park_changes, park_zone, ParkOutcome, ParkTarget};
pub use scan::scan_zones;

/// An account state file opened for one command.
pub struct Account {
    path: PathBuf,
    provider: Arc<MemoryProvider>,
    manager: RouteManager,
}

impl Account {
    /// Loads the account at `path`. A missing file is an empty account.
    pub fn open(path: &Path, options: &RouteManagerOptions) -> Result<Self> {
        let provider = Arc::new(MemoryProvider::load(path)?);
        let manager = RouteManager::new(provider.clone(), options.clone())
            .with_registrar(provider.clone());
        Ok(Self {
            path: path.to_path_buf(),
            provider,
            manager,
        })
    }

    /// Account name used in change comments: the file stem.
    pub fn name(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn manager(&self) -> &RouteManager {
        &self.manager
    }

    /// Writes the account back to its state file.
    pub fn save(&self) -> Result<()> {
        self.provider.save(&self.path)
    }
}

/// Runs the command of `cli` until done or `cancel` fires.
///
/// # Errors
///
/// Returns the first fatal error of the command. Account-wide sweeps log
/// per-zone failures and carry on.
pub async fn run_command(cli: Cli, cancel: CancellationToken) -> Result<()> {
    let options = RouteManagerOptions {
        no_wait: cli.no_wait,
        cancel: cancel.clone(),
    };
    let resolver_options = ResolverOptions {
        servers: cli.resolvers.clone(),
        cancel,
    };
    let confirm: Box<dyn Confirm> = if cli.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(StdinPrompt::stdin())
    };

    match cli.command {
        Command::Copy {
            source,
            destination,
            domain,
            update_ns,
        } => {
            let source = Account::open(&source, &options)?;
            let destination = Account::open(&destination, &options)?;
            copy_zone(
                source.manager(),
                &source.name(),
                destination.manager(),
                &domain,
                update_ns,
                cli.dry,
            )
            .await?;
            if !cli.dry {
                destination.save()?;
            }
        }
        Command::Delete {
            account,
            domain,
            force,
        } => {
            let account = Account::open(&account, &options)?;
            let resolver = init_resolver(&resolver_options)?;
            let outcome = delete_zone(
                account.manager(),
                resolver.as_ref(),
                confirm.as_ref(),
                &domain,
                force,
                cli.dry,
            )
            .await?;
            if matches!(outcome, DeleteOutcome::Deleted { .. }) {
                account.save()?;
            }
        }
        Command::CheckZone { account, target } => {
            let account = Account::open(&account, &options)?;
            let resolver = init_resolver(&resolver_options)?;
            let checks =
                check_zones(account.manager(), resolver.as_ref(), target.domain.as_deref()).await?;
            let mismatched = checks.iter().filter(|check| !check.matches()).count();
            info!("{} zones checked, {mismatched} with different NS servers", checks.len());
        }
        Command::CleanupZone { account, domain } => {
            let account = Account::open(&account, &options)?;
            let probe = Arc::new(SystemProbe::new(init_liveness_client()?));
            for record in cleanup_zone(account.manager(), probe, &domain).await? {
                println!(
                    "{} {} {}",
                    record.name,
                    record.record_type,
                    record.destination().unwrap_or_default()
                );
            }
        }
        Command::Park(args) => {
            let account = Account::open(&args.account, &options)?;
            let target = ParkTarget::from_args(args.alias, &args.targets)?;
            info!("Parking domains in {}...", account.name());
            park(
                account.manager(),
                confirm.as_ref(),
                args.target.domain.as_deref(),
                &target,
                args.force,
                cli.dry,
            )
            .await?;
            if !cli.dry {
                account.save()?;
            }
        }
        Command::Scan {
            account,
            target,
            json,
        } => {
            let account = Account::open(&account, &options)?;
            let scanner = Scanner::new(
                init_resolver(&resolver_options)?,
                Arc::new(ReqwestProber::new(init_probe_client()?)),
                ScannerOptions::default(),
            );
            let findings = scan_zones(account.manager(), &scanner, target.domain.as_deref()).await?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&findings).context("Failed to serialize findings")?
                );
            }
        }
        Command::Find { account, key } => {
            let account = Account::open(&account, &options)?;
            let pattern = Regex::new(&key).with_context(|| format!("Invalid pattern {key}"))?;
            for found in find_records(account.manager(), &pattern).await? {
                println!("{found}");
            }
        }
        Command::Export {
            account,
            zone,
            output,
        } => {
            let account = Account::open(&account, &options)?;
            export_zone(account.manager(), &zone, output.as_deref(), cli.dry).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
