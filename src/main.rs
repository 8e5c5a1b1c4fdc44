//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `zone_warden` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Ctrl-C cancellation
//!
//! All core functionality is implemented in the library crate.

use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;
use tokio_util::sync::CancellationToken;

use zone_warden::initialization::init_logger_with;
use zone_warden::{run_command, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logger_with(cli.log_level.clone().into(), cli.log_format.clone())
        .context("Failed to initialize logger")?;

    // Ctrl-C cancels pending propagation waits
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling pending waits");
            signal_cancel.cancel();
        }
    });

    if let Err(e) = run_command(cli, cancel).await {
        eprintln!("zone_warden error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}
