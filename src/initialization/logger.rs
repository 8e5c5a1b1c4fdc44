//! Logger initialization.
//!
//! This module provides functions to initialize the logger with custom formatting.

use std::io::Write;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::*;
use log::LevelFilter;

/// Initializes the logger with the specified level and format.
///
/// Configures `env_logger` with custom formatting. Supports both plain text
/// (colored level and target) and JSON lines for structured logging.
///
/// The logger reads from the `RUST_LOG` environment variable by default, but
/// the provided `level` parameter will override it. This allows developers to
/// use `RUST_LOG=debug` for quick debugging while still supporting explicit
/// CLI control via `--log-level`.
///
/// # Arguments
///
/// * `level` - Minimum log level to display (overrides `RUST_LOG` if set)
/// * `format` - Log format (Plain or Json)
///
/// # Returns
///
/// `Ok(())` if initialization succeeds, or an error if logger setup fails.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if logger initialization fails.
///
/// # Examples
///
/// ```bash
/// # Use RUST_LOG for quick debugging
/// RUST_LOG=debug zone_warden scan account.json
///
/// # Per-module filtering via RUST_LOG
/// RUST_LOG=zone_warden=debug,reqwest=info zone_warden scan account.json
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(true);

    // Read from RUST_LOG environment variable first, then override with CLI arg
    let mut builder = env_logger::Builder::from_default_env();
    configure(&mut builder, level, format);

    // try_init() fails instead of panicking when a logger is already installed
    builder.try_init().map_err(InitializationError::from)?;

    Ok(())
}

/// Applies the level, per-crate filters and output format to `builder`.
fn configure(builder: &mut env_logger::Builder, level: LevelFilter, format: LogFormat) {
    // CLI-provided level takes precedence over RUST_LOG
    builder.filter_level(level);
    builder.filter_module("reqwest", LevelFilter::Info);
    builder.filter_module("hyper", LevelFilter::Info);
    builder.filter_module("hyper_util", LevelFilter::Info);
    // Truncated or malformed UDP answers are retried by the resolver; their
    // warnings are noise.
    builder.filter_module("hickory_proto", LevelFilter::Error);
    builder.filter_module("hickory_resolver", LevelFilter::Warn);
    builder.filter_module("zone_warden", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{{\"ts\":{},\"level\":\"{}\",\"target\":\"{}\",\"msg\":{}}}",
                    chrono::Utc::now().timestamp_millis(),
                    record.level(),
                    record.target(),
                    serde_json::to_string(&record.args().to_string())
                        .unwrap_or_else(|_| "\"\"".into())
                )
            });
        }
        LogFormat::Plain => {
            builder.format(|buf, record| {
                let level = record.level();
                let colored_level = match level {
                    log::Level::Error => level.to_string().red(),
                    log::Level::Warn => level.to_string().yellow(),
                    log::Level::Info => level.to_string().green(),
                    log::Level::Debug => level.to_string().blue(),
                    log::Level::Trace => level.to_string().purple(),
                };

                writeln!(
                    buf,
                    "{} [{}] {}",
                    record.target().cyan(),
                    colored_level,
                    record.args()
                )
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{Level, Record};

    fn logger(level: LevelFilter) -> env_logger::Logger {
        let mut builder = env_logger::Builder::new();
        configure(&mut builder, level, LogFormat::Plain);
        builder.build()
    }

    fn passes(logger: &env_logger::Logger, target: &str, level: Level) -> bool {
        logger.matches(&Record::builder().target(target).level(level).build())
    }

    #[test]
    fn test_crate_target_follows_cli_level() {
        let debug = logger(LevelFilter::Debug);
        assert!(passes(&debug, "zone_warden::scan", Level::Debug));
        assert!(!passes(&debug, "zone_warden::scan", Level::Trace));

        let warn = logger(LevelFilter::Warn);
        assert!(passes(&warn, "zone_warden::zone::manager", Level::Warn));
        assert!(!passes(&warn, "zone_warden::zone::manager", Level::Info));
    }

    #[test]
    fn test_dependency_noise_is_capped() {
        let trace = logger(LevelFilter::Trace);
        assert!(!passes(&trace, "hyper::proto", Level::Debug));
        assert!(passes(&trace, "reqwest::connect", Level::Info));
        assert!(!passes(&trace, "hickory_proto::udp", Level::Warn));
        assert!(passes(&trace, "hickory_proto::udp", Level::Error));
        assert!(!passes(&trace, "hickory_resolver", Level::Info));
    }

    #[test]
    fn test_second_init_reports_logger_error() {
        let _ = init_logger_with(LevelFilter::Info, LogFormat::Plain);
        let result = init_logger_with(LevelFilter::Info, LogFormat::Json);
        assert!(matches!(result, Err(InitializationError::LoggerError(_))));
    }
}
