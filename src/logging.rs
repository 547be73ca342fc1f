//! Logging infrastructure for dupfind.
//!
//! This module provides structured logging using the `log` facade and `env_logger` backend.
//! Log levels are determined by (in priority order):
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. CLI flags: `--quiet` (error only) or `--verbose` (debug/trace)
//! 3. Default: info level
//!
//! Unreadable files are reported at warn level, so they stay visible by
//! default and disappear with `--quiet`.
//!
//! # Build-specific Formatting
//!
//! - **Debug builds**: Include timestamp, level, and (with `-v`) module path
//! - **Release builds**: Compact format with level and message only for cleaner output
//!
//! # Example
//!
//! ```rust,no_run
//! use dupfind::logging::init_logging;
//!
//! // Initialize with default (info) level, colors allowed
//! init_logging(0, false, false);
//!
//! // Initialize with trace mode (-vv)
//! init_logging(2, false, false);
//!
//! // Initialize with quiet mode (errors only), no colors
//! init_logging(0, true, true);
//! ```

use env_logger::{Builder, WriteStyle};
use log::LevelFilter;
use std::env;
use std::io::Write;

/// Initialize the logging subsystem based on CLI flags.
///
/// Call once at startup. Later calls leave the first logger in place.
///
/// # Arguments
///
/// * `verbose` - Verbosity count from CLI (0=normal, 1=debug, 2+=trace)
/// * `quiet` - If true, only show errors (overridden by RUST_LOG)
/// * `no_color` - If true, never emit ANSI styles
pub fn init_logging(verbose: u8, quiet: bool, no_color: bool) {
    let rust_log = env::var("RUST_LOG").ok();

    let mut builder = Builder::new();

    if rust_log.is_some() {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }

    if no_color {
        builder.write_style(WriteStyle::Never);
    }

    configure_format(&mut builder, verbose);

    if builder.try_init().is_err() {
        log::debug!("Logger already initialized");
        return;
    }

    match rust_log {
        Some(filters) => log::debug!("Logging initialized from RUST_LOG: {}", filters),
        None => log::debug!(
            "Logging initialized at level: {:?}",
            determine_level(verbose, quiet)
        ),
    }
}

/// Determine the log level from CLI flags.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Configure the log format based on build type and verbosity.
fn configure_format(builder: &mut Builder, verbose: u8) {
    #[cfg(debug_assertions)]
    {
        builder.format(move |buf, record| {
            let timestamp = buf.timestamp_seconds();
            let level = record.level();
            let level_style = buf.default_level_style(level);

            if verbose >= 1 {
                writeln!(
                    buf,
                    "{} {level_style}{:<5}{level_style:#} [{}] {}",
                    timestamp,
                    level,
                    record.module_path().unwrap_or("unknown"),
                    record.args()
                )
            } else {
                writeln!(
                    buf,
                    "{} {level_style}{:<5}{level_style:#} {}",
                    timestamp,
                    level,
                    record.args()
                )
            }
        });
    }

    #[cfg(not(debug_assertions))]
    {
        let _ = verbose;
        builder.format(|buf, record| {
            let level = record.level();
            let level_style = buf.default_level_style(level);
            writeln!(
                buf,
                "{level_style}{:<5}{level_style:#} {}",
                level,
                record.args()
            )
        });
    }
}

/// Get the current log level as a string.
pub fn current_level_name() -> &'static str {
    match log::max_level() {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}
