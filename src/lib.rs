//! dupfind - Duplicate File Finder
//!
//! A command-line tool that walks a directory tree once, fingerprints only
//! files that share an exact size, and writes a Markdown report listing every
//! duplicate alongside per-folder sizes and file counts.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod history;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{Cli, Commands, RecentArgs, ScanArgs};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, FinderConfig};
use crate::error::ExitCode;
use crate::history::RecentFolders;
use crate::output::MarkdownReport;
use crate::progress::Progress;

/// Run the command selected on the command line.
///
/// # Errors
///
/// Returns an error for fatal problems: an unusable configuration, a root
/// that cannot be scanned, or a report that cannot be written.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet, cli.no_color);
    log::debug!("Log level: {}", logging::current_level_name());

    match cli.command {
        Commands::Scan(args) => run_scan(&args, cli.quiet),
        Commands::Recent(args) => run_recent(&args),
    }
}

fn run_scan(args: &ScanArgs, quiet: bool) -> Result<ExitCode> {
    let mut config =
        Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    config.apply_scan_args(args);

    let mut history = config
        .history_path()
        .map(|path| RecentFolders::load(path, config.max_recent_folders));

    let root = match args.path.clone() {
        Some(path) => path,
        None => {
            let Some(ref history) = history else {
                println!("No recent folders found.");
                return Ok(ExitCode::GeneralError);
            };
            let stdin = io::stdin();
            match prompt_for_folder(history, &mut stdin.lock(), &mut io::stdout())? {
                Some(path) => path,
                None => return Ok(ExitCode::GeneralError),
            }
        }
    };

    if !args.no_history {
        if let Some(ref mut history) = history {
            history.record(&root);
            match history.save() {
                Ok(()) => log::info!("Updated recent folders with: {}", root.display()),
                Err(e) => log::warn!("{}", e),
            }
        }
    }

    let progress = Arc::new(Progress::new(quiet));
    let finder_config = FinderConfig {
        scanner: config.scanner_config(),
        detector: config.detector_config(),
        hash_algorithm: config.hash_algorithm,
        partial_sizes: config.partial_sizes(),
    }
    .with_progress_callback(progress);

    let result = DuplicateFinder::new(finder_config)
        .find_duplicates(&root)
        .with_context(|| format!("Failed to scan {}", root.display()))?;

    MarkdownReport::new(&result.sets, &result.scan.folders, result.scan.total_files)
        .write_to(&config.output_file)?;

    let summary = &result.summary;
    if !quiet {
        println!("Total unique file sizes found: {}", summary.unique_sizes);
        println!(
            "Total duplicates found: {} ({} reclaimable)",
            summary.duplicate_files,
            summary.reclaimable_display()
        );
        println!(
            "Duplicate files report generated: {}",
            config.output_file.display()
        );
    }
    log::debug!("Scan finished in {:.2?}", summary.scan_duration);

    Ok(if summary.has_errors() {
        ExitCode::PartialSuccess
    } else if result.sets.is_empty() {
        ExitCode::NoDuplicates
    } else {
        ExitCode::Success
    })
}

fn run_recent(args: &RecentArgs) -> Result<ExitCode> {
    let config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    let history = config
        .history_path()
        .map(|path| RecentFolders::load(path, config.max_recent_folders));

    match history {
        Some(history) if !history.is_empty() => {
            for (i, folder) in history.folders().iter().enumerate() {
                println!("{}. {}", i + 1, folder.display());
            }
        }
        _ => println!("No recent folders found."),
    }
    Ok(ExitCode::Success)
}

/// List recent folders on `output` and read a 1-based choice from `input`.
///
/// Returns `None` when the history is empty or the choice is not a listed
/// number.
///
/// # Errors
///
/// Returns an error if reading input or writing the menu fails.
pub fn prompt_for_folder<R: BufRead, W: Write>(
    history: &RecentFolders,
    input: &mut R,
    output: &mut W,
) -> io::Result<Option<PathBuf>> {
    if history.is_empty() {
        writeln!(output, "No recent folders found.")?;
        return Ok(None);
    }

    writeln!(output, "Choose a folder from the list below:")?;
    for (i, folder) in history.folders().iter().enumerate() {
        writeln!(output, "{}. {}", i + 1, folder.display())?;
    }
    write!(output, "Enter the number of the folder to scan: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    match history.choose(&line) {
        Some(folder) => Ok(Some(folder.to_path_buf())),
        None => {
            writeln!(output, "Invalid choice.")?;
            Ok(None)
        }
    }
}
