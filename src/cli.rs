//! Command-line interface definitions for dupfind.
//!
//! This module defines all CLI arguments, subcommands, and options using the clap derive API.
//! Global options control verbosity and error formatting; subcommands select the operation.
//!
//! # Example
//!
//! ```bash
//! # Scan a directory and write duplicate_files_report.md
//! dupfind scan ~/Downloads
//!
//! # Pick a folder from the recent list instead
//! dupfind scan
//!
//! # Custom report path, SHA-256 digests, 2 hashing threads
//! dupfind scan ~/Downloads --output dl.md --hash sha256 --io-threads 2
//!
//! # Verbose mode for debugging
//! dupfind -v scan ~/Downloads
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::scanner::HashAlgorithm;

/// Find duplicate files and write a Markdown report.
///
/// dupfind groups files by size, fingerprints only files that share a size,
/// and lists every file whose content matches an earlier one.
#[derive(Debug, Parser)]
#[command(name = "dupfind")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for dupfind.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a directory for duplicate files
    Scan(ScanArgs),
    /// List recently scanned folders
    Recent(RecentArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory path to scan for duplicates
    ///
    /// When omitted, recently scanned folders are listed and one is read
    /// from standard input.
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Report file to write (default: duplicate_files_report.md)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Configuration file (default: ./dupfind.toml if present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of threads used for fingerprinting
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Hash algorithm for content digests
    #[arg(long, value_enum, value_name = "ALGO")]
    pub hash: Option<HashAlgorithm>,

    /// Follow symbolic links to directories during the walk
    ///
    /// Warning: May revisit files if symlinks form cycles.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Do not add the scanned folder to the recent list
    #[arg(long)]
    pub no_history: bool,
}

/// Arguments for the recent subcommand.
#[derive(Debug, Args)]
pub struct RecentArgs {
    /// Configuration file (default: ./dupfind.toml if present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}
