//! Application configuration management.
//!
//! Settings are layered with figment, lowest priority first:
//!
//! 1. built-in defaults ([`Config::default`])
//! 2. a TOML file: `dupfind.toml` in the working directory, or the file
//!    passed with `--config`
//! 3. `DUPFIND_*` environment variables (`__` separates nested keys, e.g.
//!    `DUPFIND_PARTIAL_SIZES__MKV=1mb`)
//! 4. command-line flags, applied by [`Config::apply_scan_args`]
//!
//! # Example file
//!
//! ```toml
//! output_file = "report.md"
//! hash_algorithm = "sha256"
//! io_threads = 8
//!
//! [partial_sizes]
//! iso = "1mb"
//! mkv = ["64kb", "64kb"]
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::ScanArgs;
use crate::duplicates::{default_io_threads, DetectorConfig};
use crate::history::HISTORY_FILE_NAME;
use crate::scanner::hasher::PartialSizeSpec;
use crate::scanner::{HashAlgorithm, PartialSizes, ScannerConfig};

/// Config file read from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "dupfind.toml";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "DUPFIND_";

/// Default report location.
pub const DEFAULT_OUTPUT_FILE: &str = "duplicate_files_report.md";

/// Default length of the recent-folder list.
pub const DEFAULT_MAX_RECENT_FOLDERS: usize = 20;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the Markdown report is written.
    pub output_file: PathBuf,
    /// Hash function for every digest in a run.
    pub hash_algorithm: HashAlgorithm,
    /// Fingerprinting worker threads.
    pub io_threads: usize,
    /// Follow symbolic links to directories while walking.
    pub follow_symlinks: bool,
    /// How many recent folders to remember.
    pub max_recent_folders: usize,
    /// Recent-folder history location; platform data dir when unset.
    pub history_file: Option<PathBuf>,
    /// Per-extension partial reads, e.g. `mkv = ["64kb", "64kb"]`.
    pub partial_sizes: HashMap<String, PartialSizeSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            hash_algorithm: HashAlgorithm::default(),
            io_threads: default_io_threads(),
            follow_symlinks: false,
            max_recent_folders: DEFAULT_MAX_RECENT_FOLDERS,
            history_file: None,
            partial_sizes: HashMap::new(),
        }
    }
}

impl Config {
    /// Build the layered figment without extracting it.
    ///
    /// A missing default file is skipped; a missing explicit file is an
    /// error, reported by [`Config::load`].
    #[must_use]
    pub fn figment(config_file: Option<&Path>) -> Figment {
        let file = config_file.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf);
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load configuration from defaults, the config file and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file does not exist, or if
    /// any source holds a malformed or mistyped value.
    pub fn load(config_file: Option<&Path>) -> Result<Self, figment::Error> {
        if let Some(path) = config_file {
            if !path.is_file() {
                return Err(figment::Error::from(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
        }

        let config: Self = Self::figment(config_file).extract()?;
        log::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Apply command-line overrides on top of the loaded values.
    pub fn apply_scan_args(&mut self, args: &ScanArgs) {
        if let Some(ref output) = args.output {
            self.output_file.clone_from(output);
        }
        if let Some(threads) = args.io_threads {
            self.io_threads = threads;
        }
        if let Some(algorithm) = args.hash {
            self.hash_algorithm = algorithm;
        }
        if args.follow_symlinks {
            self.follow_symlinks = true;
        }
    }

    /// Walker settings.
    #[must_use]
    pub fn scanner_config(&self) -> ScannerConfig {
        ScannerConfig::default().with_follow_symlinks(self.follow_symlinks)
    }

    /// Fingerprinting pool settings.
    #[must_use]
    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig::default().with_io_threads(self.io_threads)
    }

    /// Resolved partial-read table.
    #[must_use]
    pub fn partial_sizes(&self) -> PartialSizes {
        PartialSizes::from_specs(&self.partial_sizes)
    }

    /// Where the recent-folder history lives, if anywhere.
    #[must_use]
    pub fn history_path(&self) -> Option<PathBuf> {
        self.history_file.clone().or_else(default_history_path)
    }
}

/// `recent_folders.json` in the platform data directory.
#[must_use]
pub fn default_history_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "dupfind", "dupfind")
        .map(|dirs| dirs.data_dir().join(HISTORY_FILE_NAME))
}
