//! Progress reporting utilities using indicatif.
//!
//! This module provides the [`ProgressCallback`] trait that the scanner and
//! detector notify, and [`Progress`], which renders those notifications as a
//! spinner for the walk and a `processed/total` bar for fingerprinting.
//! Progress is advisory only: nothing in the pipeline depends on it.

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Progress callback for the scan pipeline.
///
/// Implement this trait to receive progress updates during traversal
/// (`"walking"`) and fingerprinting (`"hashing"`).
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase (`"walking"` or `"hashing"`)
    /// * `total` - Total number of items to process (0 if unknown)
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called as items are processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Number of items processed so far
    /// * `path` - Path most recently processed
    fn on_progress(&self, current: usize, path: &str);

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);
}

/// Progress reporter using indicatif.
pub struct Progress {
    multi: MultiProgress,
    walking: Mutex<Option<ProgressBar>>,
    hashing: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress bars will be displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use dupfind::progress::Progress;
    ///
    /// let progress = Progress::new(false);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            walking: Mutex::new(None),
            hashing: Mutex::new(None),
            quiet,
        }
    }

    fn walking_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn hashing_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn slot(&self, phase: &str) -> Option<&Mutex<Option<ProgressBar>>> {
        match phase {
            "walking" => Some(&self.walking),
            "hashing" => Some(&self.hashing),
            _ => None,
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        let pb = match phase {
            "walking" => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::walking_style());
                pb.set_message("Walking directory");
                pb.enable_steady_tick(Duration::from_millis(100));
                pb
            }
            _ => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::hashing_style());
                pb.set_message("Fingerprinting");
                pb
            }
        };

        if let Some(slot) = self.slot(phase) {
            if let Ok(mut guard) = slot.lock() {
                *guard = Some(pb);
            }
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        if self.quiet {
            return;
        }

        let display_msg = truncate_path(path, 30);
        for slot in [&self.hashing, &self.walking] {
            if let Ok(guard) = slot.lock() {
                if let Some(ref pb) = *guard {
                    pb.set_position(current as u64);
                    pb.set_message(display_msg.clone());
                    return;
                }
            }
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }

        let Some(slot) = self.slot(phase) else {
            return;
        };
        if let Some(pb) = slot.lock().ok().and_then(|mut guard| guard.take()) {
            match phase {
                "walking" => pb.finish_with_message("Walking complete"),
                _ => pb.finish_with_message("Fingerprinting complete"),
            }
        }
    }
}

/// Truncate a path for display in the progress bar.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let name_len = file_name.chars().count();
    if name_len >= max_len {
        let tail: String = file_name.chars().skip(name_len - (max_len - 3)).collect();
        return format!("...{tail}");
    }

    format!(".../{file_name}")
}
