//! Progress reporting utilities using indicatif.
//!
//! This module provides the [`ProgressCallback`] trait the comparison
//! pipeline reports through, and [`Progress`], which renders one bar per
//! root on stderr while that root's files are fingerprinted.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Progress callback for the per-root indexing phase.
///
/// Roots are indexed concurrently, so every call names the root it is
/// about.
pub trait ProgressCallback: Send + Sync {
    /// Called once a root has been walked and fingerprinting starts.
    ///
    /// # Arguments
    ///
    /// * `root` - Label of the root
    /// * `total` - Number of files that will be fingerprinted
    fn on_root_start(&self, root: &str, total: usize);

    /// Called after each file has been fingerprinted.
    ///
    /// # Arguments
    ///
    /// * `root` - Label of the root
    /// * `path` - Path of the file just hashed
    fn on_file_hashed(&self, root: &str, path: &str);

    /// Called when a root's index is complete.
    fn on_root_end(&self, root: &str);
}

/// Progress reporter using indicatif.
pub struct Progress {
    multi: MultiProgress,
    bars: Mutex<HashMap<String, ProgressBar>>,
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress {
    /// Create a progress reporter drawing to stderr.
    ///
    /// # Examples
    ///
    /// ```
    /// use treecmp::progress::Progress;
    ///
    /// let progress = Progress::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    /// Create a reporter that draws nowhere; useful in tests.
    #[must_use]
    pub fn hidden() -> Self {
        Self::with_draw_target(ProgressDrawTarget::hidden())
    }

    fn with_draw_target(target: ProgressDrawTarget) -> Self {
        Self {
            multi: MultiProgress::with_draw_target(target),
            bars: Mutex::new(HashMap::new()),
        }
    }

    /// Number of bars currently active.
    #[must_use]
    pub fn active_bars(&self) -> usize {
        self.bars.lock().map_or(0, |bars| bars.len())
    }

    fn hashing_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{prefix:>12.bold} [{bar:30.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }
}

impl ProgressCallback for Progress {
    fn on_root_start(&self, root: &str, total: usize) {
        let pb = self.multi.add(ProgressBar::new(total as u64));
        pb.set_style(Self::hashing_style());
        pb.set_prefix(root.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));

        if let Ok(mut bars) = self.bars.lock() {
            bars.insert(root.to_string(), pb);
        }
    }

    fn on_file_hashed(&self, root: &str, path: &str) {
        if let Ok(bars) = self.bars.lock() {
            if let Some(pb) = bars.get(root) {
                pb.inc(1);
                pb.set_message(truncate_path(path, 30));
            }
        }
    }

    fn on_root_end(&self, root: &str) {
        let finished = self.bars.lock().ok().and_then(|mut bars| bars.remove(root));
        if let Some(pb) = finished {
            pb.finish_with_message("done");
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
    if name_len + 4 > max_len {
        let tail: String = file_name
            .chars()
            .skip(name_len.saturating_sub(max_len.saturating_sub(3)))
            .collect();
        return format!("...{tail}");
    }

    format!(".../{file_name}")
}
