//! Directory walker implementation using jwalk.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing one root and
//! collecting every file whose name ends with one of the configured
//! suffixes.
//!
//! # Features
//!
//! - Optional parallel directory reading on a dedicated rayon pool
//! - Hidden files and directories are pruned, symlinks are never followed
//! - Siblings are sorted by name, and [`Walker::collect_sorted`] sorts the
//!   final list by relative path so discovery order is reproducible
//! - Unreadable directories are reported as [`ScanError`] values and skipped
//!
//! # Example
//!
//! ```no_run
//! use treecmp::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/src/project"), WalkerConfig::default());
//! let (files, skipped) = walker.collect_sorted();
//! println!("{} files, {} unreadable directories", files.len(), skipped.len());
//! ```

use std::io;
use std::path::{Path, PathBuf};

use jwalk::{Parallelism, WalkDir};

use super::{DiscoveredFile, ScanError, WalkerConfig};

/// Directory walker for suffix-filtered file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Directory-reading threads (1 = serial)
    threads: usize,
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use treecmp::scanner::{Walker, WalkerConfig};
    /// use std::path::Path;
    ///
    /// let walker = Walker::new(Path::new("."), WalkerConfig::default());
    /// ```
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            threads: 1,
        }
    }

    /// Read directories on a dedicated pool of `threads` workers.
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Root this walker traverses.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the directory tree, yielding matching files.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration, so one unreadable directory never hides the rest of
    /// the tree.
    pub fn walk(&self) -> impl Iterator<Item = Result<DiscoveredFile, ScanError>> + '_ {
        let parallelism = if self.threads > 1 {
            Parallelism::RayonNewPool(self.threads)
        } else {
            Parallelism::Serial
        };

        let walk_dir = WalkDir::new(&self.root)
            .follow_links(false)
            .skip_hidden(true)
            .parallelism(parallelism)
            .process_read_dir(|_depth, _path, _read_dir_state, children| {
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        walk_dir
            .into_iter()
            .filter_map(move |entry_result| match entry_result {
                Ok(mut entry) => {
                    let path = entry.path();

                    // jwalk reports an unreadable directory on its own entry
                    // rather than as an `Err` item.
                    if let Some(error) = entry.read_children_error.take() {
                        return Some(Err(from_jwalk_error(path, error)));
                    }

                    if path == self.root {
                        return None;
                    }

                    let file_type = entry.file_type();

                    if file_type.is_symlink() {
                        log::trace!("Skipping symlink: {}", path.display());
                        return None;
                    }

                    if !file_type.is_file() {
                        return None;
                    }

                    let name = entry.file_name().to_string_lossy();
                    if !self.config.matches(&name) {
                        return None;
                    }

                    let relative_path = match path.strip_prefix(&self.root) {
                        Ok(rel) => rel.to_path_buf(),
                        Err(_) => {
                            log::debug!("Entry outside root: {}", path.display());
                            return None;
                        }
                    };

                    log::trace!("Matched: {}", relative_path.display());
                    Some(Ok(DiscoveredFile::new(path, relative_path)))
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), std::borrow::ToOwned::to_owned);
                    Some(Err(from_jwalk_error(path, e)))
                }
            })
    }

    /// Walk the tree and return matching files sorted by relative path,
    /// together with every directory that had to be skipped.
    ///
    /// Sorting makes "first file with a given name" independent of how the
    /// directory reads were scheduled.
    #[must_use]
    pub fn collect_sorted(&self) -> (Vec<DiscoveredFile>, Vec<ScanError>) {
        let mut files = Vec::new();
        let mut skipped = Vec::new();

        for result in self.walk() {
            match result {
                Ok(file) => files.push(file),
                Err(e) => skipped.push(e),
            }
        }

        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        (files, skipped)
    }
}

/// Convert a jwalk error into a [`ScanError`], logging it.
fn from_jwalk_error(path: PathBuf, error: jwalk::Error) -> ScanError {
    let source = match error.io_error() {
        Some(io_error) => io::Error::new(io_error.kind(), error.to_string()),
        None => io::Error::other(error.to_string()),
    };
    skipped_directory(path, source)
}

/// Classify a failure to read `path`. Permission and I/O failures are
/// logged as warnings; entries that vanished mid-walk only at debug level.
fn skipped_directory(path: PathBuf, error: io::Error) -> ScanError {
    match error.kind() {
        io::ErrorKind::PermissionDenied => {
            log::warn!("Permission denied, skipping: {}", path.display());
            ScanError::PermissionDenied(path)
        }
        io::ErrorKind::NotFound => {
            log::debug!("Vanished during walk: {}", path.display());
            ScanError::NotFound(path)
        }
        _ => {
            log::warn!("Cannot read {}, skipping: {}", path.display(), error);
            ScanError::Io {
                path,
                source: error,
            }
        }
    }
}
