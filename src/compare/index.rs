//! Per-root file index keyed by basename.
//!
//! # Overview
//!
//! A [`RootIndex`] maps every basename found under one root to a single
//! [`FileEntry`]. The first file seen with a given name is canonical; each
//! later file with the same name is recorded as a collision, and the
//! collision list is seeded with the canonical path so that, when present,
//! it always starts with [`FileEntry::relative_path`].
//!
//! Indexing happens in two steps:
//!
//! 1. [`IndexBuilder::add`] folds discovered files in order and resolves
//!    collisions (cheap, no I/O)
//! 2. [`IndexBuilder::finish`] fingerprints only the canonical file of each
//!    name on a rayon pool and freezes the result
//!
//! # Example
//!
//! ```
//! use treecmp::compare::IndexBuilder;
//! use std::path::PathBuf;
//!
//! let mut builder = IndexBuilder::new();
//! builder.add("dup.py".into(), "a/dup.py".into(), PathBuf::from("/r/a/dup.py"));
//! builder.add("dup.py".into(), "b/dup.py".into(), PathBuf::from("/r/b/dup.py"));
//!
//! let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
//! let index = builder.finish(&pool, |_| Ok([0u8; 32])).unwrap();
//!
//! let entry = index.get("dup.py").unwrap();
//! assert_eq!(entry.relative_path, "a/dup.py");
//! assert_eq!(entry.collisions, vec!["a/dup.py", "b/dup.py"]);
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::scanner::{Hash, HashError};

/// One basename within one root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// `/`-separated path of the canonical file, relative to its root
    pub relative_path: String,
    /// Absolute path of the canonical file
    pub path: PathBuf,
    /// Content fingerprint of the canonical file
    pub fingerprint: Hash,
    /// Every relative path sharing this basename, canonical first.
    /// Empty unless the name occurs more than once in the root.
    pub collisions: Vec<String>,
}

impl FileEntry {
    /// Whether more than one file in the root carries this name.
    #[must_use]
    pub fn has_collisions(&self) -> bool {
        !self.collisions.is_empty()
    }
}

/// A canonical file whose fingerprint has not been computed yet.
#[derive(Debug, Clone)]
struct PendingEntry {
    relative_path: String,
    path: PathBuf,
    collisions: Vec<String>,
}

impl PendingEntry {
    fn into_entry(self, fingerprint: Hash) -> FileEntry {
        FileEntry {
            relative_path: self.relative_path,
            path: self.path,
            fingerprint,
            collisions: self.collisions,
        }
    }
}

/// Accumulates files for one root in discovery order.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    pending: BTreeMap<String, PendingEntry>,
    files_added: usize,
}

impl IndexBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one discovered file.
    ///
    /// Order matters: the first file added under `key` becomes canonical.
    pub fn add(&mut self, key: String, relative_path: String, path: PathBuf) {
        self.files_added += 1;

        match self.pending.get_mut(&key) {
            None => {
                self.pending.insert(
                    key,
                    PendingEntry {
                        relative_path,
                        path,
                        collisions: Vec::new(),
                    },
                );
            }
            Some(existing) => {
                if existing.collisions.is_empty() {
                    existing.collisions.push(existing.relative_path.clone());
                }
                existing.collisions.push(relative_path);
            }
        }
    }

    /// Number of files added so far, collisions included.
    #[must_use]
    pub fn files_added(&self) -> usize {
        self.files_added
    }

    /// Number of distinct basenames, i.e. files that will be fingerprinted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no file has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Fingerprint every canonical file on `pool` and freeze the index.
    ///
    /// # Errors
    ///
    /// Returns the first [`HashError`] produced by `fingerprint`; a file
    /// that cannot be read is never silently dropped from the index.
    pub fn finish<F>(self, pool: &rayon::ThreadPool, fingerprint: F) -> Result<RootIndex, HashError>
    where
        F: Fn(&Path) -> Result<Hash, HashError> + Sync,
    {
        let files_indexed = self.files_added;
        let pending: Vec<(String, PendingEntry)> = self.pending.into_iter().collect();

        let entries = pool.install(|| {
            pending
                .into_par_iter()
                .map(|(key, entry)| {
                    let hash = fingerprint(&entry.path)?;
                    Ok((key, entry.into_entry(hash)))
                })
                .collect::<Result<BTreeMap<String, FileEntry>, HashError>>()
        })?;

        Ok(RootIndex {
            entries,
            files_indexed,
        })
    }
}

/// Immutable basename → [`FileEntry`] mapping for one root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootIndex {
    entries: BTreeMap<String, FileEntry>,
    files_indexed: usize,
}

impl RootIndex {
    /// An index with no entries, used for roots that could not be walked.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Entry for a basename, if present in this root.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FileEntry> {
        self.entries.get(key)
    }

    /// Whether the basename occurs in this root.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Basenames in lexicographic order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in basename order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FileEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries whose basename occurs more than once in the root.
    pub fn collisions(&self) -> impl Iterator<Item = (&str, &FileEntry)> {
        self.iter().filter(|(_, entry)| entry.has_collisions())
    }

    /// Number of distinct basenames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of matching files walked, collisions included.
    #[must_use]
    pub fn files_indexed(&self) -> usize {
        self.files_indexed
    }
}
