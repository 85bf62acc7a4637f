//! Comparison pipeline orchestrator.
//!
//! [`Comparer::compare`] indexes every root in parallel, waits for all of
//! them, then builds one [`KeyRecord`] per basename in key order. Each root
//! is isolated: a directory that cannot be read only shrinks that root's
//! index, while a file that cannot be fingerprinted aborts the run.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Serialize, Serializer};

use super::index::{IndexBuilder, RootIndex};
use super::keys::unify_keys;
use super::record::KeyRecord;
use super::CompareError;
use crate::progress::ProgressCallback;
use crate::roots::Root;
use crate::scanner::path_utils::{basename_key, to_slash};
use crate::scanner::{HashAlgorithm, Hasher, Walker, WalkerConfig};

/// Configuration for the comparison pipeline.
#[derive(Clone)]
pub struct CompareConfig {
    /// Which files to index.
    pub walker_config: WalkerConfig,
    /// Content fingerprint algorithm.
    pub algorithm: HashAlgorithm,
    /// Number of I/O threads per root, for directory reads and hashing.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Fold basenames to NFC before keying.
    pub normalize_unicode: bool,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for CompareConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompareConfig")
            .field("walker_config", &self.walker_config)
            .field("algorithm", &self.algorithm)
            .field("io_threads", &self.io_threads)
            .field("normalize_unicode", &self.normalize_unicode)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            walker_config: WalkerConfig::default(),
            algorithm: HashAlgorithm::default(),
            io_threads: 4,
            normalize_unicode: false,
            progress_callback: None,
        }
    }
}

impl CompareConfig {
    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the suffix patterns of files to index.
    #[must_use]
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.walker_config = WalkerConfig::new(extensions);
        self
    }

    /// Set the fingerprint algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the I/O thread count (minimum 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Enable or disable NFC normalization of basenames.
    #[must_use]
    pub fn with_normalize_unicode(mut self, enabled: bool) -> Self {
        self.normalize_unicode = enabled;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Indexing statistics for one root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RootSummary {
    /// Root label
    pub label: String,
    /// Root path
    pub path: PathBuf,
    /// Whether the root could be walked at all
    pub valid: bool,
    /// Matching files found, collisions included
    pub files_indexed: usize,
    /// Distinct basenames (files fingerprinted)
    pub distinct_names: usize,
    /// Basenames occurring more than once
    pub collisions: usize,
    /// Directories skipped because they could not be read
    pub skipped_dirs: Vec<PathBuf>,
}

impl RootSummary {
    fn invalid(root: &Root) -> Self {
        Self {
            label: root.label.clone(),
            path: root.path.clone(),
            valid: false,
            ..Self::default()
        }
    }
}

/// Summary statistics from a comparison run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CompareSummary {
    /// Per-root statistics in declaration order
    pub roots: Vec<RootSummary>,
    /// Number of report rows
    pub total_keys: usize,
    /// Keys whose content differs between at least two roots
    pub divergent_keys: usize,
    /// Keys present in every root
    pub keys_everywhere: usize,
    /// Wall-clock duration of indexing and grouping
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

impl CompareSummary {
    /// Number of roots that could not be walked.
    #[must_use]
    pub fn invalid_roots(&self) -> usize {
        self.roots.iter().filter(|r| !r.valid).count()
    }

    /// Total directories skipped across all roots.
    #[must_use]
    pub fn skipped_directories(&self) -> usize {
        self.roots.iter().map(|r| r.skipped_dirs.len()).sum()
    }

    /// Total matching files across all roots.
    #[must_use]
    pub fn total_files(&self) -> usize {
        self.roots.iter().map(|r| r.files_indexed).sum()
    }

    /// Whether the report is based on incomplete input.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.invalid_roots() > 0 || self.skipped_directories() > 0
    }
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

/// Runs the index → unify → group pipeline over a set of roots.
///
/// # Example
///
/// ```no_run
/// use treecmp::compare::{CompareConfig, Comparer};
/// use treecmp::roots::Root;
///
/// let roots = vec![Root::new("a", "/src/a", true), Root::new("b", "/src/b", true)];
/// let comparer = Comparer::with_defaults();
/// match comparer.compare(&roots) {
///     Ok((records, summary)) => {
///         println!("{} keys, {} differ", records.len(), summary.divergent_keys);
///     }
///     Err(e) => eprintln!("Comparison failed: {}", e),
/// }
/// ```
#[derive(Debug)]
pub struct Comparer {
    config: CompareConfig,
    hasher: Hasher,
}

impl Comparer {
    /// Create a comparer with the given configuration.
    #[must_use]
    pub fn new(config: CompareConfig) -> Self {
        let hasher = Hasher::new().with_algorithm(config.algorithm);
        Self { config, hasher }
    }

    /// Create a comparer with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(CompareConfig::default())
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// Build the index of a single root.
    ///
    /// Invalid roots yield an empty index. Unreadable directories are
    /// recorded in the returned summary and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError::Fingerprint`] if a canonical file cannot be
    /// read, or [`CompareError::ThreadPool`] if the hashing pool cannot be
    /// created.
    pub fn index_root(&self, root: &Root) -> Result<(RootIndex, RootSummary), CompareError> {
        if !root.valid {
            log::debug!("Root {} is invalid, indexing as empty", root.label);
            return Ok((RootIndex::empty(), RootSummary::invalid(root)));
        }

        log::debug!("Indexing {} ({})", root.label, root.path.display());

        let walker = Walker::new(&root.path, self.config.walker_config.clone())
            .with_threads(self.config.io_threads);
        let (files, skipped) = walker.collect_sorted();

        let mut builder = IndexBuilder::new();
        for file in files {
            let Some(name) = file.path.file_name() else {
                continue;
            };
            let key = basename_key(name, self.config.normalize_unicode);
            log::trace!("{}: {} -> {}", root.label, file.relative_path.display(), key);
            builder.add(key, to_slash(&file.relative_path), file.path);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads)
            .build()?;

        let callback = self.config.progress_callback.as_ref();
        if let Some(cb) = callback {
            cb.on_root_start(&root.label, builder.len());
        }

        let result = builder.finish(&pool, |path| {
            let hash = self.hasher.full_hash(path);
            if let Some(cb) = callback {
                cb.on_file_hashed(&root.label, &path.to_string_lossy());
            }
            hash
        });

        if let Some(cb) = callback {
            cb.on_root_end(&root.label);
        }

        let index = result.map_err(|source| CompareError::Fingerprint {
            root: root.label.clone(),
            source,
        })?;

        for (key, entry) in index.collisions() {
            log::warn!(
                "Basename collision in {}: {} occurs {} times ({}); comparing {}",
                root.label,
                key,
                entry.collisions.len(),
                entry.collisions.join(", "),
                entry.relative_path
            );
        }

        let summary = RootSummary {
            label: root.label.clone(),
            path: root.path.clone(),
            valid: true,
            files_indexed: index.files_indexed(),
            distinct_names: index.len(),
            collisions: index.collisions().count(),
            skipped_dirs: skipped.iter().map(|e| e.path().to_path_buf()).collect(),
        };

        log::info!(
            "Indexed {}: {} files, {} names, {} collisions, {} skipped directories",
            summary.label,
            summary.files_indexed,
            summary.distinct_names,
            summary.collisions,
            summary.skipped_dirs.len()
        );

        Ok((index, summary))
    }

    /// Compare all roots and produce one record per basename.
    ///
    /// Records are sorted by key; cells within a record follow the order
    /// of `roots`.
    ///
    /// # Errors
    ///
    /// Returns the first [`CompareError`] raised while indexing any root.
    pub fn compare(
        &self,
        roots: &[Root],
    ) -> Result<(Vec<KeyRecord>, CompareSummary), CompareError> {
        let start_time = Instant::now();
        log::info!("Comparing {} root(s)", roots.len());

        let outcomes = roots
            .par_iter()
            .map(|root| self.index_root(root))
            .collect::<Result<Vec<_>, CompareError>>()?;
        let (indices, root_summaries): (Vec<RootIndex>, Vec<RootSummary>) =
            outcomes.into_iter().unzip();

        let index_refs: Vec<&RootIndex> = indices.iter().collect();
        let labels: Vec<&str> = roots.iter().map(|r| r.label.as_str()).collect();

        let keys = unify_keys(&index_refs);
        log::debug!("{} distinct basenames across all roots", keys.len());

        let records: Vec<KeyRecord> = keys
            .iter()
            .map(|key| KeyRecord::build(key, &index_refs, &labels))
            .collect();

        let summary = CompareSummary {
            roots: root_summaries,
            total_keys: records.len(),
            divergent_keys: records.iter().filter(|r| r.has_differences()).count(),
            keys_everywhere: records
                .iter()
                .filter(|r| r.cells.iter().all(Option::is_some))
                .count(),
            duration: start_time.elapsed(),
        };

        log::info!(
            "Compared {} keys in {:.2?}: {} present everywhere, {} with differing content",
            summary.total_keys,
            summary.duration,
            summary.keys_everywhere,
            summary.divergent_keys
        );

        Ok((records, summary))
    }
}
