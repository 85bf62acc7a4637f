//! Cross-tree comparison engine.
//!
//! # Overview
//!
//! This module turns N roots into one [`KeyRecord`] per basename:
//!
//! 1. **Index** every root (see [`index`]): walk, fold same-name files into
//!    collisions, fingerprint canonical files
//! 2. **Unify** the basenames of all indices into a sorted key list (see
//!    [`keys`])
//! 3. **Group** each key's fingerprints into equivalence groups and
//!    **classify** its presence (see [`groups`])
//!
//! [`Comparer`] runs the whole pipeline.
//!
//! # Example
//!
//! ```no_run
//! use treecmp::compare::{CompareConfig, Comparer};
//! use treecmp::roots::{resolve_roots, LabelStyle};
//!
//! let (roots, _) = resolve_roots(vec!["a".into(), "b".into()], LabelStyle::Ordinal);
//! let comparer = Comparer::new(CompareConfig::default().with_io_threads(2));
//! let (records, summary) = comparer.compare(&roots).unwrap();
//!
//! for record in records.iter().filter(|r| r.has_differences()) {
//!     println!("{}: {}", record.key, record.group_summary);
//! }
//! println!("{} keys", summary.total_keys);
//! ```

pub mod comparer;
pub mod groups;
pub mod index;
pub mod keys;
pub mod record;

pub use comparer::{CompareConfig, CompareSummary, Comparer, RootSummary};
pub use groups::{GroupAssignment, Status};
pub use index::{FileEntry, IndexBuilder, RootIndex};
pub use keys::unify_keys;
pub use record::{KeyRecord, RootCell};

use crate::scanner::HashError;

/// Errors that abort a comparison run.
#[derive(thiserror::Error, Debug)]
pub enum CompareError {
    /// A canonical file could not be fingerprinted.
    #[error("cannot fingerprint file in root '{root}': {source}")]
    Fingerprint {
        /// Label of the root holding the file
        root: String,
        /// The underlying hashing error, carrying the file path
        #[source]
        source: HashError,
    },

    /// The hashing thread pool could not be created.
    #[error("failed to build hashing thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
