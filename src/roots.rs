//! Root descriptors: collection, de-duplication, labelling and validation.
//!
//! Roots arrive as raw strings from the command line and from an optional
//! list file. They are de-duplicated by their raw text (first occurrence
//! wins), labelled, and checked. A root that is missing or is not a
//! directory is reported and kept as an *invalid* root: it still gets its
//! report columns, it simply never has any file.
//!
//! # Example
//!
//! ```no_run
//! use treecmp::roots::{resolve_roots, LabelStyle};
//!
//! let (roots, problems) = resolve_roots(
//!     vec!["../proj_a".to_string(), "../proj_b".to_string()],
//!     LabelStyle::Path,
//! );
//! for root in &roots {
//!     println!("{} -> {}", root.label, root.path.display());
//! }
//! assert!(problems.is_empty() || roots.iter().any(|r| !r.valid));
//! ```

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Label used when a path yields no usable characters.
const FALLBACK_LABEL: &str = "proj";

/// Number of trailing path components used for path-derived labels.
const LABEL_COMPONENTS: usize = 2;

/// Errors concerning the set of roots.
#[derive(Debug, Error)]
pub enum RootError {
    /// No root was given at all.
    #[error("no roots given: pass ROOT arguments or --list FILE")]
    NoRoots,

    /// A declared root does not exist.
    #[error("root does not exist, treating as empty: {0}")]
    NotFound(PathBuf),

    /// A declared root exists but is not a directory.
    #[error("root is not a directory, treating as empty: {0}")]
    NotADirectory(PathBuf),

    /// The `--list` file could not be read.
    #[error("cannot read root list {path}: {source}")]
    ListFile {
        /// The list file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// How report column labels are derived from root paths.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LabelStyle {
    /// Slug of the last two path components (`work_proj_a`)
    #[default]
    Path,
    /// Position in declaration order (`p1`, `p2`, ...)
    Ordinal,
}

/// One directory tree under comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Root {
    /// Unique label used in column names and summaries
    pub label: String,
    /// Canonical path for valid roots, the path as given otherwise
    pub path: PathBuf,
    /// Whether the root exists and is a directory
    pub valid: bool,
}

impl Root {
    /// Create a root descriptor.
    #[must_use]
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>, valid: bool) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
            valid,
        }
    }
}

/// Read root paths from a list file: one per line, blank lines and lines
/// starting with `#` ignored, surrounding whitespace trimmed.
///
/// # Errors
///
/// Returns [`RootError::ListFile`] if the file cannot be read as UTF-8.
pub fn read_list_file(path: &Path) -> Result<Vec<String>, RootError> {
    let content = fs::read_to_string(path).map_err(|source| RootError::ListFile {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Remove repeated entries, keeping the first occurrence of each.
#[must_use]
pub fn dedupe(paths: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    paths
        .into_iter()
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

/// Reduce text to `[0-9A-Za-z_]`, collapsing every other run to `_`.
///
/// # Example
///
/// ```
/// use treecmp::roots::slugify;
///
/// assert_eq!(slugify("my-app/v2.0"), "my_app_v2_0");
/// assert_eq!(slugify("..."), "proj");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    static NON_WORD: OnceLock<Regex> = OnceLock::new();
    let re = NON_WORD.get_or_init(|| Regex::new(r"[^0-9A-Za-z_]+").expect("static regex"));

    let slug = re.replace_all(text, "_");
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        FALLBACK_LABEL.to_string()
    } else {
        slug.to_string()
    }
}

/// Slug of the last `keep` normal components of a path.
#[must_use]
pub fn short_name(path: &Path, keep: usize) -> String {
    let parts: Vec<String> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    let start = parts.len().saturating_sub(keep);
    slugify(&parts[start..].join("_"))
}

/// Make labels unique by suffixing repeats with `_2`, `_3`, ...
///
/// # Example
///
/// ```
/// use treecmp::roots::make_unique;
///
/// let labels = make_unique(vec!["a".into(), "b".into(), "a".into(), "a".into()]);
/// assert_eq!(labels, vec!["a", "b", "a_2", "a_3"]);
/// ```
#[must_use]
pub fn make_unique(names: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut used: HashSet<String> = HashSet::new();
    names
        .into_iter()
        .map(|name| {
            let count = counts.entry(name.clone()).or_insert(0);
            let mut label = name.clone();
            // A suffixed label may itself have been taken by an earlier name.
            while used.contains(&label) {
                *count += 1;
                label = format!("{name}_{}", *count + 1);
            }
            used.insert(label.clone());
            label
        })
        .collect()
}

/// Label, canonicalize and validate raw root paths.
///
/// Returns every root in declaration order, invalid ones included, plus
/// one [`RootError`] per invalid root. Problems are also logged as
/// warnings.
#[must_use]
pub fn resolve_roots(raw: Vec<String>, style: LabelStyle) -> (Vec<Root>, Vec<RootError>) {
    let mut problems = Vec::new();
    let mut checked: Vec<(PathBuf, bool)> = Vec::with_capacity(raw.len());

    for entry in &raw {
        let given = PathBuf::from(entry);
        match fs::metadata(&given) {
            Ok(meta) if meta.is_dir() => {
                let canonical = fs::canonicalize(&given).unwrap_or_else(|e| {
                    log::debug!("Cannot canonicalize {}: {}", given.display(), e);
                    given.clone()
                });
                checked.push((canonical, true));
            }
            Ok(_) => {
                let err = RootError::NotADirectory(given.clone());
                log::warn!("{err}");
                problems.push(err);
                checked.push((given, false));
            }
            Err(_) => {
                let err = RootError::NotFound(given.clone());
                log::warn!("{err}");
                problems.push(err);
                checked.push((given, false));
            }
        }
    }

    let labels = match style {
        LabelStyle::Ordinal => (1..=checked.len()).map(|i| format!("p{i}")).collect(),
        LabelStyle::Path => make_unique(
            checked
                .iter()
                .map(|(path, _)| short_name(path, LABEL_COMPONENTS))
                .collect(),
        ),
    };

    let roots = labels
        .into_iter()
        .zip(checked)
        .map(|(label, (path, valid))| Root::new(label, path, valid))
        .collect();

    (roots, problems)
}
