//! Union of basenames across roots.

use std::collections::BTreeSet;

use super::index::RootIndex;

/// Every basename present in at least one index, sorted lexicographically.
///
/// This, not any single root's listing, is the set of report rows. The
/// ordering is byte-wise on the UTF-8 name so repeated runs over the same
/// trees produce identical, diffable reports.
///
/// # Example
///
/// ```
/// use treecmp::compare::{unify_keys, RootIndex};
///
/// let keys = unify_keys(&[&RootIndex::empty(), &RootIndex::empty()]);
/// assert!(keys.is_empty());
/// ```
#[must_use]
pub fn unify_keys(indices: &[&RootIndex]) -> Vec<String> {
    indices
        .iter()
        .flat_map(|index| index.keys())
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}
