//! Content-equivalence grouping and presence status for one key.
//!
//! # Overview
//!
//! For a single basename, every root either has an entry or does not.
//! [`GroupAssignment::assign`] scans the roots in declaration order and
//! hands out group ids (starting at 1) the first time it meets a
//! fingerprint it has not seen for this key. Roots sharing a fingerprint
//! share an id; absent roots get none. Ids only mean something within one
//! key's row.
//!
//! [`Status::classify`] is the presence-only counterpart: it looks at which
//! roots have the key and ignores content entirely.
//!
//! # Example
//!
//! ```
//! use treecmp::compare::{GroupAssignment, Status};
//!
//! let labels = ["A", "B", "C"];
//! let fingerprints = [Some("1"), Some("1"), Some("2")];
//!
//! let groups = GroupAssignment::assign(&fingerprints);
//! assert_eq!(groups.ids(), &[Some(1), Some(1), Some(2)]);
//! assert_eq!(groups.summary(&labels), "G1:A,B;G2:C");
//!
//! let status = Status::classify(&[true, true, true], &labels);
//! assert_eq!(status.to_string(), "all_exist");
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, Serializer};

/// Joins groups in a summary (`G1:A;G2:B`).
pub const GROUP_SEPARATOR: &str = ";";

/// Joins member labels within one group (`G1:A,B`).
pub const MEMBER_SEPARATOR: &str = ",";

/// Joins present-root labels in a partial status (`A_C`).
pub const STATUS_SEPARATOR: &str = "_";

/// Group ids for every root of one key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroupAssignment {
    /// Group id per root, `None` where the key is absent
    ids: Vec<Option<usize>>,
    /// Root positions belonging to each group, indexed by `id - 1`
    members: Vec<Vec<usize>>,
}

impl GroupAssignment {
    /// Assign group ids by first-seen fingerprint in root order.
    ///
    /// `fingerprints[i]` is root `i`'s fingerprint for the key, or `None`
    /// if the root lacks it. Any equality-comparable fingerprint works.
    #[must_use]
    pub fn assign<T>(fingerprints: &[Option<T>]) -> Self
    where
        T: Eq + std::hash::Hash,
    {
        let mut first_seen: HashMap<&T, usize> = HashMap::new();
        let mut ids = Vec::with_capacity(fingerprints.len());
        let mut members: Vec<Vec<usize>> = Vec::new();

        for (root, fingerprint) in fingerprints.iter().enumerate() {
            let Some(fingerprint) = fingerprint else {
                ids.push(None);
                continue;
            };

            let id = *first_seen.entry(fingerprint).or_insert_with(|| {
                members.push(Vec::new());
                members.len()
            });
            members[id - 1].push(root);
            ids.push(Some(id));
        }

        Self { ids, members }
    }

    /// Group id per root.
    #[must_use]
    pub fn ids(&self) -> &[Option<usize>] {
        &self.ids
    }

    /// Number of distinct groups (distinct fingerprints among present roots).
    #[must_use]
    pub fn num_groups(&self) -> usize {
        self.members.len()
    }

    /// Root positions in group `id`, in declaration order.
    #[must_use]
    pub fn members(&self, id: usize) -> Option<&[usize]> {
        id.checked_sub(1)
            .and_then(|i| self.members.get(i))
            .map(Vec::as_slice)
    }

    /// Render `G<id>:<label>,<label>;...`, groups ascending by id.
    ///
    /// Empty when no root has the key.
    ///
    /// # Panics
    ///
    /// `labels` must hold one label per root passed to [`Self::assign`].
    #[must_use]
    pub fn summary<S: AsRef<str>>(&self, labels: &[S]) -> String {
        debug_assert_eq!(labels.len(), self.ids.len(), "one label per root");
        self.members
            .iter()
            .enumerate()
            .map(|(i, roots)| {
                let names: Vec<&str> = roots.iter().map(|&r| labels[r].as_ref()).collect();
                format!("G{}:{}", i + 1, names.join(MEMBER_SEPARATOR))
            })
            .collect::<Vec<_>>()
            .join(GROUP_SEPARATOR)
    }
}

/// Presence-only classification of a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// No root has the key.
    MissingAll,
    /// Every root has the key, whatever its content.
    AllExist,
    /// Only the named roots have the key, in declaration order.
    Partial(Vec<String>),
}

impl Status {
    /// Classify a presence vector. `labels[i]` names root `i`; both slices
    /// must have the same length.
    #[must_use]
    pub fn classify<S: AsRef<str>>(presence: &[bool], labels: &[S]) -> Self {
        debug_assert_eq!(presence.len(), labels.len(), "one label per root");
        if !presence.iter().any(|&p| p) {
            return Self::MissingAll;
        }
        if presence.iter().all(|&p| p) {
            return Self::AllExist;
        }

        Self::Partial(
            presence
                .iter()
                .zip(labels)
                .filter(|(present, _)| **present)
                .map(|(_, label)| label.as_ref().to_string())
                .collect(),
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::MissingAll => write!(f, "missing_all"),
            Status::AllExist => write!(f, "all_exist"),
            Status::Partial(labels) => write!(f, "{}", labels.join(STATUS_SEPARATOR)),
        }
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
