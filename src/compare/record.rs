//! Per-key report records.

use serde::Serialize;

use super::groups::{GroupAssignment, Status};
use super::index::{FileEntry, RootIndex};
use crate::scanner::{hash_to_hex, Hash};

/// What one root contributes to a key's row, when it has the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RootCell {
    /// `/`-separated path of the canonical file, relative to the root
    pub relative_path: String,
    /// Full content fingerprint
    #[serde(serialize_with = "serialize_hash")]
    pub fingerprint: Hash,
    /// Same-name paths in this root (empty unless there is a collision)
    pub collisions: Vec<String>,
    /// Content-equivalence group within this key (1-based)
    pub group_id: usize,
}

/// One report row: a basename and how it looks in every root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyRecord {
    /// The basename
    pub key: String,
    /// One cell per root in declaration order, `None` where absent
    pub cells: Vec<Option<RootCell>>,
    /// Presence-only status label
    pub status: Status,
    /// `G1:A,B;G2:C` style group listing
    pub group_summary: String,
    /// Number of distinct contents among the roots that have the key
    pub num_groups: usize,
}

impl KeyRecord {
    /// Build the record for `key` from every root's index.
    ///
    /// `indices` and `labels` are parallel, in root declaration order.
    #[must_use]
    pub fn build<S: AsRef<str>>(key: &str, indices: &[&RootIndex], labels: &[S]) -> Self {
        let entries: Vec<Option<&FileEntry>> = indices.iter().map(|index| index.get(key)).collect();

        let presence: Vec<bool> = entries.iter().map(Option::is_some).collect();
        let fingerprints: Vec<Option<&Hash>> = entries
            .iter()
            .map(|entry| entry.map(|e| &e.fingerprint))
            .collect();

        let status = Status::classify(&presence, labels);
        let groups = GroupAssignment::assign(&fingerprints);

        let cells = entries
            .iter()
            .zip(groups.ids())
            .map(|(entry, id)| {
                entry.zip(*id).map(|(e, group_id)| RootCell {
                    relative_path: e.relative_path.clone(),
                    fingerprint: e.fingerprint,
                    collisions: e.collisions.clone(),
                    group_id,
                })
            })
            .collect();

        Self {
            key: key.to_string(),
            cells,
            status,
            group_summary: groups.summary(labels),
            num_groups: groups.num_groups(),
        }
    }

    /// Which roots have this key.
    #[must_use]
    pub fn presence(&self) -> Vec<bool> {
        self.cells.iter().map(Option::is_some).collect()
    }

    /// Group id per root, `None` where absent.
    #[must_use]
    pub fn group_ids(&self) -> Vec<Option<usize>> {
        self.cells
            .iter()
            .map(|cell| cell.as_ref().map(|c| c.group_id))
            .collect()
    }

    /// Whether at least two roots hold different content for this key.
    #[must_use]
    pub fn has_differences(&self) -> bool {
        self.num_groups > 1
    }
}

fn serialize_hash<S: serde::Serializer>(hash: &Hash, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hash_to_hex(hash))
}
