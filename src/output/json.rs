//! JSON output formatter for comparison results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "generated_at": "2024-05-01T12:00:00Z",
//!   "roots": [
//!     { "label": "A", "path": "/src/a", "valid": true }
//!   ],
//!   "records": [
//!     {
//!       "file_name": "foo.py",
//!       "status": "all_exist",
//!       "group_summary": "G1:A,B;G2:C",
//!       "num_groups": 2,
//!       "cells": [
//!         {
//!           "exists": true,
//!           "path": "x/foo.py",
//!           "sha": "6b86b273ff34",
//!           "fingerprint": "6b86b273ff34fce1...",
//!           "collisions": null,
//!           "group": 1
//!         }
//!       ]
//!     }
//!   ],
//!   "summary": {
//!     "total_keys": 1,
//!     "divergent_keys": 1,
//!     "keys_everywhere": 1,
//!     "duration_ms": 12,
//!     "exit_code": 0,
//!     "exit_code_name": "TC000",
//!     "roots": [...]
//!   }
//! }
//! ```

use std::io::Write;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::compare::{CompareSummary, KeyRecord};
use crate::error::ExitCode;
use crate::roots::Root;
use crate::scanner::{hash_to_hex, hex_prefix};

use super::OutputError;

/// One root's cell in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonCell {
    /// Whether the root has the name
    pub exists: bool,
    /// Relative path of the compared file
    pub path: Option<String>,
    /// Fingerprint prefix as shown in CSV reports
    pub sha: Option<String>,
    /// Full fingerprint (64 hex characters)
    pub fingerprint: Option<String>,
    /// Same-name paths, when the name occurs more than once in the root
    pub collisions: Option<Vec<String>>,
    /// Content group id within the record
    pub group: Option<usize>,
}

/// One file name in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRecord {
    /// The basename
    pub file_name: String,
    /// Presence status label
    pub status: String,
    /// `G1:A,B;G2:C` style listing
    pub group_summary: String,
    /// Number of distinct contents
    pub num_groups: usize,
    /// One cell per root, in root order
    pub cells: Vec<JsonCell>,
}

impl JsonRecord {
    /// Convert a record, showing `fingerprint_width` hex characters in `sha`.
    #[must_use]
    pub fn from_record(record: &KeyRecord, fingerprint_width: usize) -> Self {
        let cells = record
            .cells
            .iter()
            .map(|cell| match cell {
                Some(c) => JsonCell {
                    exists: true,
                    path: Some(c.relative_path.clone()),
                    sha: Some(hex_prefix(&c.fingerprint, fingerprint_width)),
                    fingerprint: Some(hash_to_hex(&c.fingerprint)),
                    collisions: (!c.collisions.is_empty()).then(|| c.collisions.clone()),
                    group: Some(c.group_id),
                },
                None => JsonCell {
                    exists: false,
                    path: None,
                    sha: None,
                    fingerprint: None,
                    collisions: None,
                    group: None,
                },
            })
            .collect();

        Self {
            file_name: record.key.clone(),
            status: record.status.to_string(),
            group_summary: record.group_summary.clone(),
            num_groups: record.num_groups,
            cells,
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Pipeline statistics
    #[serde(flatten)]
    pub compare: CompareSummary,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "TC000")
    pub exit_code_name: String,
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// When the report was produced (RFC 3339, UTC)
    pub generated_at: String,
    /// Compared roots in column order
    pub roots: Vec<Root>,
    /// One record per file name
    pub records: Vec<JsonRecord>,
    /// Run statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Create a new JSON output.
    ///
    /// # Example
    ///
    /// ```
    /// use treecmp::compare::CompareSummary;
    /// use treecmp::error::ExitCode;
    /// use treecmp::output::json::JsonOutput;
    /// use treecmp::roots::Root;
    ///
    /// let roots = vec![Root::new("A", "/a", true)];
    /// let output = JsonOutput::new(&roots, &[], &CompareSummary::default(), ExitCode::Success, 12);
    /// assert_eq!(output.roots.len(), 1);
    /// assert!(output.records.is_empty());
    /// ```
    #[must_use]
    pub fn new(
        roots: &[Root],
        records: &[KeyRecord],
        summary: &CompareSummary,
        exit_code: ExitCode,
        fingerprint_width: usize,
    ) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            roots: roots.to_vec(),
            records: records
                .iter()
                .map(|r| JsonRecord::from_record(r, fingerprint_width))
                .collect(),
            summary: JsonSummary {
                compare: summary.clone(),
                exit_code: exit_code.as_i32(),
                exit_code_name: exit_code.code_prefix().to_string(),
            },
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer.
    ///
    /// # Arguments
    ///
    /// * `writer` - The writer to output to (e.g., stdout)
    /// * `pretty` - Whether to pretty-print the output
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), OutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}
