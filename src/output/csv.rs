//! CSV output formatter for comparison results.
//!
//! Provides machine-readable CSV output for spreadsheets and data analysis.
//! One row is generated for each file name found in any root.
//!
//! # Columns
//!
//! For roots labelled `A` and `B`:
//!
//! - `file_name`: The basename shared across roots
//! - `path_A`, `sha_A`, `collision_A`, `exists_A`, then the same for `B`:
//!   relative path, fingerprint prefix, comma-joined same-name paths (only
//!   when the name occurs more than once in that root), presence
//! - `status`: `missing_all`, `all_exist`, or the present labels joined by `_`
//! - `group_A`, `group_B`: content group id within the row
//! - `group_summary`: e.g. `G1:A;G2:B`
//! - `num_groups`: number of distinct contents
//!
//! Cells for a root lacking the name are empty.
//!
//! # Example
//!
//! ```no_run
//! use treecmp::compare::Comparer;
//! use treecmp::output::csv::CsvOutput;
//! use treecmp::roots::Root;
//!
//! let roots = vec![Root::new("A", "/a", true), Root::new("B", "/b", true)];
//! let (records, _) = Comparer::with_defaults().compare(&roots).unwrap();
//!
//! let output = CsvOutput::new(&roots, &records).with_fingerprint_width(16);
//! output.write_to(std::io::stdout()).unwrap();
//! ```

use std::io;

use crate::compare::{KeyRecord, RootCell};
use crate::roots::Root;
use crate::scanner::hex_prefix;

use super::OutputError;

/// Default number of fingerprint hex characters per cell.
pub const DEFAULT_FINGERPRINT_WIDTH: usize = 12;

/// CSV output formatter.
pub struct CsvOutput<'a> {
    roots: &'a [Root],
    records: &'a [KeyRecord],
    fingerprint_width: usize,
}

impl<'a> CsvOutput<'a> {
    /// Create a new CSV output formatter.
    #[must_use]
    pub fn new(roots: &'a [Root], records: &'a [KeyRecord]) -> Self {
        Self {
            roots,
            records,
            fingerprint_width: DEFAULT_FINGERPRINT_WIDTH,
        }
    }

    /// Set how many fingerprint hex characters each `sha_` cell shows.
    #[must_use]
    pub fn with_fingerprint_width(mut self, width: usize) -> Self {
        self.fingerprint_width = width;
        self
    }

    /// Column names, in order.
    #[must_use]
    pub fn header(&self) -> Vec<String> {
        let mut header = vec!["file_name".to_string()];
        for root in self.roots {
            for prefix in ["path", "sha", "collision", "exists"] {
                header.push(format!("{prefix}_{}", root.label));
            }
        }
        header.push("status".to_string());
        for root in self.roots {
            header.push(format!("group_{}", root.label));
        }
        header.push("group_summary".to_string());
        header.push("num_groups".to_string());
        header
    }

    fn row(&self, record: &KeyRecord) -> Vec<String> {
        let mut row = Vec::with_capacity(3 + self.roots.len() * 5 + 3);
        row.push(record.key.clone());

        for cell in &record.cells {
            match cell {
                Some(RootCell {
                    relative_path,
                    fingerprint,
                    collisions,
                    ..
                }) => {
                    row.push(relative_path.clone());
                    row.push(hex_prefix(fingerprint, self.fingerprint_width));
                    row.push(collisions.join(","));
                    row.push("true".to_string());
                }
                None => {
                    row.extend([String::new(), String::new(), String::new()]);
                    row.push("false".to_string());
                }
            }
        }

        row.push(record.status.to_string());
        for cell in &record.cells {
            row.push(cell.as_ref().map(|c| c.group_id.to_string()).unwrap_or_default());
        }
        row.push(record.group_summary.clone());
        row.push(record.num_groups.to_string());
        row
    }

    /// Write the CSV output to the given writer.
    ///
    /// # Arguments
    ///
    /// * `writer` - The writer to output to
    ///
    /// # Errors
    ///
    /// Returns [`OutputError`] if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), OutputError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(self.header())?;
        for record in self.records {
            csv_writer.write_record(self.row(record))?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError`] if serialization fails.
    pub fn to_string(&self) -> Result<String, OutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}
