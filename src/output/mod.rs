//! Report writers for comparison results.
//!
//! This module provides different output formats for comparison results:
//! - CSV for spreadsheet import, one row per file name
//! - JSON for automation and scripting
//! - A plain `name<TAB>groups` listing of names whose content differs
//!
//! # Example
//!
//! ```no_run
//! use treecmp::compare::Comparer;
//! use treecmp::output::{CsvOutput, OutputTarget};
//! use treecmp::roots::Root;
//!
//! let roots = vec![Root::new("a", "/src/a", true), Root::new("b", "/src/b", true)];
//! let (records, _summary) = Comparer::with_defaults().compare(&roots).unwrap();
//!
//! let writer = OutputTarget::Stdout.open().unwrap();
//! CsvOutput::new(&roots, &records).write_to(writer).unwrap();
//! ```

pub mod csv;
pub mod json;

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use thiserror::Error;

use crate::compare::KeyRecord;

// Re-export main types
pub use self::csv::CsvOutput;
pub use self::json::JsonOutput;

/// Errors that can occur while writing a report.
#[derive(Debug, Error)]
pub enum OutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    /// Error during JSON serialization.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where a report is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Standard output
    Stdout,
    /// A file, created along with missing parent directories
    File(PathBuf),
}

impl OutputTarget {
    /// Interpret a command-line value; `-` means stdout.
    #[must_use]
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Self::Stdout
        } else {
            Self::File(PathBuf::from(arg))
        }
    }

    /// Open a buffered writer for the target.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Io`] if the file or its parent directories
    /// cannot be created.
    pub fn open(&self) -> Result<Box<dyn Write>, OutputError> {
        match self {
            Self::Stdout => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
            Self::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                Ok(Box::new(BufWriter::new(File::create(path)?)))
            }
        }
    }

    /// Whether the report goes to stdout.
    #[must_use]
    pub fn is_stdout(&self) -> bool {
        matches!(self, Self::Stdout)
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("<stdout>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Write `name<TAB>group_summary` for every record whose roots disagree on
/// content. Returns the number of lines written.
///
/// # Errors
///
/// Returns any I/O error from `writer`.
pub fn write_differences<W: Write>(records: &[KeyRecord], mut writer: W) -> io::Result<usize> {
    let mut count = 0;
    for record in records.iter().filter(|r| r.has_differences()) {
        writeln!(writer, "{}\t{}", record.key, record.group_summary)?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{IndexBuilder, RootIndex};
    use tempfile::TempDir;

    fn index_with(name: &str, tag: u8) -> RootIndex {
        let mut builder = IndexBuilder::new();
        builder.add(name.to_string(), name.to_string(), PathBuf::from(name));
        let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        builder.finish(&pool, |_| Ok([tag; 32])).unwrap()
    }

    #[test]
    fn test_output_target_from_arg() {
        assert_eq!(OutputTarget::from_arg("-"), OutputTarget::Stdout);
        assert_eq!(
            OutputTarget::from_arg("out/report.csv"),
            OutputTarget::File(PathBuf::from("out/report.csv"))
        );
        assert!(OutputTarget::Stdout.is_stdout());
        assert_eq!(OutputTarget::Stdout.to_string(), "<stdout>");
    }

    #[test]
    fn test_open_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/report.csv");
        let target = OutputTarget::File(path.clone());

        {
            let mut writer = target.open().unwrap();
            writer.write_all(b"x").unwrap();
        }

        assert_eq!(fs::read_to_string(path).unwrap(), "x");
    }

    #[test]
    fn test_write_differences_lists_only_divergent_keys() {
        let a = index_with("same.py", 1);
        let b = index_with("same.py", 1);
        let c = index_with("diff.py", 1);
        let d = index_with("diff.py", 2);

        let records = vec![
            KeyRecord::build("diff.py", &[&c, &d], &["A", "B"]),
            KeyRecord::build("same.py", &[&a, &b], &["A", "B"]),
        ];

        let mut buffer = Vec::new();
        let count = write_differences(&records, &mut buffer).unwrap();

        assert_eq!(count, 1);
        assert_eq!(String::from_utf8(buffer).unwrap(), "diff.py\tG1:A;G2:B\n");
    }
}
