//! Command-line interface definitions for treecmp.
//!
//! This module defines all CLI arguments, subcommands, and options using the clap derive API.
//! Global options control verbosity and error rendering; the `compare`
//! subcommand carries everything about a run.
//!
//! Every run-specific option is optional here so that an absent flag can
//! fall back to the config file or environment (see [`crate::config`]).
//!
//! # Example
//!
//! ```bash
//! # Compare three checkouts, report to treecmp.csv
//! treecmp compare ../proj_a ../proj_b ../proj_c
//!
//! # Roots from a file, JSON on stdout
//! treecmp compare --list roots.txt --format json --out -
//!
//! # Several suffixes, ordinal column labels
//! treecmp compare a b --ext .py,.pyi --labels ordinal
//!
//! # Verbose mode for debugging
//! treecmp -v compare a b --show-differences
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::roots::LabelStyle;
use crate::scanner::HashAlgorithm;

/// Compare source trees across directory roots, file name by file name.
///
/// For every file name found in any root, treecmp reports where it exists,
/// which roots hold identical content, and any same-name collisions inside
/// a root. The trees are only read, never modified.
#[derive(Debug, Parser)]
#[command(name = "treecmp")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Do not draw progress bars
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH", env = "TREECMP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compare directory roots and write a report
    Compare(CompareArgs),

    /// Print the effective configuration as TOML
    Config,
}

/// Arguments for the compare subcommand.
#[derive(Debug, Default, Args)]
pub struct CompareArgs {
    /// Root directories to compare, in column order
    #[arg(value_name = "ROOT")]
    pub roots: Vec<String>,

    /// File listing additional roots, one per line (`#` starts a comment)
    #[arg(short, long, value_name = "FILE")]
    pub list: Option<PathBuf>,

    /// Report destination (`-` for stdout)
    #[arg(short, long, value_name = "PATH")]
    pub out: Option<String>,

    /// Report format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// File-name suffixes to include, comma-separated (e.g. `.py,.pyi`)
    #[arg(short, long = "ext", value_name = "SUFFIX", value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// How report columns are labelled
    #[arg(long, value_enum)]
    pub labels: Option<LabelStyle>,

    /// Content fingerprint algorithm
    #[arg(long, value_enum)]
    pub algorithm: Option<HashAlgorithm>,

    /// Fingerprint hex characters shown in reports (1-64)
    #[arg(long, value_name = "N")]
    pub fingerprint_width: Option<usize>,

    /// Number of I/O threads per root (default: 4)
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Treat NFC and NFD spellings of a file name as the same name
    #[arg(long)]
    pub normalize_unicode: bool,

    /// After writing the report, list names whose content differs
    #[arg(long, alias = "debug")]
    pub show_differences: bool,
}

/// Report format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// CSV for spreadsheets
    #[default]
    Csv,
    /// JSON for scripting
    Json,
}

impl OutputFormat {
    /// File extension of reports in this format.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}
