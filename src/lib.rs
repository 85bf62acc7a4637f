//! treecmp - Cross-tree source comparison
//!
//! Compares source trees across two or more directory roots, file name by
//! file name. For every basename found in any root, the report says which
//! roots have it, which of them hold byte-identical content, and which
//! names occur more than once within a single root. The trees are only
//! read, never modified.

pub mod cli;
pub mod compare;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod roots;
pub mod scanner;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Context;

use crate::cli::{Cli, Commands, CompareArgs, OutputFormat};
use crate::compare::{CompareSummary, Comparer, KeyRecord};
use crate::config::{Config, RunConfig};
use crate::error::ExitCode;
use crate::output::{write_differences, CsvOutput, JsonOutput};
use crate::progress::Progress;
use crate::roots::{dedupe, read_list_file, resolve_roots, RootError};

/// Run the application for parsed command-line arguments.
///
/// # Errors
///
/// Returns an error for anything that prevents a complete report from
/// being written; see [`error::exit_code_for`] for how errors map to exit
/// codes.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let mut config =
        Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    match &cli.command {
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(ExitCode::Success)
        }
        Commands::Compare(args) => {
            config.merge_compare_args(args);
            log::debug!("Effective configuration: {:?}", config);
            let show_progress = !cli.quiet && !cli.no_progress;
            run_compare(args, &config, show_progress)
        }
    }
}

fn run_compare(args: &CompareArgs, config: &Config, show_progress: bool) -> anyhow::Result<ExitCode> {
    let mut raw = args.roots.clone();
    if let Some(list) = &args.list {
        raw.extend(read_list_file(list)?);
    }
    let raw = dedupe(raw);
    if raw.is_empty() {
        return Err(RootError::NoRoots.into());
    }

    let (roots, problems) = resolve_roots(raw, config.labels);
    if !problems.is_empty() {
        log::warn!(
            "{} of {} roots are unusable and will show every file as absent",
            problems.len(),
            roots.len()
        );
    }

    let mut run = RunConfig::new(roots, config).context("invalid configuration")?;
    if show_progress {
        run.compare = run
            .compare
            .with_progress_callback(Arc::new(Progress::new()));
    }

    let comparer = Comparer::new(run.compare.clone());
    let (records, summary) = comparer.compare(&run.roots)?;

    let exit_code = if summary.has_warnings() {
        ExitCode::PartialSuccess
    } else {
        ExitCode::Success
    };

    write_report(&run, &records, &summary, exit_code)
        .with_context(|| format!("failed to write report to {}", run.target))?;
    log::info!("Wrote {} ({} rows)", run.target, records.len());

    if run.show_differences {
        let listed = if run.target.is_stdout() {
            write_differences(&records, io::stderr().lock())?
        } else {
            write_differences(&records, io::stdout().lock())?
        };
        log::info!("{} file names differ in content", listed);
    }

    Ok(exit_code)
}

fn write_report(
    run: &RunConfig,
    records: &[KeyRecord],
    summary: &CompareSummary,
    exit_code: ExitCode,
) -> anyhow::Result<()> {
    let mut writer = run.target.open()?;
    match run.format {
        OutputFormat::Csv => CsvOutput::new(&run.roots, records)
            .with_fingerprint_width(run.fingerprint_width)
            .write_to(&mut writer)?,
        OutputFormat::Json => {
            JsonOutput::new(&run.roots, records, summary, exit_code, run.fingerprint_width)
                .write_to(&mut writer, true)?;
        }
    }
    writer.flush()?;
    Ok(())
}
