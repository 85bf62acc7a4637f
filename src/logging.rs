//! Diagnostics on stderr through the `log` facade and `env_logger`.
//!
//! The level comes from `RUST_LOG` when it is set, otherwise from the
//! command-line flags: `-q` shows errors only, the default shows info,
//! `-v` debug and `-vv` trace. Messages from dependencies are capped at
//! `warn` unless `-vv` is given.
//!
//! Reports may go to stdout, so nothing here ever writes there.
//!
//! ```rust,no_run
//! treecmp::logging::init_logging(1, false);
//! log::debug!("visible with -v");
//! ```

use std::env;
use std::io::Write;

use env_logger::{Builder, Target};
use log::{Level, LevelFilter};

/// Crate name as it appears in log record targets.
const CRATE_TARGET: &str = env!("CARGO_PKG_NAME");

/// Install the process logger. Returns `false` if one was already
/// installed, in which case nothing changes.
pub fn init_logging(verbose: u8, quiet: bool) -> bool {
    let from_env = env::var("RUST_LOG").ok().filter(|s| !s.trim().is_empty());

    let mut builder = Builder::new();
    builder.target(Target::Stderr);

    let level = level_for(verbose, quiet);
    match &from_env {
        Some(spec) => {
            builder.parse_filters(spec);
        }
        None => {
            builder
                .filter_level(dependency_level(level))
                .filter_module(CRATE_TARGET, level);
        }
    }
    apply_format(&mut builder, verbose);

    if builder.try_init().is_err() {
        return false;
    }
    match from_env {
        Some(spec) => log::debug!("Log filters from RUST_LOG: {spec}"),
        None => log::debug!("Log level {level}"),
    }
    true
}

fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

/// Third-party crates stay at `warn` until trace output is requested.
fn dependency_level(level: LevelFilter) -> LevelFilter {
    if level == LevelFilter::Trace {
        LevelFilter::Trace
    } else {
        level.min(LevelFilter::Warn)
    }
}

/// `treecmp: warning: ...` for problems, bare text for progress notes.
fn prefix(level: Level) -> &'static str {
    match level {
        Level::Error => "error: ",
        Level::Warn => "warning: ",
        Level::Info => "",
        Level::Debug => "debug: ",
        Level::Trace => "trace: ",
    }
}

fn apply_format(builder: &mut Builder, verbose: u8) {
    #[cfg(debug_assertions)]
    builder.format(move |buf, record| {
        let style = buf.default_level_style(record.level());
        if verbose >= 1 {
            writeln!(
                buf,
                "{} {style}{:<5}{style:#} [{}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.target(),
                record.args()
            )
        } else {
            writeln!(
                buf,
                "{CRATE_TARGET}: {style}{}{style:#}{}",
                prefix(record.level()),
                record.args()
            )
        }
    });

    #[cfg(not(debug_assertions))]
    {
        let _ = verbose;
        builder.format(|buf, record| {
            let style = buf.default_level_style(record.level());
            writeln!(
                buf,
                "{CRATE_TARGET}: {style}{}{style:#}{}",
                prefix(record.level()),
                record.args()
            )
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_flags() {
        assert_eq!(level_for(0, false), LevelFilter::Info);
        assert_eq!(level_for(1, false), LevelFilter::Debug);
        assert_eq!(level_for(2, false), LevelFilter::Trace);
        assert_eq!(level_for(7, false), LevelFilter::Trace);
    }

    #[test]
    fn test_quiet_wins_over_verbose() {
        assert_eq!(level_for(2, true), LevelFilter::Error);
    }

    #[test]
    fn test_dependencies_capped_below_trace() {
        assert_eq!(dependency_level(LevelFilter::Info), LevelFilter::Warn);
        assert_eq!(dependency_level(LevelFilter::Debug), LevelFilter::Warn);
        assert_eq!(dependency_level(LevelFilter::Error), LevelFilter::Error);
        assert_eq!(dependency_level(LevelFilter::Trace), LevelFilter::Trace);
    }

    #[test]
    fn test_prefixes() {
        assert_eq!(prefix(Level::Warn), "warning: ");
        assert_eq!(prefix(Level::Info), "");
    }

    #[test]
    fn test_second_init_is_ignored() {
        init_logging(0, false);
        assert!(!init_logging(2, true));
    }
}
