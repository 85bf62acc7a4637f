//! Application configuration management.
//!
//! Settings are resolved in layers, later layers winning:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. TOML config file (`--config PATH`, or `config.toml` in the platform
//!    config directory)
//! 3. `TREECMP_*` environment variables (e.g. `TREECMP_IO_THREADS=8`)
//! 4. Command-line flags ([`Config::merge_compare_args`])
//!
//! The resolved [`Config`] is then turned into a [`RunConfig`], the one
//! value the comparison pipeline and report writers receive.
//!
//! # Example
//!
//! ```toml
//! extensions = [".py", ".pyi"]
//! format = "json"
//! labels = "ordinal"
//! algorithm = "blake3"
//! io_threads = 8
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::{CompareArgs, OutputFormat};
use crate::compare::CompareConfig;
use crate::output::OutputTarget;
use crate::roots::{LabelStyle, Root};
use crate::scanner::HashAlgorithm;

/// Prefix of environment variables read as configuration.
pub const ENV_PREFIX: &str = "TREECMP_";

/// Longest meaningful fingerprint prefix (a full 32-byte digest in hex).
pub const MAX_FINGERPRINT_WIDTH: usize = 64;

/// Errors that prevent a run from being configured.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file or environment variable could not be parsed.
    #[error("invalid configuration: {0}")]
    Figment(#[from] figment::Error),

    /// No usable extension pattern remained.
    #[error("no usable extension patterns; each must start with '.' (e.g. .py)")]
    NoExtensions,

    /// The effective configuration could not be rendered as TOML.
    #[error("cannot render configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File-name suffixes to include.
    pub extensions: Vec<String>,
    /// Report format.
    pub format: OutputFormat,
    /// Report destination; `-` is stdout. Defaults to `treecmp.<format>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out: Option<String>,
    /// Column label style.
    pub labels: LabelStyle,
    /// Content fingerprint algorithm.
    pub algorithm: HashAlgorithm,
    /// Fingerprint hex characters shown in reports.
    pub fingerprint_width: usize,
    /// I/O threads per root.
    pub io_threads: usize,
    /// Fold file names to NFC before comparing them.
    pub normalize_unicode: bool,
    /// List diverging names after the report is written.
    pub show_differences: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extensions: vec![".py".to_string()],
            format: OutputFormat::Csv,
            out: None,
            labels: LabelStyle::Path,
            algorithm: HashAlgorithm::Sha256,
            fingerprint_width: 12,
            io_threads: 4,
            normalize_unicode: false,
            show_differences: false,
        }
    }
}

impl Config {
    /// Load defaults, the config file and the environment.
    ///
    /// `path` overrides the platform default location. A missing file is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if the file or an environment
    /// variable holds an invalid value.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::figment(None).extract()?),
        }
    }

    /// Load defaults, the given config file and the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] on invalid values.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            log::debug!("Loading configuration from {}", path.display());
        } else {
            log::debug!("No configuration file at {}", path.display());
        }
        Ok(Self::figment(Some(path)).extract()?)
    }

    /// The layered provider stack, without command-line overrides.
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]))
    }

    /// Default platform-specific configuration path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "treecmp").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply flags given on the command line; absent flags keep the
    /// configured value.
    pub fn merge_compare_args(&mut self, args: &CompareArgs) {
        if !args.extensions.is_empty() {
            self.extensions.clone_from(&args.extensions);
        }
        if let Some(format) = args.format {
            self.format = format;
        }
        if let Some(out) = &args.out {
            self.out = Some(out.clone());
        }
        if let Some(labels) = args.labels {
            self.labels = labels;
        }
        if let Some(algorithm) = args.algorithm {
            self.algorithm = algorithm;
        }
        if let Some(width) = args.fingerprint_width {
            self.fingerprint_width = width;
        }
        if let Some(threads) = args.io_threads {
            self.io_threads = threads;
        }
        if args.normalize_unicode {
            self.normalize_unicode = true;
        }
        if args.show_differences {
            self.show_differences = true;
        }
    }

    /// Validated extension patterns.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoExtensions`] if nothing usable remains.
    pub fn extension_patterns(&self) -> Result<Vec<String>, ConfigError> {
        normalize_extensions(&self.extensions)
    }

    /// Fingerprint prefix width, clamped to `1..=64`.
    #[must_use]
    pub fn fingerprint_width(&self) -> usize {
        self.fingerprint_width.clamp(1, MAX_FINGERPRINT_WIDTH)
    }

    /// Where the report goes.
    #[must_use]
    pub fn output_target(&self) -> OutputTarget {
        match &self.out {
            Some(out) => OutputTarget::from_arg(out),
            None => OutputTarget::File(PathBuf::from(format!(
                "treecmp.{}",
                self.format.extension()
            ))),
        }
    }

    /// Pipeline configuration derived from these settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoExtensions`] if no extension is usable.
    pub fn compare_config(&self) -> Result<CompareConfig, ConfigError> {
        Ok(CompareConfig::default()
            .with_extensions(self.extension_patterns()?)
            .with_algorithm(self.algorithm)
            .with_io_threads(self.io_threads)
            .with_normalize_unicode(self.normalize_unicode))
    }

    /// Render as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] if rendering fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Keep patterns that start with `.`, reducing `*.py` to `.py` and
/// dropping repeats. Anything else is skipped with a warning.
///
/// # Errors
///
/// Returns [`ConfigError::NoExtensions`] if no pattern survives.
///
/// # Example
///
/// ```
/// use treecmp::config::normalize_extensions;
///
/// let raw = vec!["*.py".to_string(), "pyi".to_string(), ".py".to_string(), ".rs".to_string()];
/// assert_eq!(normalize_extensions(&raw).unwrap(), vec![".py", ".rs"]);
/// ```
pub fn normalize_extensions(raw: &[String]) -> Result<Vec<String>, ConfigError> {
    let mut patterns: Vec<String> = Vec::new();

    for entry in raw {
        let trimmed = entry.trim();
        if trimmed.is_empty() {
            continue;
        }
        let pattern = trimmed.strip_prefix('*').unwrap_or(trimmed);
        if pattern.len() > 1 && pattern.starts_with('.') {
            if !patterns.iter().any(|p| p == pattern) {
                patterns.push(pattern.to_string());
            }
        } else {
            log::warn!("Ignoring extension pattern {trimmed:?}: must start with '.'");
        }
    }

    if patterns.is_empty() {
        Err(ConfigError::NoExtensions)
    } else {
        Ok(patterns)
    }
}

/// Everything a comparison run needs, resolved up front.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Roots in column order, invalid ones included
    pub roots: Vec<Root>,
    /// Pipeline settings
    pub compare: CompareConfig,
    /// Report destination
    pub target: OutputTarget,
    /// Report format
    pub format: OutputFormat,
    /// Fingerprint prefix width in reports
    pub fingerprint_width: usize,
    /// Whether to list diverging names after writing
    pub show_differences: bool,
}

impl RunConfig {
    /// Combine resolved roots with configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoExtensions`] if no extension is usable.
    pub fn new(roots: Vec<Root>, config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            roots,
            compare: config.compare_config()?,
            target: config.output_target(),
            format: config.format,
            fingerprint_width: config.fingerprint_width(),
            show_differences: config.show_differences,
        })
    }
}
