//! Structured error handling and exit codes.

use serde::Serialize;

use crate::config::ConfigError;
use crate::roots::RootError;

/// Exit codes for the treecmp application.
///
/// - 0: Success (report written from complete input)
/// - 1: General error (fatal failure, no report)
/// - 2: Usage error (bad arguments, list file or configuration)
/// - 3: Partial success (report written, but a root was invalid or a
///   directory could not be read)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: comparison completed over complete input.
    Success = 0,
    /// General error: an unexpected or fatal error occurred.
    GeneralError = 1,
    /// Usage error: the run could not be set up.
    UsageError = 2,
    /// Partial success: report written from incomplete input.
    PartialSuccess = 3,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "TC000",
            Self::GeneralError => "TC001",
            Self::UsageError => "TC002",
            Self::PartialSuccess => "TC003",
        }
    }
}

/// Pick the exit code for a fatal error.
///
/// Configuration and root-list problems are usage errors; everything else
/// is a general failure.
#[must_use]
pub fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    let usage = err.chain().any(|cause| {
        cause.downcast_ref::<ConfigError>().is_some()
            || matches!(
                cause.downcast_ref::<RootError>(),
                Some(RootError::NoRoots | RootError::ListFile { .. })
            )
    });

    if usage {
        ExitCode::UsageError
    } else {
        ExitCode::GeneralError
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "TC001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, causes included
    pub message: String,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
        }
    }
}
