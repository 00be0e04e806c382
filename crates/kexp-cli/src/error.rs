//! CLI error type and exit codes.

use std::path::PathBuf;

use kexp_config::ConfigError;
use kexp_core::Stage;
use kexp_driver::DriverError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Input file not found.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Failed to write output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tool discovery, invalid tool paths, scratch I/O or a concurrent build.
    #[error("{0}")]
    Driver(#[from] DriverError),

    /// A pipeline stage exited non-zero. Its output has already been shown.
    #[error("Build failed at stage '{stage}'")]
    BuildFailed { stage: Stage },

    #[error("{count} required tool location(s) missing")]
    ToolsMissing { count: usize },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Returns the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InputNotFound { .. } => 66, // EX_NOINPUT
            CliError::OutputWrite { .. } => 73,   // EX_CANTCREAT
            CliError::Config(_) => 78,            // EX_CONFIG
            CliError::Driver(DriverError::BuildInProgress) => 75, // EX_TEMPFAIL
            CliError::Driver(DriverError::Io(_) | DriverError::Workspace(_)) => 74,
            CliError::Driver(_) => 69,            // EX_UNAVAILABLE
            CliError::BuildFailed { .. } => 1,
            CliError::ToolsMissing { .. } => 69,
            CliError::Internal { .. } => 70,      // EX_SOFTWARE
            CliError::Io(_) => 74,                // EX_IOERR
        }
    }
}

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;
