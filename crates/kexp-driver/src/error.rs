//! Error types for the driver.

use kexp_core::ToolPathsError;
use kexp_tools::ToolError;
use thiserror::Error;

/// Errors that abort a build request.
///
/// A stage exiting non-zero is not one of them: that is reported through
/// the sink and the returned [`crate::BuildOutcome`].
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workspace error: {0}")]
    Workspace(#[from] ToolError),

    #[error("Tool discovery failed: {0}")]
    Discovery(#[from] ToolPathsError),

    #[error("Invalid tool paths, missing: {}", missing.join(", "))]
    InvalidToolPaths { missing: Vec<String> },

    #[error("A build is already running in this scratch directory")]
    BuildInProgress,
}
