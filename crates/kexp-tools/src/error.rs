use std::path::PathBuf;

use thiserror::Error;

/// Scratch-directory failures. These abort the build; they are never
/// reported through the output panes.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ToolError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| ToolError::Io { path, source }
    }
}

pub type ToolResult<T> = Result<T, ToolError>;
