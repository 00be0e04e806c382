//! Error types for tool discovery.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while resolving [`crate::ToolPaths`].
#[derive(Debug, Error)]
pub enum ToolPathsError {
    #[error(
        "Android SDK not found. Set ANDROID_HOME (or ANDROID_SDK_ROOT) or `[toolchain] android_home`"
    )]
    AndroidSdkMissing,

    #[error(
        "Kotlin compiler not found. Set KOTLIN_HOME, put kotlinc on PATH, or set `[toolchain] kotlin_home`"
    )]
    KotlinMissing,

    #[error("No {kind} installed under {dir}")]
    NoVersionInstalled { kind: &'static str, dir: PathBuf },

    #[error("IO error while scanning {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
