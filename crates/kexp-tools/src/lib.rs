//! kexp tools - everything that touches an external process or the
//! scratch directory.
//!
//! - [`commands`]: argument vectors for kotlinc, R8/D8, dexdump and adb
//! - [`runner`]: the [`ProcessRunner`] seam and its tokio implementation
//! - [`workspace`]: source/rules files and stale class cleanup

pub mod commands;
pub mod error;
pub mod runner;
pub mod workspace;

pub use commands::ToolCommand;
pub use error::ToolError;
pub use runner::{ProcessRunner, SystemRunner};
