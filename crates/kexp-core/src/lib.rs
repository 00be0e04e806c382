//! kexp core - fundamental types shared by every kexp crate.
//!
//! The build pipeline compiles a Kotlin snippet through `kotlinc`, R8/D8,
//! `dexdump`, `adb`, `dex2oat` and `oatdump`. This crate holds the pieces
//! every stage agrees on:
//!
//! - [`ToolPaths`]: resolved locations of the external tools
//! - [`ProcessResult`]: the outcome of one external invocation
//! - [`Stage`] / [`Pane`]: the fixed stage sequence and its output channels
//! - logging macros (`log_info!` and friends) over `tracing`

pub mod constants;
pub mod error;
pub mod logging;
pub mod paths;
pub mod toolchain;
pub mod types;

pub use error::ToolPathsError;
pub use toolchain::{ToolPaths, ToolchainConfig};
pub use types::{Pane, ProcessResult, Stage};
