//! Fundamental types for the kexp build pipeline.
//!
//! - `ProcessResult`: exit code plus merged output of one external tool run
//! - `Stage`: one step of the fixed build sequence
//! - `Pane`: the output channel a stage reports into

pub mod process;
pub mod stages;

pub use process::ProcessResult;
pub use stages::{Pane, Stage};
