//! `kexp doctor`: show where every external tool was found.

use std::path::Path;

use kexp_config::KexpConfig;
use kexp_core::{ToolPaths, paths};

use crate::error::{CliError, CliResult};

pub fn execute(config: &KexpConfig) -> CliResult<()> {
    let scratch_dir = paths::scratch_dir(config.build.scratch_dir.as_deref())?;
    let tool_paths = ToolPaths::discover(&config.toolchain, scratch_dir)
        .map_err(kexp_driver::DriverError::from)?;

    print!("{}", report(&tool_paths));

    let missing = tool_paths.missing().len();
    if missing > 0 {
        return Err(CliError::ToolsMissing { count: missing });
    }
    println!("All tools found.");
    Ok(())
}

/// One `[ok]`/`[missing]` line per location.
fn report(tool_paths: &ToolPaths) -> String {
    tool_paths
        .locations()
        .into_iter()
        .map(|(label, path)| format!("{:<10} {label:<14} {}\n", status(path), path.display()))
        .collect()
}

fn status(path: &Path) -> &'static str {
    if path.exists() { "[ok]" } else { "[missing]" }
}
