//! Helpers for resolving kexp directories.
//!
//! - Global home at `$KEXP_HOME` or `~/.kexp`
//! - Project-scoped folder at `<repo>/.kexp`
//! - Scratch directory for build artifacts, either explicit or
//!   `<tmp>/kexp-<pid>`, created lazily

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const ENV_HOME: &str = "KEXP_HOME";
const PROJECT_DIR: &str = ".kexp";
const CONFIG_FILE: &str = "config.toml";
const SCRATCH_PREFIX: &str = "kexp-";

/// Global home directory (`$KEXP_HOME`, else `~/.kexp`).
pub fn home_dir() -> Option<PathBuf> {
    if let Ok(path) = env::var(ENV_HOME) {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(PROJECT_DIR))
}

/// Path of the global configuration file.
pub fn global_config_path() -> Option<PathBuf> {
    home_dir().map(|home| home.join(CONFIG_FILE))
}

/// Nearest `.kexp/config.toml` in `start` or one of its ancestors.
pub fn project_config_path(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|ancestor| ancestor.join(PROJECT_DIR).join(CONFIG_FILE))
        .find(|candidate| candidate.is_file())
}

/// Resolve and create the scratch directory used for one explorer session.
///
/// An explicit directory is used as-is; otherwise a per-process directory
/// under the system temp dir is chosen.
pub fn scratch_dir(explicit: Option<&Path>) -> io::Result<PathBuf> {
    let dir = match explicit {
        Some(dir) => dir.to_path_buf(),
        None => env::temp_dir().join(format!("{SCRATCH_PREFIX}{}", std::process::id())),
    };
    fs::create_dir_all(&dir)?;
    Ok(dir.canonicalize().unwrap_or(dir))
}
