//! CLI commands.
//!
//! Each command is implemented in its own module.

pub mod build;
pub mod doctor;
pub mod filter;

pub use build::BuildArgs;
pub use filter::FilterArgs;

use std::io::ErrorKind;
use std::path::Path;

use kexp_config::{ConfigError, KexpConfig};
use kexp_core::log_debug;

use crate::error::CliResult;

/// Load the configuration for a command.
///
/// An explicit `--config` must exist. Otherwise the project or global file
/// is used when present, and built-in defaults when not.
pub fn load_config(explicit: Option<&Path>) -> CliResult<KexpConfig> {
    if let Some(path) = explicit {
        return Ok(KexpConfig::from_file(path)?);
    }

    match KexpConfig::load_scoped() {
        Ok(config) => Ok(config),
        Err(ConfigError::Io(error)) if error.kind() == ErrorKind::NotFound => {
            log_debug!("config", "No config file found, using defaults");
            Ok(KexpConfig::default())
        }
        Err(ConfigError::HomeDirMissing) => Ok(KexpConfig::default()),
        Err(error) => Err(error.into()),
    }
}
