//! Configuration primitives for kexp.
//!
//! This crate parses the TOML-based `~/.kexp/config.toml` (and project-specific
//! `.kexp/config.toml` variants) so that the driver and the CLI read toolchain
//! hints, build options and filter options from a single schema.
//!
//! ```toml
//! [toolchain]
//! android_home = "/opt/android-sdk"
//! kotlin_home = "/opt/kotlinc"
//!
//! [build]
//! optimize = true
//! min_api = 21
//!
//! [filters]
//! suppressed_prefixes = ["kotlin.", "kotlinx."]
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use kexp_core::constants::{DEFAULT_DEVICE_DIR, DEFAULT_MIN_API};
use kexp_core::paths;
use kexp_disasm::{DEFAULT_SUPPRESSED_PREFIXES, FilterOptions, SuppressionPredicate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use kexp_core::ToolchainConfig;

pub(crate) type Result<T> = std::result::Result<T, ConfigError>;

/// Application configuration loaded from TOML files.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct KexpConfig {
    /// Where to find kotlinc, the Android SDK and the JDK.
    pub toolchain: ToolchainConfig,

    /// Pipeline options.
    pub build: BuildConfig,

    /// Dump filter options.
    pub filters: FiltersConfig,
}

/// Options for one build run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildConfig {
    /// Run R8 (true) or plain D8 dexing (false).
    #[serde(default = "default_true")]
    pub optimize: bool,

    /// `--min-api` passed to R8/D8.
    #[serde(default = "default_min_api")]
    pub min_api: u32,

    /// Scratch directory for intermediate artifacts (defaults to a temp dir).
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,

    /// Kill a tool that runs longer than this. No timeout when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Directory on the device receiving the dex and AOT artifacts.
    #[serde(default = "default_device_dir")]
    pub device_dir: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            optimize: true,
            min_api: default_min_api(),
            scratch_dir: None,
            timeout_secs: None,
            device_dir: default_device_dir(),
        }
    }
}

/// Dump filter configuration (`[filters]`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FiltersConfig {
    /// Class-name prefixes hidden from both panes.
    #[serde(default = "default_suppressed_prefixes")]
    pub suppressed_prefixes: Vec<String>,

    /// List `dexdump` virtual methods as well as direct ones.
    #[serde(default)]
    pub include_virtual_methods: bool,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            suppressed_prefixes: default_suppressed_prefixes(),
            include_virtual_methods: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_min_api() -> u32 {
    DEFAULT_MIN_API
}

fn default_device_dir() -> String {
    DEFAULT_DEVICE_DIR.to_string()
}

fn default_suppressed_prefixes() -> Vec<String> {
    DEFAULT_SUPPRESSED_PREFIXES
        .iter()
        .map(|prefix| prefix.to_string())
        .collect()
}

impl KexpConfig {
    /// Loads configuration from the given path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str::<KexpConfig>(&contents).map_err(ConfigError::Parse)
    }

    /// Returns the default configuration path (`$KEXP_HOME/config.toml`,
    /// else `$HOME/.kexp/config.toml`).
    pub fn default_path() -> Result<PathBuf> {
        paths::global_config_path().ok_or(ConfigError::HomeDirMissing)
    }

    /// Load configuration from the default location.
    pub fn load_default() -> Result<Self> {
        let path = Self::default_path()?;
        Self::from_file(path)
    }

    /// Load configuration for the current working directory, falling back to the
    /// global config when no project-level file exists.
    pub fn load_scoped() -> Result<Self> {
        let cwd = env::current_dir().map_err(ConfigError::Io)?;
        if let Some(path) = paths::project_config_path(&cwd) {
            return Self::from_file(path);
        }
        Self::load_default()
    }

    /// Filter options derived from `[filters]`.
    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            suppression: SuppressionPredicate::new(self.filters.suppressed_prefixes.iter().cloned()),
            include_virtual_methods: self.filters.include_virtual_methods,
        }
    }
}

/// Errors that can occur while parsing kexp configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO failure when reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Unable to determine home directory for default config path")]
    HomeDirMissing,
}
