//! Discovery of the external toolchain.
//!
//! Locations come from the `[toolchain]` configuration first, then from the
//! usual environment variables, then from `PATH`. Versioned directories
//! (`build-tools/<version>`, `platforms/android-<N>`) resolve to the highest
//! installed version unless one is pinned.

use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ToolPathsError;
use crate::log_debug;

const ANDROID_ENV_VARS: &[&str] = &["ANDROID_HOME", "ANDROID_SDK_ROOT"];
const KOTLIN_ENV_VARS: &[&str] = &["KOTLIN_HOME"];
const JAVA_ENV_VARS: &[&str] = &["JAVA_HOME"];

/// Kotlin runtime jars put on the compile classpath and handed to R8/D8.
const KOTLIN_RUNTIME_JARS: &[&str] = &[
    "kotlin-stdlib.jar",
    "kotlin-stdlib-jdk8.jar",
    "kotlin-annotations-jvm.jar",
    "kotlinx-coroutines-core-jvm.jar",
];

const PLATFORM_PREFIX: &str = "android-";

/// User-provided hints for locating the toolchain (`[toolchain]` section).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Android SDK root (falls back to `ANDROID_HOME` / `ANDROID_SDK_ROOT`).
    pub android_home: Option<PathBuf>,
    /// Kotlin distribution root (falls back to `KOTLIN_HOME`, then `kotlinc` on `PATH`).
    pub kotlin_home: Option<PathBuf>,
    /// JDK root (falls back to `JAVA_HOME`, then `java` on `PATH`).
    pub java_home: Option<PathBuf>,
    /// Pin a build-tools version such as `34.0.0`.
    pub build_tools_version: Option<String>,
    /// Pin a platform directory such as `android-34`.
    pub platform: Option<String>,
}

/// Resolved locations of every external tool the pipeline invokes.
///
/// Immutable for the duration of a build. Check [`ToolPaths::is_valid`]
/// before running stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub kotlinc: PathBuf,
    pub java: PathBuf,
    /// `d8.jar` from build-tools; hosts both R8 and D8.
    pub optimizer_jar: PathBuf,
    /// Platform stub `android.jar`.
    pub platform_jar: PathBuf,
    pub adb: PathBuf,
    pub build_tools_dir: PathBuf,
    pub dexdump: PathBuf,
    pub runtime_jars: Vec<PathBuf>,
    pub scratch_dir: PathBuf,
}

impl ToolPaths {
    /// Resolve tool locations from configuration, environment and `PATH`.
    pub fn discover(
        config: &ToolchainConfig,
        scratch_dir: impl Into<PathBuf>,
    ) -> Result<Self, ToolPathsError> {
        let android_home = config
            .android_home
            .clone()
            .or_else(|| env_prefix(ANDROID_ENV_VARS))
            .ok_or(ToolPathsError::AndroidSdkMissing)?;

        let kotlin_home = config
            .kotlin_home
            .clone()
            .or_else(|| env_prefix(KOTLIN_ENV_VARS))
            .or_else(kotlin_home_from_path)
            .ok_or(ToolPathsError::KotlinMissing)?;

        let java = config
            .java_home
            .clone()
            .or_else(|| env_prefix(JAVA_ENV_VARS))
            .map(|home| home.join("bin").join(executable("java")))
            .filter(|path| path.is_file())
            .or_else(|| which::which("java").ok())
            .unwrap_or_else(|| PathBuf::from(executable("java")));

        let build_tools_root = android_home.join("build-tools");
        let build_tools_dir = match &config.build_tools_version {
            Some(version) => build_tools_root.join(version),
            None => {
                latest_versioned_dir(&build_tools_root, "build-tools", |name| Some(name))?
            }
        };

        let platforms_root = android_home.join("platforms");
        let platform_dir = match &config.platform {
            Some(platform) => platforms_root.join(platform),
            None => latest_versioned_dir(&platforms_root, "platform", |name| {
                name.strip_prefix(PLATFORM_PREFIX)
            })?,
        };

        let paths = Self::from_layout(
            &android_home,
            &kotlin_home,
            java,
            build_tools_dir,
            &platform_dir,
            scratch_dir.into(),
        );
        log_debug!("toolchain", paths = ?paths, "Resolved tool paths");
        Ok(paths)
    }

    /// Build tool paths from an already-resolved SDK/Kotlin layout.
    pub fn from_layout(
        android_home: &Path,
        kotlin_home: &Path,
        java: PathBuf,
        build_tools_dir: PathBuf,
        platform_dir: &Path,
        scratch_dir: PathBuf,
    ) -> Self {
        let kotlin_lib = kotlin_home.join("lib");
        let mut runtime_jars: Vec<PathBuf> = KOTLIN_RUNTIME_JARS
            .iter()
            .map(|jar| kotlin_lib.join(jar))
            .filter(|jar| jar.is_file())
            .collect();
        if runtime_jars.is_empty() {
            // Keep the stdlib so `missing()` names it.
            runtime_jars.push(kotlin_lib.join(KOTLIN_RUNTIME_JARS[0]));
        }

        Self {
            kotlinc: kotlin_home.join("bin").join(kotlinc_executable()),
            java,
            optimizer_jar: build_tools_dir.join("lib").join("d8.jar"),
            platform_jar: platform_dir.join("android.jar"),
            adb: android_home
                .join("platform-tools")
                .join(executable("adb")),
            dexdump: build_tools_dir.join(executable("dexdump")),
            build_tools_dir,
            runtime_jars,
            scratch_dir,
        }
    }

    /// Every location with a short label, in a stable order.
    pub fn locations(&self) -> Vec<(&'static str, &Path)> {
        let mut locations = vec![
            ("kotlinc", self.kotlinc.as_path()),
            ("java", self.java.as_path()),
            ("optimizer jar", self.optimizer_jar.as_path()),
            ("platform jar", self.platform_jar.as_path()),
            ("adb", self.adb.as_path()),
            ("build-tools", self.build_tools_dir.as_path()),
            ("dexdump", self.dexdump.as_path()),
        ];
        locations.extend(
            self.runtime_jars
                .iter()
                .map(|jar| ("runtime jar", jar.as_path())),
        );
        locations.push(("scratch dir", self.scratch_dir.as_path()));
        locations
    }

    /// Locations that do not exist on disk.
    pub fn missing(&self) -> Vec<(&'static str, &Path)> {
        self.locations()
            .into_iter()
            .filter(|(_, path)| !path.exists())
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.missing().is_empty()
    }
}

/// First environment variable naming an existing directory.
fn env_prefix(env_vars: &[&str]) -> Option<PathBuf> {
    env_vars
        .iter()
        .filter_map(|key| env::var_os(key))
        .map(PathBuf::from)
        .find(|path| path.is_dir())
}

/// `<prefix>/bin/kotlinc` on `PATH` -> `<prefix>`.
fn kotlin_home_from_path() -> Option<PathBuf> {
    let kotlinc = which::which(kotlinc_executable()).ok()?;
    let kotlinc = kotlinc.canonicalize().unwrap_or(kotlinc);
    kotlinc.parent()?.parent().map(Path::to_path_buf)
}

/// Highest-versioned child directory of `root`.
///
/// `version_of` extracts the version part of a directory name (or rejects
/// the entry). Versions compare numerically component by component, so
/// `34.0.0` beats `9.0.0` and `android-34` beats `android-9`.
fn latest_versioned_dir(
    root: &Path,
    kind: &'static str,
    version_of: impl Fn(&str) -> Option<&str>,
) -> Result<PathBuf, ToolPathsError> {
    let no_version = || ToolPathsError::NoVersionInstalled {
        kind,
        dir: root.to_path_buf(),
    };
    if !root.is_dir() {
        return Err(no_version());
    }

    let entries = fs::read_dir(root).map_err(|source| ToolPathsError::Io {
        path: root.to_path_buf(),
        source,
    })?;

    entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .filter_map(|path| {
            let key = path
                .file_name()
                .and_then(OsStr::to_str)
                .and_then(&version_of)
                .map(version_key)?;
            Some((key, path))
        })
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, path)| path)
        .ok_or_else(no_version)
}

/// Sort key for a version directory name.
///
/// Release numbers compare numerically, then a release sorts above any of
/// its pre-releases: `35.0.0-rc1` -> `([35, 0, 0], false, [1])`.
fn version_key(version: &str) -> (Vec<u64>, bool, Vec<u64>) {
    let (release, pre_release) = match version.split_once('-') {
        Some((release, pre_release)) => (release, Some(pre_release)),
        None => (version, None),
    };
    (
        numbers(release.split('.')),
        pre_release.is_none(),
        pre_release.map_or_else(Vec::new, |pre| numbers(pre.split(['.', '-']))),
    )
}

fn numbers<'a>(parts: impl Iterator<Item = &'a str>) -> Vec<u64> {
    parts
        .map(|part| {
            let digits: String = part.chars().filter(char::is_ascii_digit).collect();
            digits.parse().unwrap_or(0)
        })
        .collect()
}

fn executable(name: &str) -> String {
    if cfg!(windows) {
        format!("{name}.exe")
    } else {
        name.to_string()
    }
}

fn kotlinc_executable() -> &'static str {
    if cfg!(windows) { "kotlinc.bat" } else { "kotlinc" }
}
