//! Argument vectors for every pipeline stage.
//!
//! Builders are pure: the only input besides [`ToolPaths`] is the class
//! listing, which the caller obtains from [`crate::workspace::class_files`].

use std::fmt;
use std::path::{Path, PathBuf};

use kexp_core::ToolPaths;
use kexp_core::constants::{D8_MAIN_CLASS, DEX_FILE, OAT_FILE, R8_MAIN_CLASS, RULES_FILE, SOURCE_FILE};

/// A program and its arguments. Runs in the scratch directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Program followed by its arguments.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(path_arg(&self.program))
            .chain(self.args.iter().cloned())
            .collect()
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.argv().join(" "))
    }
}

/// `kotlinc -Xmulti-platform -classpath <runtime jars>:<android.jar> KotlinExplorer.kt`
pub fn compile(paths: &ToolPaths) -> ToolCommand {
    let classpath = paths
        .runtime_jars
        .iter()
        .chain(std::iter::once(&paths.platform_jar))
        .map(|jar| path_arg(jar))
        .collect::<Vec<_>>()
        .join(CLASSPATH_SEPARATOR);

    ToolCommand::new(&paths.kotlinc)
        .arg("-Xmulti-platform")
        .arg("-classpath")
        .arg(classpath)
        .arg(path_arg(&paths.scratch_dir.join(SOURCE_FILE)))
}

/// R8 in release mode with the generated rules file.
pub fn optimize(paths: &ToolPaths, min_api: u32, classes: &[String]) -> ToolCommand {
    java_entry_point(paths, R8_MAIN_CLASS)
        .arg("--release")
        .args(["--min-api".to_string(), min_api.to_string()])
        .args(["--pg-conf", RULES_FILE])
        .args(["--output", "."])
        .arg("--lib")
        .arg(path_arg(&paths.platform_jar))
        .args(classes.iter().cloned())
        .args(paths.runtime_jars.iter().map(|jar| path_arg(jar)))
}

/// D8 dexing without optimization, used when optimization is turned off.
pub fn dex(paths: &ToolPaths, min_api: u32, classes: &[String]) -> ToolCommand {
    java_entry_point(paths, D8_MAIN_CLASS)
        .args(["--min-api".to_string(), min_api.to_string()])
        .args(["--output", "."])
        .args(classes.iter().cloned())
        .args(paths.runtime_jars.iter().map(|jar| path_arg(jar)))
}

/// `dexdump -d classes.dex`
pub fn list_bytecode(paths: &ToolPaths) -> ToolCommand {
    ToolCommand::new(&paths.dexdump).args(["-d", DEX_FILE])
}

/// `adb push classes.dex <device_dir>/classes.dex`
pub fn push(paths: &ToolPaths, device_dir: &str) -> ToolCommand {
    ToolCommand::new(&paths.adb)
        .arg("push")
        .arg(DEX_FILE)
        .arg(device_path(device_dir, DEX_FILE))
}

/// `adb shell dex2oat --dex-file=... --oat-file=...`
pub fn aot_compile(paths: &ToolPaths, device_dir: &str) -> ToolCommand {
    ToolCommand::new(&paths.adb)
        .args(["shell", "dex2oat"])
        .arg(format!("--dex-file={}", device_path(device_dir, DEX_FILE)))
        .arg(format!("--oat-file={}", device_path(device_dir, OAT_FILE)))
}

/// `adb shell oatdump --oat-file=...`
pub fn list_native_code(paths: &ToolPaths, device_dir: &str) -> ToolCommand {
    ToolCommand::new(&paths.adb)
        .args(["shell", "oatdump"])
        .arg(format!("--oat-file={}", device_path(device_dir, OAT_FILE)))
}

const CLASSPATH_SEPARATOR: &str = if cfg!(windows) { ";" } else { ":" };

fn java_entry_point(paths: &ToolPaths, main_class: &str) -> ToolCommand {
    ToolCommand::new(&paths.java)
        .arg("-classpath")
        .arg(path_arg(&paths.optimizer_jar))
        .arg(main_class)
}

/// Device paths are always `/`-separated, whatever the host.
fn device_path(device_dir: &str, file: &str) -> String {
    format!("{}/{file}", device_dir.trim_end_matches('/'))
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
