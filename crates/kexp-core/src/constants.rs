//! Fixed file names and tool entry points.
//!
//! Downstream tools locate their inputs by these exact names, so they are
//! literals rather than configuration.

/// Source file written into the scratch directory before compiling.
pub const SOURCE_FILE: &str = "KotlinExplorer.kt";

/// Optimizer rules file generated next to the compiled classes.
pub const RULES_FILE: &str = "rules.txt";

/// Dex file produced by R8/D8 and consumed by `dexdump` and `adb push`.
pub const DEX_FILE: &str = "classes.dex";

/// AOT output written on the device by `dex2oat` (the `.vdex` sibling is implicit).
pub const OAT_FILE: &str = "classes.oat";

/// Extension of the compiler's class outputs.
pub const CLASS_EXTENSION: &str = "class";

/// Device directory that receives the dex and the AOT artifacts.
pub const DEFAULT_DEVICE_DIR: &str = "/sdcard";

/// Minimum API level passed to R8/D8.
pub const DEFAULT_MIN_API: u32 = 21;

/// R8 entry point inside the build-tools `d8.jar`.
pub const R8_MAIN_CLASS: &str = "com.android.tools.r8.R8";

/// D8 entry point inside the build-tools `d8.jar`.
pub const D8_MAIN_CLASS: &str = "com.android.tools.r8.D8";

/// Placeholder for names the dump filters could not extract.
pub const UNKNOWN: &str = "<UNKNOWN>";
