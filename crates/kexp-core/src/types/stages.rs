//! Build stage metadata shared across kexp components.
//!
//! The stage order is fixed; every crate (tools, driver, CLI) interprets
//! these enums the same way.

use std::fmt;

/// One external-tool step of the build pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// `kotlinc` turns the source file into `.class` files.
    Compile,
    /// R8 (or D8 when optimization is off) turns classes into `classes.dex`.
    Optimize,
    /// `dexdump -d` lists the device bytecode.
    ListBytecode,
    /// `adb push` copies the dex file to the device.
    Push,
    /// `dex2oat` compiles the dex ahead of time on the device.
    AotCompile,
    /// `oatdump` lists the native code.
    ListNativeCode,
}

/// Output channel a stage writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pane {
    /// Device-bytecode pane (also the compiler's error console).
    Bytecode,
    /// Native-code pane.
    NativeCode,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 6] = [
        Stage::Compile,
        Stage::Optimize,
        Stage::ListBytecode,
        Stage::Push,
        Stage::AotCompile,
        Stage::ListNativeCode,
    ];

    /// Short machine-friendly name.
    pub fn name(self) -> &'static str {
        match self {
            Stage::Compile => "compile",
            Stage::Optimize => "optimize",
            Stage::ListBytecode => "list-bytecode",
            Stage::Push => "push",
            Stage::AotCompile => "aot-compile",
            Stage::ListNativeCode => "list-native-code",
        }
    }

    /// Status line shown while the stage runs.
    ///
    /// `optimize` selects between the R8 and the plain D8 wording for
    /// [`Stage::Optimize`].
    pub fn status(self, optimize: bool) -> &'static str {
        match self {
            Stage::Compile => "Compiling Kotlin…",
            Stage::Optimize if optimize => "Optimizing with R8…",
            Stage::Optimize => "Dexing…",
            Stage::ListBytecode => "Disassembling device bytecode…",
            Stage::Push => "Pushing to device…",
            Stage::AotCompile => "AOT compilation…",
            Stage::ListNativeCode => "Disassembling native code…",
        }
    }

    /// Pane that receives the raw output when this stage fails.
    pub fn failure_pane(self) -> Pane {
        match self {
            Stage::Compile | Stage::Optimize | Stage::ListBytecode => Pane::Bytecode,
            Stage::Push | Stage::AotCompile | Stage::ListNativeCode => Pane::NativeCode,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
