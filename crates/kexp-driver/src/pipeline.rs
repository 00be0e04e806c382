//! The six-stage build pipeline.
//!
//! ```text
//! compile → optimize → list-bytecode → push → aot-compile → list-native-code → Ready
//! ```
//!
//! Each stage is a [`StageDescriptor`]; [`Pipeline::run`] walks the table,
//! announces the stage, runs its command and routes the output to the
//! stage's pane. The first non-zero exit ends the run.

use std::path::Path;
use std::time::Instant;

use kexp_config::KexpConfig;
use kexp_core::{ProcessResult, Stage, ToolPaths, log_debug, log_info};
use kexp_disasm::{DumpKind, FilterOptions};
use kexp_tools::error::ToolResult;
use kexp_tools::{ProcessRunner, ToolCommand, commands, workspace};

use crate::error::DriverError;
use crate::sink::{BuildSink, READY};

/// Per-build knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOptions {
    /// R8 when true, plain D8 dexing when false.
    pub optimize: bool,
    pub min_api: u32,
    /// Device directory receiving `classes.dex` and the AOT output.
    pub device_dir: String,
    pub filters: FilterOptions,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self::from_config(&KexpConfig::default())
    }
}

impl BuildOptions {
    pub fn from_config(config: &KexpConfig) -> Self {
        Self {
            optimize: config.build.optimize,
            min_api: config.build.min_api,
            device_dir: config.build.device_dir.clone(),
            filters: config.filter_options(),
        }
    }

    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Every stage exited zero; "Ready" was emitted.
    Completed,
    /// This stage exited non-zero; no later stage ran.
    Failed(Stage),
}

impl BuildOutcome {
    pub fn is_completed(self) -> bool {
        self == BuildOutcome::Completed
    }
}

/// What reaches the stage's pane after it exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Nothing,
    Raw,
    /// Raw, with `<scratch dir>/` removed so diagnostics read `File.kt:1:5`.
    RawRelative,
    Filtered(DumpKind),
}

/// Inputs available to a command builder.
struct StageContext<'a> {
    paths: &'a ToolPaths,
    options: &'a BuildOptions,
}

/// One row of the pipeline table.
struct StageDescriptor {
    stage: Stage,
    /// May touch the scratch directory (the optimizer reads the class
    /// listing and writes its rules file).
    command: fn(&StageContext<'_>) -> ToolResult<ToolCommand>,
    on_success: Delivery,
    on_failure: Delivery,
}

static STAGES: [StageDescriptor; 6] = [
    StageDescriptor {
        stage: Stage::Compile,
        command: compile_command,
        on_success: Delivery::Nothing,
        on_failure: Delivery::RawRelative,
    },
    StageDescriptor {
        stage: Stage::Optimize,
        command: optimize_command,
        on_success: Delivery::Nothing,
        on_failure: Delivery::Raw,
    },
    StageDescriptor {
        stage: Stage::ListBytecode,
        command: list_bytecode_command,
        on_success: Delivery::Filtered(DumpKind::Dex),
        on_failure: Delivery::Raw,
    },
    StageDescriptor {
        stage: Stage::Push,
        command: push_command,
        on_success: Delivery::Nothing,
        on_failure: Delivery::Raw,
    },
    StageDescriptor {
        stage: Stage::AotCompile,
        command: aot_compile_command,
        on_success: Delivery::Nothing,
        on_failure: Delivery::Raw,
    },
    // The native listing is shown even when oatdump fails, but "Ready" is not.
    StageDescriptor {
        stage: Stage::ListNativeCode,
        command: list_native_code_command,
        on_success: Delivery::Filtered(DumpKind::Oat),
        on_failure: Delivery::Filtered(DumpKind::Oat),
    },
];

fn compile_command(ctx: &StageContext<'_>) -> ToolResult<ToolCommand> {
    Ok(commands::compile(ctx.paths))
}

fn optimize_command(ctx: &StageContext<'_>) -> ToolResult<ToolCommand> {
    let dir = &ctx.paths.scratch_dir;
    if ctx.options.optimize {
        workspace::write_rules_file(dir)?;
        let classes = workspace::class_files(dir)?;
        Ok(commands::optimize(ctx.paths, ctx.options.min_api, &classes))
    } else {
        let classes = workspace::class_files(dir)?;
        Ok(commands::dex(ctx.paths, ctx.options.min_api, &classes))
    }
}

fn list_bytecode_command(ctx: &StageContext<'_>) -> ToolResult<ToolCommand> {
    Ok(commands::list_bytecode(ctx.paths))
}

fn push_command(ctx: &StageContext<'_>) -> ToolResult<ToolCommand> {
    Ok(commands::push(ctx.paths, &ctx.options.device_dir))
}

fn aot_compile_command(ctx: &StageContext<'_>) -> ToolResult<ToolCommand> {
    Ok(commands::aot_compile(ctx.paths, &ctx.options.device_dir))
}

fn list_native_code_command(ctx: &StageContext<'_>) -> ToolResult<ToolCommand> {
    Ok(commands::list_native_code(ctx.paths, &ctx.options.device_dir))
}

/// One build over borrowed collaborators.
pub struct Pipeline<'a> {
    paths: &'a ToolPaths,
    options: &'a BuildOptions,
    runner: &'a dyn ProcessRunner,
    sink: &'a dyn BuildSink,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        paths: &'a ToolPaths,
        options: &'a BuildOptions,
        runner: &'a dyn ProcessRunner,
        sink: &'a dyn BuildSink,
    ) -> Self {
        Self {
            paths,
            options,
            runner,
            sink,
        }
    }

    /// Build `source` through every stage.
    ///
    /// Errors are reserved for invalid tool paths and scratch-directory I/O;
    /// a failing tool is a [`BuildOutcome::Failed`].
    pub async fn run(&self, source: &str) -> Result<BuildOutcome, DriverError> {
        let missing = self.paths.missing();
        if !missing.is_empty() {
            return Err(DriverError::InvalidToolPaths {
                missing: missing
                    .iter()
                    .map(|(label, path)| format!("{label} ({})", path.display()))
                    .collect(),
            });
        }

        let dir = self.paths.scratch_dir.as_path();
        workspace::clean_class_files(dir)?;
        workspace::write_source(dir, source)?;

        let ctx = StageContext {
            paths: self.paths,
            options: self.options,
        };
        let started = Instant::now();

        for descriptor in &STAGES {
            let stage = descriptor.stage;
            self.sink.status(stage.status(self.options.optimize));

            let command = (descriptor.command)(&ctx)?;
            let result = self.runner.run(&command, dir).await;
            log_debug!("pipeline", %stage, exit_code = result.exit_code, "Stage finished");

            let succeeded = result.success();
            let delivery = if succeeded {
                descriptor.on_success
            } else {
                descriptor.on_failure
            };
            if let Some(text) = self.render(delivery, result, dir) {
                self.sink.pane(stage.failure_pane(), text);
            }

            if !succeeded {
                log_info!("pipeline", %stage, "Build stopped at failing stage");
                return Ok(BuildOutcome::Failed(stage));
            }
        }

        self.sink.status(READY);
        log_info!(
            "pipeline",
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Build completed"
        );
        Ok(BuildOutcome::Completed)
    }

    fn render(&self, delivery: Delivery, result: ProcessResult, dir: &Path) -> Option<String> {
        match delivery {
            Delivery::Nothing => None,
            Delivery::Raw => Some(result.output),
            Delivery::RawRelative => Some(strip_dir_prefix(&result.output, dir)),
            Delivery::Filtered(kind) => Some(kind.filter(&result.output, &self.options.filters)),
        }
    }
}

/// Remove every `<dir>/` occurrence from compiler diagnostics.
fn strip_dir_prefix(output: &str, dir: &Path) -> String {
    let prefix = format!("{}{}", dir.display(), std::path::MAIN_SEPARATOR);
    output.replace(&prefix, "")
}
