//! `kexp build`: run the whole pipeline on one Kotlin file.

use std::path::{Path, PathBuf};

use clap::Args;
use kexp_config::KexpConfig;
use kexp_core::log_info;
use kexp_driver::{BuildEvent, BuildOutcome, ChannelSink, Explorer};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::error::{CliError, CliResult};

#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Kotlin source file
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Dex with D8 instead of optimizing with R8
    #[arg(long)]
    pub no_optimize: bool,

    /// Scratch directory for intermediate artifacts
    #[arg(long, value_name = "DIR")]
    pub scratch: Option<PathBuf>,

    /// Write the bytecode pane to a file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub bytecode_out: Option<PathBuf>,

    /// Write the native-code pane to a file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub native_out: Option<PathBuf>,
}

/// Pane contents gathered from the event stream.
#[derive(Debug, Default, PartialEq, Eq)]
struct Panes {
    bytecode: Option<String>,
    native_code: Option<String>,
}

pub async fn execute(args: BuildArgs, mut config: KexpConfig, quiet: bool) -> CliResult<()> {
    if !args.input.is_file() {
        return Err(CliError::InputNotFound {
            path: args.input.clone(),
        });
    }
    let source = tokio::fs::read_to_string(&args.input).await?;

    if args.no_optimize {
        config.build.optimize = false;
    }
    let explorer = Explorer::from_config(&config, args.scratch.as_deref())?;
    log_info!("build", input = %args.input.display(), "Building");

    let (sink, rx) = ChannelSink::new();
    let collector = tokio::spawn(collect(rx, quiet));
    let outcome = explorer.build(&source, &sink).await;
    drop(sink);
    let panes = collector.await.map_err(|error| CliError::Internal {
        message: format!("event collector failed: {error}"),
    })?;

    // Whatever reached the panes is shown even when the build failed.
    write_pane("bytecode", panes.bytecode, args.bytecode_out.as_deref()).await?;
    write_pane("native code", panes.native_code, args.native_out.as_deref()).await?;

    match outcome? {
        BuildOutcome::Completed => Ok(()),
        BuildOutcome::Failed(stage) => Err(CliError::BuildFailed { stage }),
    }
}

/// Print status lines to stderr as they arrive and keep the last text of
/// each pane.
async fn collect(mut rx: UnboundedReceiver<BuildEvent>, quiet: bool) -> Panes {
    let mut panes = Panes::default();
    while let Some(event) = rx.recv().await {
        match event {
            BuildEvent::Status(status) => {
                if !quiet {
                    eprintln!("{status}");
                }
            }
            BuildEvent::Bytecode(text) => panes.bytecode = Some(text),
            BuildEvent::NativeCode(text) => panes.native_code = Some(text),
        }
    }
    panes
}

async fn write_pane(title: &str, text: Option<String>, target: Option<&Path>) -> CliResult<()> {
    let Some(text) = text else {
        return Ok(());
    };
    match target {
        Some(path) => tokio::fs::write(path, text)
            .await
            .map_err(|source| CliError::OutputWrite {
                path: path.to_path_buf(),
                source,
            }),
        None => {
            println!("── {title} ──");
            println!("{text}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn collector_keeps_pane_text() {
        let (sink, rx) = ChannelSink::new();
        let collector = tokio::spawn(collect(rx, true));
        {
            use kexp_driver::BuildSink;
            sink.status("Compiling Kotlin…");
            sink.bytecode("error: x".into());
        }
        drop(sink);

        let panes = collector.await.unwrap();
        assert_eq!(
            panes,
            Panes {
                bytecode: Some("error: x".into()),
                native_code: None,
            }
        );
    }

    #[tokio::test]
    async fn pane_written_to_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bytecode.txt");
        write_pane("bytecode", Some("class MainKt\n".into()), Some(&path))
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "class MainKt\n");

        let err = write_pane("bytecode", Some(String::new()), Some(&tmp.path().join("no/such/dir")))
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::OutputWrite { .. }));
    }

    #[tokio::test]
    async fn missing_input_is_reported_before_discovery() {
        let tmp = tempfile::tempdir().unwrap();
        let args = BuildArgs {
            input: tmp.path().join("Main.kt"),
            no_optimize: false,
            scratch: None,
            bytecode_out: None,
            native_out: None,
        };
        let err = execute(args, KexpConfig::default(), true).await.unwrap_err();
        assert!(matches!(err, CliError::InputNotFound { .. }));
    }
}
