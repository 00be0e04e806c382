//! kexp CLI - compile Kotlin snippets down to Android bytecode and native code.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod error;

use error::CliResult;
use tracing_subscriber::EnvFilter;

/// kexp: Kotlin explorer
///
/// Compiles a Kotlin file with kotlinc, dexes it with R8 (or D8), lists the
/// dex bytecode, then AOT-compiles it on a connected device and lists the
/// resulting native code.
#[derive(Debug, Parser)]
#[command(name = "kexp")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output (can be repeated: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path.
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build a Kotlin file through every stage.
    ///
    /// Status lines go to stderr; the bytecode and native-code listings go
    /// to stdout unless redirected with --bytecode-out/--native-out.
    #[command(visible_alias = "b")]
    Build(commands::BuildArgs),

    /// Condense a saved dexdump or oatdump listing.
    Filter(commands::FilterArgs),

    /// Check that kotlinc, the JDK, the Android SDK and adb are found.
    Doctor,

    /// Show version information.
    Version,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(error) = init_tracing(cli.verbose, cli.quiet) {
        eprintln!("warning: {error:#}");
    }

    let result = run(cli).await;
    result.map(|_| ExitCode::SUCCESS).unwrap_or_else(|e| {
        eprintln!("{e}");
        ExitCode::from(e.exit_code() as u8)
    })
}

async fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Command::Version => {
            print_version();
            Ok(())
        }
        Command::Build(args) => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::build::execute(args, config, cli.quiet).await
        }
        Command::Filter(args) => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::filter::execute(args, &config)
        }
        Command::Doctor => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::doctor::execute(&config)
        }
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over `-v`/`-q`.
fn init_tracing(verbose: u8, quiet: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(verbose, quiet)))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to install tracing subscriber: {error}"))
}

fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Print version information.
fn print_version() {
    println!("kexp {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Target: {}", std::env::consts::ARCH);
    println!("OS: {}", std::env::consts::OS);
}
