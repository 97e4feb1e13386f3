use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgGroup, Parser};
use colored::*;
use tracing_subscriber::EnvFilter;
use yake_core::execution::command::DEFAULT_SHELL;
use yake_core::manager::{YakeManager, YakeManagerConfig};
use yake_core::YakeError;

mod commands;

/// Yake - make with yaml files
#[derive(Parser)]
#[command(name = "yake")]
#[command(about = "Run targets declared in a Yakefile")]
#[command(version)]
#[command(group(ArgGroup::new("mode").args(["plan", "graph", "check", "schema"])))]
struct Cli {
    /// Dotted path of the target to run (e.g. docker.postgres); a group lists its targets
    target: Option<String>,

    /// Path to the Yakefile
    #[arg(short, long, env = "YAKE_FILE", default_value = "Yakefile")]
    file: PathBuf,

    /// Shell used to run each step
    #[arg(long, env = "YAKE_SHELL", default_value = DEFAULT_SHELL)]
    shell: String,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Show the execution plan for the target without running it
    #[arg(long, requires = "target")]
    plan: bool,

    /// Show the dependency graph of all callable targets
    #[arg(long)]
    graph: bool,

    /// Validate the whole document without running anything
    #[arg(long)]
    check: bool,

    /// Print the JSON schema of the Yakefile format
    #[arg(long)]
    schema: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            let code = err
                .downcast_ref::<YakeError>()
                .map(YakeError::exit_code)
                .unwrap_or(1);
            ExitCode::from(u8::try_from(code).ok().filter(|c| *c != 0).unwrap_or(1))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if cli.schema {
        return commands::schema::execute();
    }

    let manager = YakeManager::new(YakeManagerConfig {
        document_path: cli.file,
        shell: cli.shell,
    })?;

    // The CLI layer only handles presentation
    if cli.graph {
        commands::graph::execute(&manager)
    } else if cli.check {
        commands::check::execute(&manager)
    } else if let (true, Some(target)) = (cli.plan, cli.target.as_deref()) {
        commands::plan::execute(&manager, target)
    } else {
        commands::run::execute(&manager, cli.target.as_deref())
    }
}
