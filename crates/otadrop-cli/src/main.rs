mod config;
mod dispatch;
mod render;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::dispatch::run_cli;

#[derive(Parser, Debug)]
#[command(name = "otadrop")]
#[command(about = "On-device side-load update agent", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Run the update pipeline against the configured drop directory
    Run {
        #[arg(long)]
        config: Option<PathBuf>,
        /// Stop after the version gate and report the decision
        #[arg(long, conflicts_with = "json")]
        dry_run: bool,
        /// Emit the ordered event stream and outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Inspect the agent's configuration and host surroundings
    Doctor {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    Version,
    Completions {
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run_cli(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
