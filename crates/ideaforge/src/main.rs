//! IdeaForge launcher.
//!
//! Drives the idea-refinement pipeline from the terminal: `demo` runs a
//! scripted session against the offline generator and the in-memory store,
//! `stages` prints the stage machine.

use anyhow::Result;
use clap::{Parser, Subcommand};
use ideaforge_logging::{init_logging, LogConfig};

mod demo;
mod offline;
mod output;

#[derive(Parser, Debug)]
#[command(name = "ideaforge", about = "Guided idea refinement from the terminal")]
struct Cli {
    /// Mirror the log file's verbosity on the console
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a scripted refinement session end to end
    Demo(demo::DemoArgs),
    /// Print the pipeline stages and their allowed transitions
    Stages,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(LogConfig {
        app_name: "ideaforge",
        verbose: cli.verbose,
    })?;

    match cli.command {
        Command::Demo(args) => demo::run(args).await,
        Command::Stages => {
            output::print_stage_table();
            Ok(())
        }
    }
}
