//! Command-line interface wiring for the `cardsheet` binary.
//!
//! Running without a subcommand generates cards; the subcommands only
//! inspect the layout table.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod common;
pub mod generate;
pub mod layouts;
pub mod utils;

/// Parsed CLI entrypoint for the `cardsheet` binary.
#[derive(Parser, Debug)]
#[command(
    name = "cardsheet",
    version,
    about = "Lay out routine tracking cards onto printable sheets",
    subcommand_negates_reqs = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub generate: generate::GenerateArgs,

    /// Log progress to stderr.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the available card layouts.
    Layouts,
    /// Show which layout `auto` would pick for a routine.
    Suggest(layouts::SuggestArgs),
}

/// Execute the requested command.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        None => generate::handle(cli.generate),
        Some(Command::Layouts) => layouts::list(),
        Some(Command::Suggest(args)) => layouts::suggest(args),
    }
}
