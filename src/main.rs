use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose);
    cli::run(cli)
}

/// Logs go to stderr; stdout carries the document or the JSON summary.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("cardsheet=debug")
    } else {
        EnvFilter::try_from_env("CARDSHEET_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
