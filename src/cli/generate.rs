//! Card generation (the default command).

use std::path::PathBuf;

use anyhow::{Context, Result};
use cardsheet::{Diagnostics, Job, RenderOptions, Summary, generate_bytes, generate_to_path};
use clap::Args;
use serde::Serialize;

use crate::cli::common::{FormatArg, LayoutArg};
use crate::cli::utils::{creation_date, load_input, write_stdout};

/// Args for generating a card document.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Routine definition (JSON); `-` reads stdin.
    ///
    /// Required when generating. Held as an `Option` because the
    /// subcommands lift the requirement and derive cannot leave a bare
    /// `PathBuf` unset.
    #[arg(short = 'i', long = "input", required = true)]
    pub input: Option<PathBuf>,
    /// Destination file (directory for multi-sheet PNG). Omit to write the PDF to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Card layout.
    #[arg(short = 'l', long, default_value_t = LayoutArg::Auto, value_enum)]
    pub layout: LayoutArg,
    /// Output encoding.
    #[arg(long, default_value_t = FormatArg::Pdf, value_enum)]
    pub format: FormatArg,
    /// Resolution for PNG output.
    #[arg(long, default_value_t = 150)]
    pub dpi: u32,
    /// Include item and checksum diagnostics in the summary.
    #[arg(long)]
    pub diagnostics: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    #[serde(flatten)]
    summary: &'a Summary,
    #[serde(flatten)]
    diagnostics: Option<&'a Diagnostics>,
}

/// Execute a generation run.
pub fn handle(args: GenerateArgs) -> Result<()> {
    let input_path = args.input.context("--input is required")?;
    let input = load_input(&input_path)?;
    let job = Job::from_input(&input, args.layout.into())?;
    let options = RenderOptions {
        format: args.format.into(),
        dpi: args.dpi,
        created: Some(creation_date()?),
    };

    match args.output {
        Some(path) => {
            let generation = generate_to_path(&job, &options, &path)
                .with_context(|| format!("failed to generate {}", path.display()))?;
            let report = Report {
                summary: &generation.summary,
                diagnostics: args.diagnostics.then_some(&generation.diagnostics),
            };
            println!("{}", serde_json::to_string(&report)?);
        }
        None => {
            let bytes = generate_bytes(&job, &options).context("failed to generate document")?;
            write_stdout(&bytes)?;
        }
    }
    Ok(())
}
