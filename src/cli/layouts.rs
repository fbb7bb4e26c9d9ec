//! Layout discovery commands (`cardsheet layouts`, `cardsheet suggest`).

use std::path::PathBuf;

use anyhow::Result;
use cardsheet::{LayoutName, suggest as suggest_layout};
use clap::Args;

use crate::cli::utils::load_input;

/// Arguments for `cardsheet suggest`.
#[derive(Args, Debug)]
pub struct SuggestArgs {
    /// Routine definition (JSON); `-` reads stdin.
    #[arg(short = 'i', long = "input", default_value = "-")]
    pub input: PathBuf,
}

pub fn list() -> Result<()> {
    println!("Available layouts:");
    for name in LayoutName::ALL {
        let spec = name.spec();
        println!(
            "  - {:<8} {}x{} per page, card {}x{} pt",
            name, spec.columns, spec.rows, spec.card_width, spec.card_height
        );
    }
    println!("  - auto     quarter up to 8 items, half up to 15, full beyond");
    Ok(())
}

pub fn suggest(args: SuggestArgs) -> Result<()> {
    let input = load_input(&args.input)?;
    let count = input.item_count();
    println!("{} ({} items)", suggest_layout(count), count);
    Ok(())
}
