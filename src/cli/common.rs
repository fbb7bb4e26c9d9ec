//! Shared clap helper types for CLI commands.

use cardsheet::{LayoutChoice, LayoutName, OutputFormat};
use clap::ValueEnum;

/// Card layout flag; `auto` picks from the item count.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutArg {
    Quarter,
    Half,
    Full,
    Auto,
}

impl From<LayoutArg> for LayoutChoice {
    fn from(value: LayoutArg) -> LayoutChoice {
        match value {
            LayoutArg::Quarter => LayoutChoice::Named(LayoutName::Quarter),
            LayoutArg::Half => LayoutChoice::Named(LayoutName::Half),
            LayoutArg::Full => LayoutChoice::Named(LayoutName::Full),
            LayoutArg::Auto => LayoutChoice::Auto,
        }
    }
}

/// Output encodings.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Pdf,
    Png,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> OutputFormat {
        match value {
            FormatArg::Pdf => OutputFormat::Pdf,
            FormatArg::Png => OutputFormat::Png,
        }
    }
}
