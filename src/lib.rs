//! Layout and pagination engine for printable routine tracking cards.
//!
//! A [`Routine`] is drawn onto fixed-size cards, cards are tiled onto Letter
//! sheets according to a [`LayoutName`], and each sheet carries dashed cut
//! guides. Drawing goes through the [`Surface`] trait; PDF, PNG and in-memory
//! recording backends are provided.

mod card;
mod errors;
mod generate;
mod layout;
mod routine;
mod sheet;
pub mod surface;

pub use card::{CardFrame, CardOutcome, MARKER_RADIUS, VERSION_RESERVE, render_card};
pub use errors::{CardError, Result};
pub use generate::{
    Diagnostics, Generation, Job, OutputFormat, Pagination, RenderOptions, Summary,
    generate_bytes, generate_to_path, paginate,
};
pub use layout::{
    LayoutChoice, LayoutName, LayoutSpec, MARGIN, PAGE_HEIGHT, PAGE_WIDTH, suggest,
};
pub use routine::{Item, ItemKind, ItemRecord, Routine, RoutineInput};
pub use sheet::{CUT_DASH, Placement, SheetPlan, draw_cut_guides, start_sheet};
pub use surface::Surface;
