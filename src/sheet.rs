//! Physical sheets: cut guides and the assignment of cards to grid cells.

use tracing::trace;

use crate::card::CardFrame;
use crate::layout::{LayoutSpec, PAGE_HEIGHT, PAGE_WIDTH};
use crate::surface::{Dash, Ink, Point, Surface};

/// Dash pattern for cut guides.
pub const CUT_DASH: Dash = Dash { on: 6.0, off: 3.0 };
const GUIDE_WIDTH: f32 = 0.5;

/// Open sheet `page_index` and draw its cut guides.
///
/// The first sheet is the one the surface starts with; later sheets are
/// requested from the surface here, so guides are always drawn on a sheet
/// this function began and before any card content lands on it.
pub fn start_sheet<S: Surface>(surface: &mut S, spec: &LayoutSpec, page_index: u32) {
    if page_index > 0 {
        surface.new_page();
    }
    draw_cut_guides(surface, spec);
    trace!(page = page_index, layout = %spec.name, "started sheet");
}

/// Dashed lines along every internal column and row boundary, edge to edge.
pub fn draw_cut_guides<S: Surface>(surface: &mut S, spec: &LayoutSpec) {
    surface.set_stroke(Ink::Gray);
    surface.set_line_width(GUIDE_WIDTH);
    surface.set_dash(Some(CUT_DASH));

    for column in 1..spec.columns {
        let x = column as f32 * spec.card_width;
        surface.line(Point::new(x, 0.0), Point::new(x, PAGE_HEIGHT));
    }
    for row in 1..spec.rows {
        let y = PAGE_HEIGHT - row as f32 * spec.card_height;
        surface.line(Point::new(0.0, y), Point::new(PAGE_WIDTH, y));
    }

    surface.set_dash(None);
    surface.set_stroke(Ink::Black);
}

/// One card's slot on a sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Zero-based running card number across the whole job.
    pub card: u32,
    pub page: u32,
    pub row: u32,
    pub column: u32,
    pub frame: CardFrame,
}

/// How `quantity` cards spread over sheets of a given layout.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetPlan<'a> {
    spec: &'a LayoutSpec,
    quantity: u32,
}

impl<'a> SheetPlan<'a> {
    pub fn new(spec: &'a LayoutSpec, quantity: u32) -> Self {
        Self { spec, quantity }
    }

    pub fn spec(&self) -> &'a LayoutSpec {
        self.spec
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn cards_per_page(&self) -> u32 {
        self.spec.cards_per_page()
    }

    pub fn pages(&self) -> u32 {
        self.spec.pages_for(self.quantity)
    }

    /// Filled cells on `page`, row-major. Cells past the last card are omitted.
    pub fn placements_on(&self, page: u32) -> impl Iterator<Item = Placement> + '_ {
        let per_page = self.cards_per_page();
        let spec = self.spec;
        (0..spec.rows)
            .flat_map(move |row| (0..spec.columns).map(move |column| (row, column)))
            .enumerate()
            .map(move |(cell, (row, column))| (page * per_page + cell as u32, row, column))
            .take_while(move |(card, _, _)| *card < self.quantity)
            .map(move |(card, row, column)| {
                let (x, y) = spec.cell_origin(row, column);
                Placement {
                    card,
                    page,
                    row,
                    column,
                    frame: CardFrame::new(Point::new(x, y), spec.card_width, spec.card_height),
                }
            })
    }
}
