//! Drawing surfaces the layout engine draws onto.
//!
//! Coordinates are in points with the origin at the bottom-left corner of the
//! page, y growing upwards. Surfaces start with one page already open.

mod metrics;
mod pdf;
mod raster;
mod recording;

pub use metrics::text_width;
pub use pdf::{DocumentInfo, PdfSurface};
pub use raster::RasterSurface;
pub use recording::{DrawOp, RecordingSurface, Recorded};

/// A position on the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle anchored at its lower-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Ink colour. Cards only use two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Ink {
    #[default]
    Black,
    Gray,
}

impl Ink {
    /// Gray level, 0.0 being black.
    pub fn level(self) -> f32 {
        match self {
            Ink::Black => 0.0,
            Ink::Gray => 0.7,
        }
    }
}

/// Typefaces available to card content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Font {
    #[default]
    Regular,
    Bold,
}

/// Horizontal anchoring of a string relative to its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
    Center,
}

/// On/off dash lengths for stroked lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dash {
    pub on: f32,
    pub off: f32,
}

/// Ordered, append-only stream of drawing commands.
///
/// Later calls paint over earlier ones, so callers must issue them in the
/// order they should appear.
pub trait Surface {
    fn set_fill(&mut self, ink: Ink);
    fn set_stroke(&mut self, ink: Ink);
    fn set_line_width(&mut self, width: f32);
    /// `None` restores solid lines.
    fn set_dash(&mut self, dash: Option<Dash>);
    fn set_font(&mut self, font: Font, size: f32);

    fn fill_circle(&mut self, center: Point, radius: f32);
    fn stroke_rect(&mut self, rect: Rect);
    fn line(&mut self, from: Point, to: Point);
    fn draw_text(&mut self, at: Point, text: &str, align: Align);

    /// Close the current page and start a fresh one with default graphics state.
    fn new_page(&mut self);
}
