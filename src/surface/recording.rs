use std::fmt::Write;

use sha2::{Digest, Sha256};

use super::{Align, Dash, Font, Ink, Point, Rect, Surface};

/// A drawing command together with the graphics state it was issued under.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Circle {
        center: Point,
        radius: f32,
        fill: Ink,
    },
    Rect {
        rect: Rect,
        stroke: Ink,
        line_width: f32,
    },
    Line {
        from: Point,
        to: Point,
        stroke: Ink,
        line_width: f32,
        dash: Option<Dash>,
    },
    Text {
        at: Point,
        text: String,
        align: Align,
        fill: Ink,
        font: Font,
        size: f32,
    },
}

/// Pages of commands captured by a [`RecordingSurface`].
pub type Recorded = Vec<Vec<DrawOp>>;

/// Surface that keeps every command in memory instead of encoding it.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    pages: Recorded,
    fill: Ink,
    stroke: Ink,
    line_width: f32,
    dash: Option<Dash>,
    font: Font,
    font_size: f32,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            fill: Ink::Black,
            stroke: Ink::Black,
            line_width: 1.0,
            dash: None,
            font: Font::Regular,
            font_size: 12.0,
        }
    }

    pub fn pages(&self) -> &Recorded {
        &self.pages
    }

    pub fn into_pages(self) -> Recorded {
        self.pages
    }

    pub fn fill(&self) -> Ink {
        self.fill
    }

    pub fn stroke(&self) -> Ink {
        self.stroke
    }

    /// Every string drawn on `page`, in drawing order.
    pub fn texts(&self, page: usize) -> Vec<&str> {
        self.pages
            .get(page)
            .map(|ops| {
                ops.iter()
                    .filter_map(|op| match op {
                        DrawOp::Text { text, .. } => Some(text.as_str()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// SHA-256 over alignment markers and dashed guides on every page.
    ///
    /// Two runs over the same routine and layout must produce the same value.
    pub fn fingerprint(&self) -> String {
        let mut canonical = String::new();
        for (index, page) in self.pages.iter().enumerate() {
            let _ = writeln!(canonical, "page {index}");
            for op in page {
                match op {
                    DrawOp::Circle { center, radius, .. } => {
                        let _ = writeln!(
                            canonical,
                            "dot {:.3} {:.3} {:.3}",
                            center.x, center.y, radius
                        );
                    }
                    DrawOp::Line {
                        from,
                        to,
                        dash: Some(dash),
                        ..
                    } => {
                        let _ = writeln!(
                            canonical,
                            "guide {:.3} {:.3} {:.3} {:.3} {:.3}/{:.3}",
                            from.x, from.y, to.x, to.y, dash.on, dash.off
                        );
                    }
                    _ => {}
                }
            }
        }
        let digest = Sha256::digest(canonical.as_bytes());
        format!("{digest:x}")
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.push(op);
        }
    }
}

impl Surface for RecordingSurface {
    fn set_fill(&mut self, ink: Ink) {
        self.fill = ink;
    }

    fn set_stroke(&mut self, ink: Ink) {
        self.stroke = ink;
    }

    fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
    }

    fn set_dash(&mut self, dash: Option<Dash>) {
        self.dash = dash;
    }

    fn set_font(&mut self, font: Font, size: f32) {
        self.font = font;
        self.font_size = size;
    }

    fn fill_circle(&mut self, center: Point, radius: f32) {
        let fill = self.fill;
        self.push(DrawOp::Circle {
            center,
            radius,
            fill,
        });
    }

    fn stroke_rect(&mut self, rect: Rect) {
        let (stroke, line_width) = (self.stroke, self.line_width);
        self.push(DrawOp::Rect {
            rect,
            stroke,
            line_width,
        });
    }

    fn line(&mut self, from: Point, to: Point) {
        let (stroke, line_width, dash) = (self.stroke, self.line_width, self.dash);
        self.push(DrawOp::Line {
            from,
            to,
            stroke,
            line_width,
            dash,
        });
    }

    fn draw_text(&mut self, at: Point, text: &str, align: Align) {
        let op = DrawOp::Text {
            at,
            text: text.to_string(),
            align,
            fill: self.fill,
            font: self.font,
            size: self.font_size,
        };
        self.push(op);
    }

    fn new_page(&mut self) {
        *self = Self {
            pages: std::mem::take(&mut self.pages),
            ..Self::new()
        };
        self.pages.push(Vec::new());
    }
}
