//! PNG backend: rasterises each sheet with a built-in 5x7 bitmap font.
//!
//! Only the sheet being drawn is held as a bitmap; closed sheets are kept
//! as encoded PNG bytes.

use std::io::Cursor;

use image::{ImageError, ImageFormat, ImageResult, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect as PixelRect;

use super::{Align, Dash, Font, Ink, Point, Rect, Surface};
use crate::layout::{PAGE_HEIGHT, PAGE_WIDTH};

const GLYPH_WIDTH: i32 = 5;
const GLYPH_HEIGHT: usize = 7;
const PAPER: Rgba<u8> = Rgba([0xff, 0xff, 0xff, 0xff]);

/// Surface that paints sheets into RGBA bitmaps.
pub struct RasterSurface {
    dpi: u32,
    sheet: RgbaImage,
    closed: Vec<Vec<u8>>,
    failure: Option<ImageError>,
    fill: Ink,
    stroke: Ink,
    line_width: f32,
    dash: Option<Dash>,
    font: Font,
    font_size: f32,
}

impl RasterSurface {
    /// Create a surface rendering at `dpi`, clamped to 72..=600.
    pub fn new(dpi: u32) -> Self {
        let dpi = dpi.clamp(72, 600);
        Self {
            dpi,
            sheet: blank_sheet(dpi),
            closed: Vec::new(),
            failure: None,
            fill: Ink::Black,
            stroke: Ink::Black,
            line_width: 1.0,
            dash: None,
            font: Font::Regular,
            font_size: 12.0,
        }
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    /// The sheet currently being drawn.
    pub fn sheet(&self) -> &RgbaImage {
        &self.sheet
    }

    /// PNG bytes of every sheet already closed by [`Surface::new_page`].
    pub fn closed_sheets(&self) -> &[Vec<u8>] {
        &self.closed
    }

    /// Close the open sheet and return every sheet as PNG, in page order.
    pub fn finish(mut self) -> ImageResult<Vec<Vec<u8>>> {
        self.close_sheet();
        match self.failure {
            Some(err) => Err(err),
            None => Ok(self.closed),
        }
    }

    fn close_sheet(&mut self) {
        match encode_png(&self.sheet) {
            Ok(bytes) => self.closed.push(bytes),
            Err(err) => {
                self.failure.get_or_insert(err);
            }
        }
    }

    fn scale(&self) -> f32 {
        self.dpi as f32 / 72.0
    }

    fn to_px(&self, point: Point) -> (f32, f32) {
        let scale = self.scale();
        (point.x * scale, (PAGE_HEIGHT - point.y) * scale)
    }

    fn stroke_px(&self) -> u32 {
        ((self.line_width * self.scale()).round() as u32).max(1)
    }

    /// Pixel size of one glyph cell; caps take roughly 70% of the em.
    fn glyph_unit(&self) -> i32 {
        ((self.font_size * self.scale() / 10.0).round() as i32).max(1)
    }

    fn text_width_px(&self, text: &str) -> i32 {
        let count = text.chars().count() as i32;
        if count == 0 {
            return 0;
        }
        let unit = self.glyph_unit();
        count * (GLYPH_WIDTH + 1) * unit - unit
    }

    fn fill_px(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba<u8>) {
        let w = (width.round() as u32).max(1);
        let h = (height.round() as u32).max(1);
        draw_filled_rect_mut(
            &mut self.sheet,
            PixelRect::at(x.round() as i32, y.round() as i32).of_size(w, h),
            color,
        );
    }

    /// Solid run between two pixel positions on a horizontal or vertical line.
    fn solid_run(&mut self, from: (f32, f32), to: (f32, f32), color: Rgba<u8>) {
        let thickness = self.stroke_px() as f32;
        let half = thickness / 2.0;
        let (x0, y0) = (from.0.min(to.0), from.1.min(to.1));
        let (x1, y1) = (from.0.max(to.0), from.1.max(to.1));
        if (y1 - y0).abs() < f32::EPSILON {
            self.fill_px(x0, y0 - half, x1 - x0, thickness, color);
        } else if (x1 - x0).abs() < f32::EPSILON {
            self.fill_px(x0 - half, y0, thickness, y1 - y0, color);
        } else {
            draw_line_segment_mut(&mut self.sheet, from, to, color);
        }
    }

    fn stroke_line_px(&mut self, from: (f32, f32), to: (f32, f32)) {
        let color = ink_color(self.stroke);
        let Some(dash) = self.dash else {
            self.solid_run(from, to, color);
            return;
        };
        let scale = self.scale();
        let (on, off) = ((dash.on * scale).max(1.0), (dash.off * scale).max(0.0));
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let length = (dx * dx + dy * dy).sqrt();
        if length == 0.0 {
            return;
        }
        let (ux, uy) = (dx / length, dy / length);
        let mut start = 0.0;
        while start < length {
            let end = (start + on).min(length);
            self.solid_run(
                (from.0 + ux * start, from.1 + uy * start),
                (from.0 + ux * end, from.1 + uy * end),
                color,
            );
            start = end + off;
        }
    }

    fn draw_glyph(&mut self, x: i32, top: i32, ch: char, color: Rgba<u8>) {
        let unit = self.glyph_unit();
        let bold = self.font == Font::Bold;
        let page = &mut self.sheet;
        for (row, bits) in glyph_pattern(ch).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                let px = x + col * unit;
                let py = top + row as i32 * unit;
                let width = if bold { unit as u32 + 1 } else { unit as u32 };
                draw_filled_rect_mut(page, PixelRect::at(px, py).of_size(width, unit as u32), color);
            }
        }
    }
}

fn blank_sheet(dpi: u32) -> RgbaImage {
    let scale = dpi as f32 / 72.0;
    let width = (PAGE_WIDTH * scale).round() as u32;
    let height = (PAGE_HEIGHT * scale).round() as u32;
    RgbaImage::from_pixel(width, height, PAPER)
}

fn encode_png(page: &RgbaImage) -> ImageResult<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    page.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

impl Surface for RasterSurface {
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
        let (cx, cy) = self.to_px(center);
        let r = ((radius * self.scale()).round() as i32).max(1);
        let color = ink_color(self.fill);
        draw_filled_circle_mut(
            &mut self.sheet,
            (cx.round() as i32, cy.round() as i32),
            r,
            color,
        );
    }

    fn stroke_rect(&mut self, rect: Rect) {
        let corners = [
            Point::new(rect.x, rect.y),
            Point::new(rect.x + rect.width, rect.y),
            Point::new(rect.x + rect.width, rect.y + rect.height),
            Point::new(rect.x, rect.y + rect.height),
        ];
        for i in 0..corners.len() {
            let from = self.to_px(corners[i]);
            let to = self.to_px(corners[(i + 1) % corners.len()]);
            self.stroke_line_px(from, to);
        }
    }

    fn line(&mut self, from: Point, to: Point) {
        let (from, to) = (self.to_px(from), self.to_px(to));
        self.stroke_line_px(from, to);
    }

    fn draw_text(&mut self, at: Point, text: &str, align: Align) {
        let (x, baseline) = self.to_px(at);
        let width = self.text_width_px(text);
        let left = match align {
            Align::Left => x.round() as i32,
            Align::Right => x.round() as i32 - width,
            Align::Center => x.round() as i32 - width / 2,
        };
        let unit = self.glyph_unit();
        let top = baseline.round() as i32 - GLYPH_HEIGHT as i32 * unit;
        let color = ink_color(self.fill);
        for (index, ch) in text.chars().enumerate() {
            let glyph_x = left + index as i32 * (GLYPH_WIDTH + 1) * unit;
            self.draw_glyph(glyph_x, top, ch, color);
        }
    }

    fn new_page(&mut self) {
        self.fill = Ink::Black;
        self.stroke = Ink::Black;
        self.line_width = 1.0;
        self.dash = None;
        self.font = Font::Regular;
        self.font_size = 12.0;
        self.close_sheet();
        self.sheet = blank_sheet(self.dpi);
    }
}

fn ink_color(ink: Ink) -> Rgba<u8> {
    let level = (ink.level() * 255.0).round() as u8;
    Rgba([level, level, level, 0xff])
}

#[rustfmt::skip]
fn glyph_pattern(ch: char) -> [u8; GLYPH_HEIGHT] {
    match ch.to_ascii_uppercase() {
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00110, 0b01000, 0b10000, 0b11111],
        '3' => [0b11110, 0b00001, 0b00001, 0b01110, 0b00001, 0b00001, 0b11110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01110],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b10010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b01010, 0b01010, 0b00100, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '/' => [0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b10000, 0b00000],
        ':' => [0b00000, 0b00100, 0b00000, 0b00000, 0b00100, 0b00000, 0b00000],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00110, 0b00110],
        ',' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00110, 0b00100, 0b01000],
        '(' => [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010],
        ')' => [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000],
        '%' => [0b11001, 0b11010, 0b00100, 0b01000, 0b10110, 0b00110, 0b00000],
        '#' => [0b01010, 0b11111, 0b01010, 0b01010, 0b11111, 0b01010, 0b01010],
        '+' => [0b00000, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000],
        '&' => [0b01100, 0b10010, 0b10100, 0b01000, 0b10101, 0b10010, 0b01101],
        '\'' => [0b00100, 0b00100, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000],
        '!' => [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100],
        '?' => [0b01110, 0b10001, 0b00010, 0b00100, 0b00100, 0b00000, 0b00100],
        // Sits on the baseline so "___/___/___" reads as a fill-in field.
        '_' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b11111],
        _ => [0; GLYPH_HEIGHT],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ink_pixels(page: &RgbaImage) -> usize {
        page.pixels().filter(|p| **p != PAPER).count()
    }

    fn decode(bytes: &[u8]) -> RgbaImage {
        image::load_from_memory_with_format(bytes, ImageFormat::Png)
            .unwrap()
            .to_rgba8()
    }

    #[test]
    fn page_size_follows_dpi() {
        let surface = RasterSurface::new(72);
        assert_eq!(surface.sheet().dimensions(), (612, 792));
        let pages = surface.finish().unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(decode(&pages[0]).dimensions(), (612, 792));

        let clamped = RasterSurface::new(10);
        assert_eq!(clamped.dpi(), 72);
    }

    #[test]
    fn dashed_lines_leave_gaps() {
        let mut solid = RasterSurface::new(72);
        solid.line(Point::new(0.0, 396.0), Point::new(612.0, 396.0));
        let mut dashed = RasterSurface::new(72);
        dashed.set_dash(Some(Dash { on: 6.0, off: 3.0 }));
        dashed.line(Point::new(0.0, 396.0), Point::new(612.0, 396.0));

        let solid_ink = ink_pixels(solid.sheet());
        let dashed_ink = ink_pixels(dashed.sheet());
        assert_eq!(solid_ink, 612);
        assert!(dashed_ink < solid_ink && dashed_ink > 0);
    }

    #[test]
    fn right_aligned_text_ends_at_anchor() {
        let mut surface = RasterSurface::new(72);
        surface.set_font(Font::Regular, 10.0);
        surface.draw_text(Point::new(300.0, 400.0), "v2", Align::Right);
        let rightmost = surface
            .sheet()
            .enumerate_pixels()
            .filter(|(_, _, p)| **p != PAPER)
            .map(|(x, _, _)| x)
            .max()
            .unwrap();
        assert!(rightmost < 300 && rightmost >= 295);
    }

    #[test]
    fn new_page_encodes_the_closed_sheet() {
        let mut surface = RasterSurface::new(72);
        surface.fill_circle(Point::new(20.0, 20.0), 4.0);
        assert!(surface.closed_sheets().is_empty());

        surface.new_page();
        assert_eq!(surface.closed_sheets().len(), 1);
        let closed = &surface.closed_sheets()[0];
        assert_eq!(&closed[..8], b"\x89PNG\r\n\x1a\n");
        assert!(ink_pixels(&decode(closed)) > 0);
        assert_eq!(ink_pixels(surface.sheet()), 0);

        let pages = surface.finish().unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(ink_pixels(&decode(&pages[1])), 0);
    }
}
