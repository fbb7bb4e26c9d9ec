//! PDF backend: one Letter-sized page per sheet, base-14 Helvetica text.

use chrono::{DateTime, Datelike, Timelike, Utc};
use pdf_writer::{Content, Date, Name, Pdf, Rect as MediaBox, Ref, Str, TextStr};

use super::metrics::text_width;
use super::{Align, Dash, Font, Ink, Point, Rect, Surface};
use crate::layout::{PAGE_HEIGHT, PAGE_WIDTH};

const CREATOR: &str = concat!("cardsheet ", env!("CARGO_PKG_VERSION"));
/// Control-point distance for approximating a quarter circle with a cubic.
const KAPPA: f32 = 0.552_284_8;

/// Optional `/Info` dictionary entries.
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub created: Option<DateTime<Utc>>,
}

/// Surface that encodes draw calls into PDF content streams.
pub struct PdfSurface {
    finished: Vec<Vec<u8>>,
    content: Content,
    font: Font,
    font_size: f32,
    info: DocumentInfo,
}

impl Default for PdfSurface {
    fn default() -> Self {
        Self::new(DocumentInfo::default())
    }
}

impl PdfSurface {
    pub fn new(info: DocumentInfo) -> Self {
        Self {
            finished: Vec::new(),
            content: Content::new(),
            font: Font::Regular,
            font_size: 12.0,
            info,
        }
    }

    /// Close the last page and serialise the document.
    pub fn finish(mut self) -> Vec<u8> {
        let last = std::mem::replace(&mut self.content, Content::new());
        self.finished.push(last.finish());

        let mut next_id = 1;
        let mut alloc = || {
            let id = Ref::new(next_id);
            next_id += 1;
            id
        };
        let catalog_id = alloc();
        let pages_id = alloc();
        let regular_id = alloc();
        let bold_id = alloc();
        let info_id = alloc();
        let page_ids: Vec<(Ref, Ref)> = self.finished.iter().map(|_| (alloc(), alloc())).collect();

        let mut pdf = Pdf::new();
        pdf.catalog(catalog_id).pages(pages_id);
        pdf.pages(pages_id)
            .kids(page_ids.iter().map(|(page, _)| *page))
            .count(page_ids.len() as i32);
        pdf.type1_font(regular_id)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        pdf.type1_font(bold_id)
            .base_font(Name(b"Helvetica-Bold"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));

        for ((page_id, content_id), stream) in page_ids.iter().zip(&self.finished) {
            let mut page = pdf.page(*page_id);
            page.media_box(MediaBox::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT))
                .parent(pages_id)
                .contents(*content_id);
            {
                let mut resources = page.resources();
                resources
                    .fonts()
                    .pair(font_name(Font::Regular), regular_id)
                    .pair(font_name(Font::Bold), bold_id);
            }
            drop(page);
            pdf.stream(*content_id, stream);
        }

        {
            let mut info = pdf.document_info(info_id);
            info.creator(TextStr(CREATOR));
            if let Some(title) = &self.info.title {
                info.title(TextStr(title));
            }
            if let Some(created) = self.info.created {
                info.creation_date(pdf_date(created));
            }
        }

        pdf.finish()
    }
}

impl Surface for PdfSurface {
    fn set_fill(&mut self, ink: Ink) {
        self.content.set_fill_gray(ink.level());
    }

    fn set_stroke(&mut self, ink: Ink) {
        self.content.set_stroke_gray(ink.level());
    }

    fn set_line_width(&mut self, width: f32) {
        self.content.set_line_width(width);
    }

    fn set_dash(&mut self, dash: Option<Dash>) {
        match dash {
            Some(dash) => self.content.set_dash_pattern([dash.on, dash.off], 0.0),
            None => self.content.set_dash_pattern(std::iter::empty::<f32>(), 0.0),
        };
    }

    fn set_font(&mut self, font: Font, size: f32) {
        self.font = font;
        self.font_size = size;
    }

    fn fill_circle(&mut self, center: Point, radius: f32) {
        let (cx, cy, r) = (center.x, center.y, radius);
        let k = r * KAPPA;
        self.content
            .move_to(cx + r, cy)
            .cubic_to(cx + r, cy + k, cx + k, cy + r, cx, cy + r)
            .cubic_to(cx - k, cy + r, cx - r, cy + k, cx - r, cy)
            .cubic_to(cx - r, cy - k, cx - k, cy - r, cx, cy - r)
            .cubic_to(cx + k, cy - r, cx + r, cy - k, cx + r, cy)
            .close_path()
            .fill_nonzero();
    }

    fn stroke_rect(&mut self, rect: Rect) {
        self.content
            .rect(rect.x, rect.y, rect.width, rect.height)
            .stroke();
    }

    fn line(&mut self, from: Point, to: Point) {
        self.content
            .move_to(from.x, from.y)
            .line_to(to.x, to.y)
            .stroke();
    }

    fn draw_text(&mut self, at: Point, text: &str, align: Align) {
        let width = text_width(text, self.font, self.font_size);
        let x = match align {
            Align::Left => at.x,
            Align::Right => at.x - width,
            Align::Center => at.x - width / 2.0,
        };
        let encoded = win_ansi(text);
        self.content
            .begin_text()
            .set_font(font_name(self.font), self.font_size)
            .next_line(x, at.y)
            .show(Str(&encoded))
            .end_text();
    }

    fn new_page(&mut self) {
        let page = std::mem::replace(&mut self.content, Content::new());
        self.finished.push(page.finish());
        self.font = Font::Regular;
        self.font_size = 12.0;
    }
}

fn font_name(font: Font) -> Name<'static> {
    match font {
        Font::Regular => Name(b"F1"),
        Font::Bold => Name(b"F2"),
    }
}

/// Latin-1 subset of WinAnsi; anything else becomes `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch as u32 {
            code @ (0x20..=0x7e | 0xa0..=0xff) => code as u8,
            _ => b'?',
        })
        .collect()
}

fn pdf_date(at: DateTime<Utc>) -> Date {
    Date::new(at.year().clamp(0, 9999) as u16)
        .month(at.month() as u8)
        .day(at.day() as u8)
        .hour(at.hour() as u8)
        .minute(at.minute() as u8)
        .second(at.second() as u8)
        .utc_offset_hour(0)
        .utc_offset_minute(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn writes_one_page_object_per_sheet() {
        let mut surface = PdfSurface::default();
        surface.line(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        surface.new_page();
        surface.new_page();
        let bytes = surface.finish();
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(contains(&bytes, b"/Count 3"));
        assert!(contains(&bytes, b"/Helvetica-Bold"));
    }

    #[test]
    fn info_dictionary_carries_title() {
        let surface = PdfSurface::new(DocumentInfo {
            title: Some("Workout".into()),
            created: None,
        });
        let bytes = surface.finish();
        assert!(contains(&bytes, b"(Workout)"));
        assert!(!contains(&bytes, b"/CreationDate"));
    }

    #[test]
    fn output_is_deterministic_without_a_date() {
        let draw = || {
            let mut surface = PdfSurface::default();
            surface.set_font(Font::Bold, 14.0);
            surface.draw_text(Point::new(20.0, 20.0), "Hello", Align::Right);
            surface.fill_circle(Point::new(50.0, 50.0), 4.0);
            surface.finish()
        };
        assert_eq!(draw(), draw());
    }

    #[test]
    fn non_latin_text_is_replaced() {
        assert_eq!(win_ansi("a€é"), vec![b'a', b'?', 0xe9]);
    }
}
