//! Draws a single routine card.
//!
//! A card is painted top to bottom: corner markers, header, items, version
//! stamp. Items advance an explicit [`Cursor`]; once the cursor passes the
//! floor reserved for the version stamp, the remaining items are dropped
//! without error.

use tracing::debug;

use crate::layout::MARGIN;
use crate::routine::{Item, ItemKind, Routine};
use crate::surface::{Align, Font, Ink, Point, Rect, Surface};

/// Alignment dot radius (8pt diameter).
pub const MARKER_RADIUS: f32 = 4.0;
/// Vertical space kept free above the bottom margin for the version stamp.
pub const VERSION_RESERVE: f32 = 20.0;

const CHECKBOX_SIZE: f32 = 18.0;
const NUMBER_BOX_WIDTH: f32 = 72.0;
const NUMBER_BOX_HEIGHT: f32 = 24.0;
const SCALE_BOX_SIZE: f32 = 24.0;
const SCALE_BOX_GAP: f32 = 6.0;
const SCALE_STEPS: u32 = 5;
const LINE_HEIGHT: f32 = 18.0;
const ANSWER_LINES: u32 = 2;
const DATE_PLACEHOLDER: &str = "___/___/___";

const TITLE_SIZE: f32 = 14.0;
const LABEL_SIZE: f32 = 11.0;
const DATE_SIZE: f32 = 10.0;
const ACCENT_SIZE: f32 = 9.0;
const VERSION_SIZE: f32 = 8.0;
const HAIRLINE: f32 = 0.5;

/// Where a card sits on the page and how big it is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardFrame {
    /// Lower-left corner.
    pub origin: Point,
    pub width: f32,
    pub height: f32,
}

impl CardFrame {
    pub fn new(origin: Point, width: f32, height: f32) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    fn top(&self) -> f32 {
        self.origin.y + self.height
    }

    fn right(&self) -> f32 {
        self.origin.x + self.width
    }

    /// Left edge of text and boxes, clear of the corner markers.
    pub fn content_left(&self) -> f32 {
        self.origin.x + MARGIN + MARKER_RADIUS * 2.0
    }

    pub fn content_right(&self) -> f32 {
        self.right() - MARGIN - MARKER_RADIUS * 2.0
    }

    pub fn content_width(&self) -> f32 {
        self.content_right() - self.content_left()
    }

    /// Lowest y an item may start from.
    pub fn floor(&self) -> f32 {
        self.origin.y + MARGIN + VERSION_RESERVE
    }
}

/// Vertical fill position within one card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Cursor {
    pub y: f32,
    floor: f32,
}

impl Cursor {
    fn new(frame: &CardFrame) -> Self {
        Self {
            y: frame.top() - MARGIN,
            floor: frame.floor(),
        }
    }

    fn advance(&mut self, amount: f32) {
        self.y -= amount;
    }

    fn exhausted(&self) -> bool {
        self.y < self.floor
    }
}

/// What happened to a routine's items on one card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CardOutcome {
    pub drawn: usize,
    /// Items of an unrecognised type, passed over in place.
    pub skipped: usize,
    /// Items never reached because the card ran out of room.
    pub truncated: usize,
}

/// Paint one card for `routine` inside `frame`.
pub fn render_card<S: Surface>(
    surface: &mut S,
    frame: CardFrame,
    routine: &Routine,
    version: i64,
) -> CardOutcome {
    let mut cursor = Cursor::new(&frame);
    draw_alignment_markers(surface, &frame);
    draw_header(surface, &frame, &mut cursor, routine.name());
    let outcome = draw_items(surface, &frame, &mut cursor, routine.items());
    draw_version(surface, &frame, version);
    debug!(
        x = frame.origin.x,
        y = frame.origin.y,
        drawn = outcome.drawn,
        skipped = outcome.skipped,
        truncated = outcome.truncated,
        "rendered card"
    );
    outcome
}

fn draw_alignment_markers<S: Surface>(surface: &mut S, frame: &CardFrame) {
    surface.set_fill(Ink::Black);
    let (left, right) = (frame.origin.x + MARGIN, frame.right() - MARGIN);
    let (bottom, top) = (frame.origin.y + MARGIN, frame.top() - MARGIN);
    for center in [
        Point::new(left, top),
        Point::new(right, top),
        Point::new(left, bottom),
        Point::new(right, bottom),
    ] {
        surface.fill_circle(center, MARKER_RADIUS);
    }
}

fn draw_header<S: Surface>(surface: &mut S, frame: &CardFrame, cursor: &mut Cursor, name: &str) {
    let left = frame.content_left();
    let right = frame.content_right();

    cursor.advance(TITLE_SIZE);
    surface.set_fill(Ink::Black);
    surface.set_font(Font::Bold, TITLE_SIZE);
    surface.draw_text(Point::new(left, cursor.y), name, Align::Left);

    surface.set_font(Font::Regular, DATE_SIZE);
    surface.draw_text(
        Point::new(right, cursor.y + 2.0),
        DATE_PLACEHOLDER,
        Align::Right,
    );

    cursor.advance(10.0);
    surface.set_stroke(Ink::Gray);
    surface.set_line_width(HAIRLINE);
    surface.line(Point::new(left, cursor.y), Point::new(right, cursor.y));
    surface.set_stroke(Ink::Black);

    cursor.advance(15.0);
}

fn draw_items<S: Surface>(
    surface: &mut S,
    frame: &CardFrame,
    cursor: &mut Cursor,
    items: &[Item],
) -> CardOutcome {
    let mut outcome = CardOutcome::default();
    let x = frame.content_left();
    let width = frame.content_width();

    for (index, item) in items.iter().enumerate() {
        if cursor.exhausted() {
            let rest = &items[index..];
            let unknown = rest
                .iter()
                .filter(|item| matches!(item.kind, ItemKind::Unrecognized(_)))
                .count();
            outcome.skipped += unknown;
            outcome.truncated = rest.len() - unknown;
            break;
        }
        match &item.kind {
            ItemKind::Checkbox => draw_checkbox(surface, cursor, x, &item.name),
            ItemKind::Number { unit } => {
                draw_number(surface, cursor, x, &item.name, unit.as_deref())
            }
            ItemKind::Scale { has_notes } => {
                draw_scale(surface, cursor, x, width, &item.name, *has_notes)
            }
            ItemKind::Text => draw_text_lines(surface, cursor, x, width, &item.name),
            ItemKind::Unrecognized(_) => {
                outcome.skipped += 1;
                continue;
            }
        }
        outcome.drawn += 1;
    }
    outcome
}

fn draw_label<S: Surface>(surface: &mut S, cursor: &Cursor, x: f32, name: &str) {
    surface.set_font(Font::Regular, LABEL_SIZE);
    surface.set_fill(Ink::Black);
    surface.draw_text(Point::new(x, cursor.y - 8.0), name, Align::Left);
}

fn draw_checkbox<S: Surface>(surface: &mut S, cursor: &mut Cursor, x: f32, name: &str) {
    surface.set_stroke(Ink::Black);
    surface.set_line_width(1.5);
    surface.stroke_rect(Rect::new(
        x,
        cursor.y - CHECKBOX_SIZE + 4.0,
        CHECKBOX_SIZE,
        CHECKBOX_SIZE,
    ));
    draw_label(surface, cursor, x + CHECKBOX_SIZE + 8.0, name);
    cursor.advance(CHECKBOX_SIZE + 8.0);
}

fn draw_number<S: Surface>(
    surface: &mut S,
    cursor: &mut Cursor,
    x: f32,
    name: &str,
    unit: Option<&str>,
) {
    draw_label(surface, cursor, x, name);
    cursor.advance(18.0);

    let bottom = cursor.y - NUMBER_BOX_HEIGHT;
    surface.set_stroke(Ink::Black);
    surface.set_line_width(1.0);
    surface.stroke_rect(Rect::new(x, bottom, NUMBER_BOX_WIDTH, NUMBER_BOX_HEIGHT));

    if let Some(unit) = unit.filter(|u| !u.is_empty()) {
        surface.set_font(Font::Regular, ACCENT_SIZE);
        surface.set_fill(Ink::Gray);
        surface.draw_text(
            Point::new(x + NUMBER_BOX_WIDTH + 6.0, bottom + 6.0),
            unit,
            Align::Left,
        );
        surface.set_fill(Ink::Black);
    }

    cursor.advance(NUMBER_BOX_HEIGHT + 12.0);
}

fn draw_scale<S: Surface>(
    surface: &mut S,
    cursor: &mut Cursor,
    x: f32,
    width: f32,
    name: &str,
    has_notes: bool,
) {
    draw_label(surface, cursor, x, name);
    cursor.advance(22.0);

    surface.set_stroke(Ink::Black);
    surface.set_line_width(1.0);
    surface.set_font(Font::Regular, ACCENT_SIZE);
    for step in 0..SCALE_STEPS {
        let box_x = x + step as f32 * (SCALE_BOX_SIZE + SCALE_BOX_GAP);
        surface.stroke_rect(Rect::new(
            box_x,
            cursor.y - SCALE_BOX_SIZE,
            SCALE_BOX_SIZE,
            SCALE_BOX_SIZE,
        ));
        surface.set_fill(Ink::Gray);
        surface.draw_text(
            Point::new(box_x + SCALE_BOX_SIZE / 2.0, cursor.y + 3.0),
            &(step + 1).to_string(),
            Align::Center,
        );
        surface.set_fill(Ink::Black);
    }
    cursor.advance(SCALE_BOX_SIZE + 8.0);

    if has_notes {
        surface.set_font(Font::Regular, ACCENT_SIZE);
        surface.set_fill(Ink::Gray);
        surface.draw_text(Point::new(x, cursor.y - 8.0), "Notes:", Align::Left);
        surface.set_fill(Ink::Black);

        surface.set_stroke(Ink::Gray);
        surface.set_line_width(HAIRLINE);
        surface.line(
            Point::new(x + 35.0, cursor.y - 10.0),
            Point::new(x + width, cursor.y - 10.0),
        );
        surface.set_stroke(Ink::Black);

        cursor.advance(16.0);
    }
}

fn draw_text_lines<S: Surface>(
    surface: &mut S,
    cursor: &mut Cursor,
    x: f32,
    width: f32,
    name: &str,
) {
    draw_label(surface, cursor, x, name);
    cursor.advance(18.0);

    surface.set_stroke(Ink::Gray);
    surface.set_line_width(HAIRLINE);
    for _ in 0..ANSWER_LINES {
        surface.line(
            Point::new(x, cursor.y - 4.0),
            Point::new(x + width, cursor.y - 4.0),
        );
        cursor.advance(LINE_HEIGHT);
    }
    surface.set_stroke(Ink::Black);
}

fn draw_version<S: Surface>(surface: &mut S, frame: &CardFrame, version: i64) {
    surface.set_font(Font::Regular, VERSION_SIZE);
    surface.set_fill(Ink::Gray);
    surface.draw_text(
        Point::new(frame.content_right(), frame.origin.y + MARGIN + MARKER_RADIUS),
        &format!("v{version}"),
        Align::Right,
    );
    surface.set_fill(Ink::Black);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawOp, RecordingSurface};
    use pretty_assertions::assert_eq;

    fn quarter_frame() -> CardFrame {
        CardFrame::new(Point::new(0.0, 0.0), 306.0, 396.0)
    }

    fn render(routine: &Routine, frame: CardFrame) -> (RecordingSurface, CardOutcome) {
        let mut surface = RecordingSurface::new();
        let outcome = render_card(&mut surface, frame, routine, routine.version());
        (surface, outcome)
    }

    fn ops(surface: &RecordingSurface) -> &[DrawOp] {
        &surface.pages()[0]
    }

    fn text_y(surface: &RecordingSurface, wanted: &str) -> f32 {
        ops(surface)
            .iter()
            .find_map(|op| match op {
                DrawOp::Text { text, at, .. } if text == wanted => Some(at.y),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn always_four_alignment_markers() {
        let routine = Routine::new("Empty", vec![], 1);
        for (w, h) in [(306.0, 396.0), (612.0, 396.0), (612.0, 792.0)] {
            let (surface, _) = render(&routine, CardFrame::new(Point::new(0.0, 0.0), w, h));
            let dots: Vec<Point> = ops(&surface)
                .iter()
                .filter_map(|op| match op {
                    DrawOp::Circle { center, radius, fill } => {
                        assert_eq!(*radius, MARKER_RADIUS);
                        assert_eq!(*fill, Ink::Black);
                        Some(*center)
                    }
                    _ => None,
                })
                .collect();
            assert_eq!(
                dots,
                vec![
                    Point::new(18.0, h - 18.0),
                    Point::new(w - 18.0, h - 18.0),
                    Point::new(18.0, 18.0),
                    Point::new(w - 18.0, 18.0),
                ]
            );
        }
    }

    #[test]
    fn header_then_items_then_version() {
        let routine = Routine::new(
            "Workout",
            vec![Item::number("Weight", 1, Some("kg")), Item::checkbox("Pushups", 0)],
            2,
        );
        let (surface, outcome) = render(&routine, quarter_frame());
        assert_eq!(
            surface.texts(0),
            vec!["Workout", DATE_PLACEHOLDER, "Pushups", "Weight", "kg", "v2"]
        );
        assert_eq!(
            outcome,
            CardOutcome {
                drawn: 2,
                skipped: 0,
                truncated: 0
            }
        );
    }

    #[test]
    fn version_stamp_sits_bottom_right() {
        let routine = Routine::new("R", vec![], 7);
        let (surface, _) = render(&routine, quarter_frame());
        let last = ops(&surface).last().unwrap();
        assert_eq!(
            *last,
            DrawOp::Text {
                at: Point::new(306.0 - 26.0, 22.0),
                text: "v7".to_string(),
                align: Align::Right,
                fill: Ink::Gray,
                font: Font::Regular,
                size: VERSION_SIZE,
            }
        );
        assert_eq!(surface.fill(), Ink::Black);
    }

    #[test]
    fn header_geometry() {
        let routine = Routine::new("R", vec![Item::checkbox("A", 0)], 1);
        let (surface, _) = render(&routine, quarter_frame());
        // top margin 378, title baseline 14 below it
        assert_eq!(text_y(&surface, "R"), 364.0);
        let date = ops(&surface)
            .iter()
            .find_map(|op| match op {
                DrawOp::Text {
                    text, at, align, ..
                } if text == DATE_PLACEHOLDER => Some((*at, *align)),
                _ => None,
            })
            .unwrap();
        assert_eq!(
            date,
            (Point::new(quarter_frame().content_right(), 366.0), Align::Right)
        );
        let separator = ops(&surface)
            .iter()
            .find_map(|op| match op {
                DrawOp::Line { from, to, stroke, .. } => Some((*from, *to, *stroke)),
                _ => None,
            })
            .unwrap();
        assert_eq!(
            separator,
            (Point::new(26.0, 354.0), Point::new(280.0, 354.0), Ink::Gray)
        );
        // first item starts 15 below the separator; label 8 below that
        assert_eq!(text_y(&surface, "A"), 331.0);
    }

    #[test]
    fn overflow_truncates_silently() {
        let items = (0..20).map(|i| Item::checkbox(format!("c{i}"), i)).collect();
        let routine = Routine::new("Long", items, 1);
        let (surface, outcome) = render(&routine, quarter_frame());
        assert_eq!(outcome.drawn, 12);
        assert_eq!(outcome.truncated, 8);
        let texts = surface.texts(0);
        assert!(texts.contains(&"c11"));
        assert!(!texts.contains(&"c12"));
        assert_eq!(texts.last(), Some(&"v1"));
    }

    /// Two checkboxes bring the cursor from `height - 57` down to `height - 109`.
    fn short_frame(height: f32) -> CardFrame {
        CardFrame::new(Point::new(0.0, 0.0), 306.0, height)
    }

    fn checkboxes(count: i64) -> Vec<Item> {
        (0..count).map(|i| Item::checkbox(format!("c{i}"), i)).collect()
    }

    #[test]
    fn item_starting_on_the_floor_is_drawn() {
        let frame = short_frame(147.0);
        assert_eq!(frame.floor(), 38.0);
        let routine = Routine::new("Edge", checkboxes(4), 1);
        let (surface, outcome) = render(&routine, frame);
        assert_eq!(outcome.drawn, 3);
        assert_eq!(outcome.truncated, 1);
        assert!(surface.texts(0).contains(&"c2"));
    }

    #[test]
    fn item_starting_below_the_floor_is_truncated() {
        let routine = Routine::new("Edge", checkboxes(4), 1);
        let (surface, outcome) = render(&routine, short_frame(146.0));
        assert_eq!(outcome.drawn, 2);
        assert_eq!(outcome.truncated, 2);
        assert!(!surface.texts(0).contains(&"c2"));
    }

    #[test]
    fn unknown_kinds_past_the_floor_count_as_skipped() {
        let mut items = checkboxes(4);
        items.push(Item::new("Mystery", 9, ItemKind::Unrecognized("slider".into())));
        let routine = Routine::new("Edge", items, 1);
        let (_, outcome) = render(&routine, short_frame(146.0));
        assert_eq!(
            outcome,
            CardOutcome {
                drawn: 2,
                skipped: 1,
                truncated: 2
            }
        );
    }

    #[test]
    fn negative_version_is_stamped_as_given() {
        let routine = Routine::new("R", vec![], -3);
        let (surface, _) = render(&routine, quarter_frame());
        assert_eq!(surface.texts(0).last(), Some(&"v-3"));
    }

    #[test]
    fn full_page_holds_more_than_quarter() {
        let items = (0..40).map(|i| Item::checkbox(format!("c{i}"), i)).collect();
        let routine = Routine::new("Long", items, 1);
        let (_, outcome) = render(&routine, CardFrame::new(Point::new(0.0, 0.0), 612.0, 792.0));
        assert_eq!(outcome.drawn, 27);
        assert_eq!(outcome.truncated, 13);
    }

    #[test]
    fn unknown_kinds_are_skipped_without_advancing() {
        let with_unknown = Routine::new(
            "R",
            vec![
                Item::new("Mystery", 0, ItemKind::Unrecognized("slider".into())),
                Item::checkbox("After", 1),
            ],
            1,
        );
        let plain = Routine::new("R", vec![Item::checkbox("After", 1)], 1);
        let (a, outcome) = render(&with_unknown, quarter_frame());
        let (b, _) = render(&plain, quarter_frame());
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.drawn, 1);
        assert!(!a.texts(0).contains(&"Mystery"));
        assert_eq!(text_y(&a, "After"), text_y(&b, "After"));
    }

    #[test]
    fn scale_draws_five_numbered_boxes_and_notes() {
        let routine = Routine::new("Evening", vec![Item::scale("Mood", 0, true)], 1);
        let (surface, _) = render(&routine, quarter_frame());
        let boxes = ops(&surface)
            .iter()
            .filter(|op| matches!(op, DrawOp::Rect { .. }))
            .count();
        assert_eq!(boxes, 5);
        let numbers: Vec<(String, Align, Ink)> = ops(&surface)
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text {
                    text, align, fill, ..
                } if text.len() == 1 => Some((text.clone(), *align, *fill)),
                _ => None,
            })
            .collect();
        assert_eq!(
            numbers,
            (1..=5)
                .map(|n| (n.to_string(), Align::Center, Ink::Gray))
                .collect::<Vec<_>>()
        );
        assert!(surface.texts(0).contains(&"Notes:"));
    }

    #[test]
    fn notes_make_scale_taller() {
        let next_label = |has_notes| {
            let routine = Routine::new(
                "R",
                vec![Item::scale("Mood", 0, has_notes), Item::checkbox("Next", 1)],
                1,
            );
            let (surface, _) = render(&routine, quarter_frame());
            text_y(&surface, "Next")
        };
        assert_eq!(next_label(false) - next_label(true), 16.0);
    }

    #[test]
    fn text_item_gets_two_answer_lines() {
        let routine = Routine::new("R", vec![Item::text("Reflection", 0)], 1);
        let (surface, _) = render(&routine, quarter_frame());
        let rules: Vec<f32> = ops(&surface)
            .iter()
            .filter_map(|op| match op {
                DrawOp::Line { from, stroke, .. } if *stroke == Ink::Gray => Some(from.y),
                _ => None,
            })
            .collect();
        // header separator plus two answer lines 18pt apart
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[1] - rules[2], LINE_HEIGHT);
    }

    #[test]
    fn number_without_unit_has_no_accent() {
        let routine = Routine::new("R", vec![Item::number("Reps", 0, None)], 1);
        let (surface, _) = render(&routine, quarter_frame());
        assert_eq!(surface.texts(0), vec!["R", DATE_PLACEHOLDER, "Reps", "v1"]);
    }

    #[test]
    fn gray_ink_never_leaks_into_the_next_item() {
        let routine = Routine::new(
            "R",
            vec![
                Item::number("Weight", 0, Some("kg")),
                Item::scale("Mood", 1, true),
                Item::text("Notes", 2),
                Item::checkbox("Done", 3),
                Item::number("Reps", 4, Some("x")),
            ],
            1,
        );
        let (surface, _) = render(&routine, quarter_frame());
        for op in ops(&surface) {
            match op {
                DrawOp::Text {
                    text, fill, size, ..
                } if *size == LABEL_SIZE => {
                    assert_eq!(*fill, Ink::Black, "label {text}");
                }
                DrawOp::Rect { stroke, .. } => assert_eq!(*stroke, Ink::Black),
                _ => {}
            }
        }
        assert_eq!(surface.fill(), Ink::Black);
        assert_eq!(surface.stroke(), Ink::Black);
    }
}
