//! Card sizes and how they tile a physical page.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CardError;

/// US Letter, in points.
pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
/// Inset applied to all card content, in points (a quarter inch).
pub const MARGIN: f32 = 18.0;

/// Named card sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutName {
    Quarter,
    Half,
    Full,
}

impl LayoutName {
    pub const ALL: [LayoutName; 3] = [LayoutName::Quarter, LayoutName::Half, LayoutName::Full];

    pub fn as_str(self) -> &'static str {
        match self {
            LayoutName::Quarter => "quarter",
            LayoutName::Half => "half",
            LayoutName::Full => "full",
        }
    }

    pub fn spec(self) -> &'static LayoutSpec {
        match self {
            LayoutName::Quarter => &QUARTER,
            LayoutName::Half => &HALF,
            LayoutName::Full => &FULL,
        }
    }
}

impl fmt::Display for LayoutName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for LayoutName {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LayoutName::ALL
            .into_iter()
            .find(|name| name.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CardError::UnknownLayout(s.to_string()))
    }
}

/// Pick the card size for a routine with `item_count` items.
///
/// The thresholds are part of the output contract: up to 8 items fit a
/// quarter card, up to 15 a half card, anything larger gets a full page.
pub fn suggest(item_count: usize) -> LayoutName {
    match item_count {
        0..=8 => LayoutName::Quarter,
        9..=15 => LayoutName::Half,
        _ => LayoutName::Full,
    }
}

/// Either an explicit card size or "pick one from the item count".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutChoice {
    #[default]
    Auto,
    Named(LayoutName),
}

impl LayoutChoice {
    pub fn resolve(self, item_count: usize) -> LayoutName {
        match self {
            LayoutChoice::Auto => suggest(item_count),
            LayoutChoice::Named(name) => name,
        }
    }
}

impl FromStr for LayoutChoice {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            return Ok(LayoutChoice::Auto);
        }
        s.parse().map(LayoutChoice::Named)
    }
}

/// Grid and card dimensions for one named layout.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSpec {
    pub name: LayoutName,
    pub columns: u32,
    pub rows: u32,
    pub card_width: f32,
    pub card_height: f32,
}

impl LayoutSpec {
    pub fn cards_per_page(&self) -> u32 {
        self.columns * self.rows
    }

    /// Pages needed for `quantity` cards.
    pub fn pages_for(&self, quantity: u32) -> u32 {
        quantity.div_ceil(self.cards_per_page())
    }

    /// Lower-left corner of the card in grid cell (`row`, `column`); row 0 is the top of the page.
    pub fn cell_origin(&self, row: u32, column: u32) -> (f32, f32) {
        (
            column as f32 * self.card_width,
            PAGE_HEIGHT - (row + 1) as f32 * self.card_height,
        )
    }
}

static QUARTER: LayoutSpec = LayoutSpec {
    name: LayoutName::Quarter,
    columns: 2,
    rows: 2,
    card_width: PAGE_WIDTH / 2.0,
    card_height: PAGE_HEIGHT / 2.0,
};

static HALF: LayoutSpec = LayoutSpec {
    name: LayoutName::Half,
    columns: 1,
    rows: 2,
    card_width: PAGE_WIDTH,
    card_height: PAGE_HEIGHT / 2.0,
};

static FULL: LayoutSpec = LayoutSpec {
    name: LayoutName::Full,
    columns: 1,
    rows: 1,
    card_width: PAGE_WIDTH,
    card_height: PAGE_HEIGHT,
};

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn suggest_thresholds() {
        for n in 0..=40 {
            let expected = if n <= 8 {
                LayoutName::Quarter
            } else if n <= 15 {
                LayoutName::Half
            } else {
                LayoutName::Full
            };
            assert_eq!(suggest(n), expected, "item count {n}");
        }
        assert_eq!(suggest(usize::MAX), LayoutName::Full);
    }

    #[test]
    fn parses_names_and_auto() {
        assert_eq!("quarter".parse::<LayoutName>().unwrap(), LayoutName::Quarter);
        assert_eq!("HALF".parse::<LayoutChoice>().unwrap(), LayoutChoice::Named(LayoutName::Half));
        assert_eq!("auto".parse::<LayoutChoice>().unwrap(), LayoutChoice::Auto);
        let err = "poster".parse::<LayoutChoice>().unwrap_err();
        assert!(matches!(err, CardError::UnknownLayout(ref s) if s == "poster"));
    }

    #[test]
    fn auto_resolves_from_item_count() {
        assert_eq!(LayoutChoice::Auto.resolve(2), LayoutName::Quarter);
        assert_eq!(LayoutChoice::Auto.resolve(12), LayoutName::Half);
        assert_eq!(
            LayoutChoice::Named(LayoutName::Full).resolve(2),
            LayoutName::Full
        );
    }

    #[test]
    fn grids_cover_the_page() {
        for name in LayoutName::ALL {
            let spec = name.spec();
            assert_eq!(spec.name, name);
            assert_eq!(spec.columns as f32 * spec.card_width, PAGE_WIDTH);
            assert_eq!(spec.rows as f32 * spec.card_height, PAGE_HEIGHT);
        }
        assert_eq!(LayoutName::Quarter.spec().cards_per_page(), 4);
        assert_eq!(LayoutName::Half.spec().cards_per_page(), 2);
        assert_eq!(LayoutName::Full.spec().cards_per_page(), 1);
    }

    #[test]
    fn page_count_rounds_up() {
        let quarter = LayoutName::Quarter.spec();
        assert_eq!(quarter.pages_for(1), 1);
        assert_eq!(quarter.pages_for(4), 1);
        assert_eq!(quarter.pages_for(5), 2);
        assert_eq!(quarter.pages_for(8), 2);
        assert_eq!(LayoutName::Full.spec().pages_for(3), 3);
    }

    #[test]
    fn cell_origins_run_top_down() {
        let quarter = LayoutName::Quarter.spec();
        assert_eq!(quarter.cell_origin(0, 0), (0.0, 396.0));
        assert_eq!(quarter.cell_origin(0, 1), (306.0, 396.0));
        assert_eq!(quarter.cell_origin(1, 0), (0.0, 0.0));
        assert_eq!(LayoutName::Full.spec().cell_origin(0, 0), (0.0, 0.0));
    }
}
