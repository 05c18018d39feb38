// SPDX-License-Identifier: MIT
//
// Box styling, in terminal cells.
//
// `BoxStyle` is the small slice of flexbox a terminal UI actually uses.
// It converts into a full `taffy::Style`; everything it doesn't name keeps
// taffy's default.

use taffy::style_helpers::{auto, length};
use taffy::{Dimension, FlexDirection, LengthPercentage, Style};

/// Per-side cell counts (padding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Edges {
    pub top: u16,
    pub right: u16,
    pub bottom: u16,
    pub left: u16,
}

impl Edges {
    /// The same count on all four sides.
    #[must_use]
    pub const fn all(n: u16) -> Self {
        Self {
            top: n,
            right: n,
            bottom: n,
            left: n,
        }
    }

    /// `vertical` above and below, `horizontal` left and right.
    #[must_use]
    pub const fn symmetric(vertical: u16, horizontal: u16) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    fn to_taffy(self) -> taffy::Rect<LengthPercentage> {
        taffy::Rect {
            top: length(f32::from(self.top)),
            right: length(f32::from(self.right)),
            bottom: length(f32::from(self.bottom)),
            left: length(f32::from(self.left)),
        }
    }
}

/// Style of a box node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStyle {
    /// Main axis.
    pub direction: FlexDirection,
    /// Fixed width in cells; `None` sizes to content or stretches.
    pub width: Option<u16>,
    /// Fixed height in cells.
    pub height: Option<u16>,
    pub padding: Edges,
    /// A one-cell border on every side.
    pub border: bool,
    /// Cells between children along the main axis.
    pub gap: u16,
    pub grow: f32,
    pub shrink: f32,
}

impl Default for BoxStyle {
    fn default() -> Self {
        Self {
            direction: FlexDirection::Row,
            width: None,
            height: None,
            padding: Edges::default(),
            border: false,
            gap: 0,
            grow: 0.0,
            shrink: 1.0,
        }
    }
}

impl BoxStyle {
    /// A column container.
    #[must_use]
    pub fn column() -> Self {
        Self {
            direction: FlexDirection::Column,
            ..Self::default()
        }
    }

    /// A row container.
    #[must_use]
    pub fn row() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    #[must_use]
    pub const fn height(mut self, height: u16) -> Self {
        self.height = Some(height);
        self
    }

    #[must_use]
    pub const fn padding(mut self, padding: Edges) -> Self {
        self.padding = padding;
        self
    }

    #[must_use]
    pub const fn border(mut self, border: bool) -> Self {
        self.border = border;
        self
    }

    #[must_use]
    pub const fn gap(mut self, gap: u16) -> Self {
        self.gap = gap;
        self
    }

    #[must_use]
    pub const fn grow(mut self, grow: f32) -> Self {
        self.grow = grow;
        self
    }

    /// The equivalent taffy style.
    #[must_use]
    pub fn to_taffy(&self) -> Style {
        let gap: LengthPercentage = length(f32::from(self.gap));
        Style {
            flex_direction: self.direction,
            flex_grow: self.grow,
            flex_shrink: self.shrink,
            size: taffy::Size {
                width: dimension(self.width),
                height: dimension(self.height),
            },
            padding: self.padding.to_taffy(),
            border: Edges::all(u16::from(self.border)).to_taffy(),
            gap: taffy::Size {
                width: gap,
                height: gap,
            },
            ..Style::default()
        }
    }
}

fn dimension(cells: Option<u16>) -> Dimension {
    cells.map_or_else(auto, |n| length(f32::from(n)))
}

/// Style of a text leaf: never shrunk below its measured size, so an
/// overflowing line shows up as overflow and gets wrapped.
pub(crate) fn text_style() -> Style {
    Style {
        flex_shrink: 0.0,
        ..Style::default()
    }
}
