// SPDX-License-Identifier: MIT
//
// Style — what a styled character looks like, folded into one value.
//
// Text arrives decorated with SGR escape sequences (`\x1b[1;31m` and
// friends). Each sequence is a style descriptor; applying them in order
// yields the effective look of every following cluster. Rather than keep
// the raw descriptor list around per character, we fold it into a small
// `Copy` value: foreground, background, attribute bits, underline style.
//
// Two characters with equal `Style` render identically, which is all the
// serializer needs to emit minimal SGR transitions between neighbours.

// ─── Text Attributes ─────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Text attributes stored as a compact bitfield.
    ///
    /// These map directly to SGR (Select Graphic Rendition) parameters:
    ///
    /// ```
    /// use n_text::style::Attr;
    ///
    /// let attrs = Attr::BOLD | Attr::ITALIC;
    /// assert!(attrs.contains(Attr::BOLD));
    /// assert!(!attrs.contains(Attr::DIM));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1: increased intensity.
        const BOLD          = 1 << 0;
        /// SGR 2: decreased intensity (faint).
        const DIM           = 1 << 1;
        /// SGR 3: italic.
        const ITALIC        = 1 << 2;
        /// SGR 5: slow blink.
        const SLOW_BLINK    = 1 << 3;
        /// SGR 6: rapid blink.
        const RAPID_BLINK   = 1 << 4;
        /// SGR 7: swap foreground and background.
        const INVERSE       = 1 << 5;
        /// SGR 8: invisible text.
        const HIDDEN        = 1 << 6;
        /// SGR 9: crossed-out text.
        const STRIKETHROUGH = 1 << 7;
    }
}

// ─── Underline Style ─────────────────────────────────────────────────────────

/// Underline style, kept apart from [`Attr`] so "is underlined" and
/// "which underline" can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(u8)]
pub enum UnderlineStyle {
    /// No underline.
    #[default]
    None = 0,
    /// SGR 4 / 4:1.
    Straight = 1,
    /// SGR 4:2 (also SGR 21).
    Double = 2,
    /// SGR 4:3.
    Curly = 3,
    /// SGR 4:4.
    Dotted = 4,
    /// SGR 4:5.
    Dashed = 5,
}

impl UnderlineStyle {
    /// Decode the `N` of an `SGR 4:N` sub-parameter.
    #[must_use]
    pub const fn from_param(n: u16) -> Self {
        match n {
            0 => Self::None,
            2 => Self::Double,
            3 => Self::Curly,
            4 => Self::Dotted,
            5 => Self::Dashed,
            _ => Self::Straight,
        }
    }

    /// Whether any underline is active.
    #[inline]
    #[must_use]
    pub const fn is_underlined(self) -> bool {
        !matches!(self, Self::None)
    }
}

// ─── Color ───────────────────────────────────────────────────────────────────

/// A terminal color as the terminal understands it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Color {
    /// Terminal default color (SGR 39 / 49).
    #[default]
    Default,
    /// ANSI 256-color palette index. 0–7 standard, 8–15 bright.
    Ansi256(u8),
    /// 24-bit `TrueColor`.
    Rgb(u8, u8, u8),
}

impl Color {
    /// Whether this is the terminal default.
    #[inline]
    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }
}

// ─── Style ───────────────────────────────────────────────────────────────────

/// The folded result of every SGR descriptor applied so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Style {
    /// Foreground (text) color.
    pub fg: Color,
    /// Background color.
    pub bg: Color,
    /// Attribute bits (bold, italic, ...).
    pub attrs: Attr,
    /// Underline style.
    pub underline: UnderlineStyle,
}

impl Style {
    /// No styling at all: what the terminal shows after `SGR 0`.
    pub const PLAIN: Self = Self {
        fg: Color::Default,
        bg: Color::Default,
        attrs: Attr::empty(),
        underline: UnderlineStyle::None,
    };

    /// Whether this style is indistinguishable from [`Style::PLAIN`].
    #[inline]
    #[must_use]
    pub fn is_plain(self) -> bool {
        self == Self::PLAIN
    }

    /// Builder: set the foreground color.
    #[must_use]
    pub const fn fg(mut self, color: Color) -> Self {
        self.fg = color;
        self
    }

    /// Builder: set the background color.
    #[must_use]
    pub const fn bg(mut self, color: Color) -> Self {
        self.bg = color;
        self
    }

    /// Builder: add attributes.
    #[must_use]
    pub const fn attrs(mut self, attrs: Attr) -> Self {
        self.attrs = self.attrs.union(attrs);
        self
    }

    /// Builder: set the underline style.
    #[must_use]
    pub const fn underline(mut self, underline: UnderlineStyle) -> Self {
        self.underline = underline;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_style_is_plain() {
        assert!(Style::default().is_plain());
        assert_eq!(Style::default(), Style::PLAIN);
    }

    #[test]
    fn builders_compose() {
        let style = Style::PLAIN
            .fg(Color::Ansi256(1))
            .bg(Color::Rgb(1, 2, 3))
            .attrs(Attr::BOLD)
            .attrs(Attr::ITALIC)
            .underline(UnderlineStyle::Curly);
        assert_eq!(style.fg, Color::Ansi256(1));
        assert_eq!(style.bg, Color::Rgb(1, 2, 3));
        assert_eq!(style.attrs, Attr::BOLD | Attr::ITALIC);
        assert!(style.underline.is_underlined());
        assert!(!style.is_plain());
    }

    #[test]
    fn underline_from_param() {
        assert_eq!(UnderlineStyle::from_param(0), UnderlineStyle::None);
        assert_eq!(UnderlineStyle::from_param(1), UnderlineStyle::Straight);
        assert_eq!(UnderlineStyle::from_param(3), UnderlineStyle::Curly);
        assert_eq!(UnderlineStyle::from_param(99), UnderlineStyle::Straight);
    }
}
