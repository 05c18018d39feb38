// SPDX-License-Identifier: MIT
//
// Styled characters — the atomic unit of composited output.
//
// A `StyledChar` is one grapheme cluster plus the style it is drawn with
// and the number of columns it covers. Text enters the toolkit as strings
// decorated with SGR sequences; `tokenize` turns those into styled chars
// and `serialize` turns styled chars back into a string, emitting only the
// SGR transitions needed between neighbours.
//
// Wide characters (CJK, most emoji) cover two columns. In a grid, the
// second column holds a continuation char: an empty cluster carrying the
// owner's style. The serializer skips continuations; the terminal already
// advanced past that column when it drew the owner.

use unicode_segmentation::UnicodeSegmentation;

use crate::ansi;
use crate::style::Style;
use crate::width::{cluster_width, WidthFn};

// ─── StyledChar ──────────────────────────────────────────────────────────────

/// One grapheme cluster with its style and column width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledChar {
    /// The grapheme cluster. Empty for a continuation cell.
    pub value: String,
    /// Columns covered: 0 (zero-width), 1, or 2 (full-width).
    pub width: u8,
    /// Folded SGR style.
    pub style: Style,
}

impl StyledChar {
    /// A styled cluster, measured with `width_fn`.
    #[must_use]
    pub fn new(value: &str, style: Style, width_fn: WidthFn) -> Self {
        // Clamp: terminals never give a single cluster more than two cells.
        #[allow(clippy::cast_possible_truncation)]
        let width = cluster_width(value, width_fn).min(2) as u8;
        Self {
            value: value.to_owned(),
            width,
            style,
        }
    }

    /// A one-column space in `style`.
    #[must_use]
    pub fn blank(style: Style) -> Self {
        Self {
            value: String::from(" "),
            width: 1,
            style,
        }
    }

    /// The second column of a full-width cluster.
    #[must_use]
    pub const fn continuation(style: Style) -> Self {
        Self {
            value: String::new(),
            width: 0,
            style,
        }
    }

    /// Whether this cluster covers two columns.
    #[inline]
    #[must_use]
    pub const fn is_full_width(&self) -> bool {
        self.width == 2
    }

    /// Whether this is a continuation cell.
    #[inline]
    #[must_use]
    pub fn is_continuation(&self) -> bool {
        self.value.is_empty()
    }

    /// Whether this is an unstyled space (trimmable at line end).
    #[inline]
    #[must_use]
    pub fn is_plain_blank(&self) -> bool {
        self.value == " " && self.style.is_plain()
    }

    /// Whether this cluster is a line break.
    #[inline]
    #[must_use]
    pub fn is_newline(&self) -> bool {
        self.value == "\n" || self.value == "\r\n"
    }

    /// Whether this cluster is a single space.
    #[inline]
    #[must_use]
    pub fn is_space(&self) -> bool {
        self.value == " "
    }
}

// ─── Tokenizing ──────────────────────────────────────────────────────────────

/// Split `text` into styled clusters.
///
/// SGR sequences update the running style and produce no chars. Every
/// other escape sequence (cursor movement, OSC, ...) is dropped: it has no
/// place in a composited grid. Newlines come through as their own chars.
///
/// ```
/// use n_text::styled::tokenize;
/// use n_text::style::Color;
/// use n_text::width::default_char_width;
///
/// let chars = tokenize("a\x1b[31mb", default_char_width);
/// assert_eq!(chars.len(), 2);
/// assert_eq!(chars[1].style.fg, Color::Ansi256(1));
/// ```
#[must_use]
pub fn tokenize(text: &str, width_fn: WidthFn) -> Vec<StyledChar> {
    let mut chars = Vec::with_capacity(text.len());
    let mut style = Style::PLAIN;
    let mut rest = text;

    while !rest.is_empty() {
        let esc = rest.find('\x1b').unwrap_or(rest.len());
        for cluster in rest[..esc].graphemes(true) {
            chars.push(StyledChar::new(cluster, style, width_fn));
        }
        rest = &rest[esc..];
        if rest.is_empty() {
            break;
        }

        let len = ansi::escape_len(rest);
        if let Some(params) = ansi::sgr_params(&rest[..len]) {
            ansi::apply_sgr(&mut style, params);
        }
        rest = &rest[len..];
    }

    chars
}

/// Split a char run into lines at newline clusters (newlines dropped).
///
/// Always returns at least one (possibly empty) line.
#[must_use]
pub fn split_lines(chars: &[StyledChar]) -> Vec<&[StyledChar]> {
    chars.split(StyledChar::is_newline).collect()
}

/// The clusters of `chars` concatenated, styles dropped.
#[must_use]
pub fn plain_text(chars: &[StyledChar]) -> String {
    chars.iter().map(|c| c.value.as_str()).collect()
}

/// Total column width of a char run.
#[must_use]
pub fn run_width(chars: &[StyledChar]) -> usize {
    chars.iter().map(|c| usize::from(c.width)).sum()
}

// ─── Serializing ─────────────────────────────────────────────────────────────

/// Tracks the style the terminal is currently drawing with so that only
/// real changes produce escape sequences.
///
/// - **Attributes**: On change, reset (SGR 0) + re-emit. A reset also
///   clears colors and underline, so those are re-emitted as needed.
///   Going from no attributes to some skips the reset.
/// - **Underline, colors**: Emitted only when they differ.
/// - **End of run**: A closing SGR 0 if anything is still active, so a
///   serialized run never leaks style into whatever follows it.
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleWriter {
    current: Style,
}

impl StyleWriter {
    /// A writer that assumes the terminal starts unstyled.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: Style::PLAIN,
        }
    }

    /// Transition from the current style to `style`.
    pub fn apply(&mut self, out: &mut String, style: Style) {
        if style == self.current {
            return;
        }

        if style.attrs != self.current.attrs {
            if !self.current.attrs.is_empty() {
                ansi::reset(out).ok();
                self.current = Style::PLAIN;
            }
            ansi::attrs(out, style.attrs).ok();
            self.current.attrs = style.attrs;
        }

        if style.underline != self.current.underline {
            ansi::underline(out, style.underline).ok();
            self.current.underline = style.underline;
        }

        if style.fg != self.current.fg {
            ansi::fg(out, style.fg).ok();
            self.current.fg = style.fg;
        }

        if style.bg != self.current.bg {
            ansi::bg(out, style.bg).ok();
            self.current.bg = style.bg;
        }
    }

    /// Close any open style.
    pub fn finish(&mut self, out: &mut String) {
        if !self.current.is_plain() {
            ansi::reset(out).ok();
            self.current = Style::PLAIN;
        }
    }
}

/// Render styled chars back to a string with minimal SGR transitions.
///
/// Continuation cells produce no output.
#[must_use]
pub fn serialize(chars: &[StyledChar]) -> String {
    let mut out = String::with_capacity(chars.len());
    let mut writer = StyleWriter::new();
    for ch in chars.iter().filter(|c| !c.is_continuation()) {
        writer.apply(&mut out, ch.style);
        out.push_str(&ch.value);
    }
    writer.finish(&mut out);
    out
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::style::{Attr, Color};
    use crate::width::default_char_width;

    fn tok(text: &str) -> Vec<StyledChar> {
        tokenize(text, default_char_width)
    }

    #[test]
    fn tokenize_plain_ascii() {
        let chars = tok("abc");
        assert_eq!(plain_text(&chars), "abc");
        assert!(chars.iter().all(|c| c.width == 1 && c.style.is_plain()));
    }

    #[test]
    fn tokenize_keeps_clusters_whole() {
        let chars = tok("e\u{0301}👨\u{200D}👩");
        assert_eq!(chars.len(), 2);
        assert_eq!(chars[0].width, 1);
        assert!(chars[1].is_full_width());
    }

    #[test]
    fn tokenize_applies_and_resets_sgr() {
        let chars = tok("\x1b[1;31mab\x1b[0mc");
        assert_eq!(chars[0].style, Style::PLAIN.fg(Color::Ansi256(1)).attrs(Attr::BOLD));
        assert_eq!(chars[1].style, chars[0].style);
        assert!(chars[2].style.is_plain());
    }

    #[test]
    fn tokenize_drops_non_sgr_sequences() {
        let chars = tok("a\x1b[2Kb\x1b]8;;url\x07c");
        assert_eq!(plain_text(&chars), "abc");
    }

    #[test]
    fn split_lines_on_newline_clusters() {
        let chars = tok("ab\ncd\r\n");
        let lines = split_lines(&chars);
        assert_eq!(lines.len(), 3);
        assert_eq!(plain_text(lines[0]), "ab");
        assert_eq!(plain_text(lines[1]), "cd");
        assert!(lines[2].is_empty());
    }

    #[test]
    fn split_lines_empty_input_is_one_line() {
        assert_eq!(split_lines(&[]).len(), 1);
    }

    #[test]
    fn run_width_counts_wide() {
        assert_eq!(run_width(&tok("a中")), 3);
    }

    #[test]
    fn serialize_plain_has_no_escapes() {
        assert_eq!(serialize(&tok("hello")), "hello");
    }

    #[test]
    fn serialize_skips_redundant_sgr() {
        let chars = tok("\x1b[31ma\x1b[31mb\x1b[39mc");
        assert_eq!(serialize(&chars), "\x1b[31mab\x1b[39mc");
    }

    #[test]
    fn serialize_closes_open_style() {
        let chars = tok("\x1b[1mab");
        assert_eq!(serialize(&chars), "\x1b[1mab\x1b[0m");
    }

    #[test]
    fn serialize_attr_change_resets_then_restores_color() {
        let bold_red = Style::PLAIN.attrs(Attr::BOLD).fg(Color::Ansi256(1));
        let red = Style::PLAIN.fg(Color::Ansi256(1));
        let chars = vec![
            StyledChar::new("a", bold_red, default_char_width),
            StyledChar::new("b", red, default_char_width),
        ];
        assert_eq!(serialize(&chars), "\x1b[1m\x1b[31ma\x1b[0m\x1b[31mb\x1b[0m");
    }

    #[test]
    fn serialize_skips_continuations() {
        let chars = vec![
            StyledChar::new("中", Style::PLAIN, default_char_width),
            StyledChar::continuation(Style::PLAIN),
            StyledChar::new("x", Style::PLAIN, default_char_width),
        ];
        assert_eq!(serialize(&chars), "中x");
    }

    #[test]
    fn tokenize_serialize_preserves_rendering() {
        let text = "\x1b[1;4:3mwarn\x1b[0m ok \x1b[48;5;17m中\x1b[49m";
        let once = serialize(&tok(text));
        assert_eq!(tok(&once), tok(text));
    }
}
