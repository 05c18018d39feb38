// SPDX-License-Identifier: MIT
//
// Column widths of codepoints and grapheme clusters.
//
// Every width decision in the toolkit bottoms out in a `WidthFn`: a plain
// function from a codepoint to 0, 1, or 2 terminal columns. The default
// follows East Asian Width via `unicode-width`, with the common emoji
// blocks forced wide because terminals draw them in two cells regardless
// of what the tables say.
//
// Cluster width comes from the cluster's base codepoint. Multi-codepoint
// clusters that select emoji presentation (ZWJ chains, VS16, skin tones,
// keycaps, flag pairs) are always wide.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

/// A pluggable codepoint width function.
///
/// Must be pure and total. A width function that panics takes the caller
/// down with it; there is no safe fallback for a broken width table.
pub type WidthFn = fn(char) -> usize;

const ZWJ: u32 = 0x200D;
const VS16: u32 = 0xFE0F;
const KEYCAP: u32 = 0x20E3;

/// Default codepoint width: emoji blocks are wide, everything else follows
/// UAX #11. Control characters are zero-width.
///
/// ```
/// use n_text::width::default_char_width;
///
/// assert_eq!(default_char_width('a'), 1);
/// assert_eq!(default_char_width('中'), 2);
/// assert_eq!(default_char_width('🚀'), 2);
/// assert_eq!(default_char_width('\u{0301}'), 0);
/// ```
#[inline]
#[must_use]
pub fn default_char_width(c: char) -> usize {
    match c as u32 {
        // Misc symbols, dingbats
        0x2600..=0x27BF
        // Misc symbols and pictographs, emoticons, transport and map
        | 0x1F300..=0x1F64F
        | 0x1F680..=0x1F6FF
        // Supplemental symbols and pictographs, extended-A
        | 0x1F900..=0x1F9FF
        | 0x1FA70..=0x1FAFF => 2,
        _ => c.width().unwrap_or(0),
    }
}

/// Whether `c` is a regional indicator (half of a flag).
#[inline]
#[must_use]
pub const fn is_regional_indicator(c: char) -> bool {
    matches!(c as u32, 0x1F1E6..=0x1F1FF)
}

/// Whether `c` is a Fitzpatrick skin tone modifier.
#[inline]
#[must_use]
pub const fn is_skin_tone(c: char) -> bool {
    matches!(c as u32, 0x1F3FB..=0x1F3FF)
}

/// Whether `c` can start an emoji sequence (Extended_Pictographic, by
/// block). Good enough for "might this cluster keep growing?" decisions.
#[inline]
#[must_use]
pub const fn is_pictographic(c: char) -> bool {
    matches!(
        c as u32,
        0x00A9 | 0x00AE | 0x203C | 0x2049 | 0x2122 | 0x2139
            | 0x2194..=0x21AA
            | 0x231A..=0x23FF
            | 0x24C2
            | 0x25AA..=0x25FE
            | 0x2600..=0x27BF
            | 0x2934..=0x2935
            | 0x2B05..=0x2B55
            | 0x3030 | 0x303D | 0x3297 | 0x3299
            | 0x1F000..=0x1F0FF
            | 0x1F10D..=0x1F1AD
            | 0x1F201..=0x1F2FF
            | 0x1F300..=0x1F3FA
            | 0x1F400..=0x1FAFF
    )
}

/// Width of one grapheme cluster under `width_fn`.
///
/// - Single codepoint → `width_fn(c)`
/// - Regional indicator pair → 2
/// - Contains ZWJ, VS16, a skin tone, or a keycap → 2
/// - Otherwise → width of the base codepoint (combining marks add nothing)
#[must_use]
pub fn cluster_width(cluster: &str, width_fn: WidthFn) -> usize {
    let mut chars = cluster.chars();
    let Some(base) = chars.next() else {
        return 0;
    };

    if cluster.len() == base.len_utf8() {
        return width_fn(base);
    }

    if is_regional_indicator(base) {
        return 2;
    }

    let emoji_sequence = chars.any(|c| {
        let cp = c as u32;
        cp == ZWJ || cp == VS16 || cp == KEYCAP || is_skin_tone(c)
    });
    if emoji_sequence {
        return 2;
    }

    width_fn(base)
}

/// Width of a single line of plain text (no newlines, no escapes).
#[must_use]
pub fn line_width(line: &str, width_fn: WidthFn) -> usize {
    line.graphemes(true).map(|g| cluster_width(g, width_fn)).sum()
}
