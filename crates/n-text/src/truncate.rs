// SPDX-License-Identifier: MIT
//
// Ellipsis truncation.
//
// Truncation, like wrapping, works on styled clusters: the kept slices
// keep their styles and no cluster or escape is ever cut in half. The
// ellipsis itself is drawn unstyled.

use crate::measure::Measurer;
use crate::style::Style;
use crate::styled::{run_width, serialize, tokenize, StyledChar};
use crate::width::WidthFn;

/// The truncation mark.
pub const ELLIPSIS: &str = "…";

/// Where the ellipsis goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TruncatePosition {
    /// `"…World"`: keep the tail.
    Start,
    /// `"He…ld"`: keep both ends.
    Middle,
    /// `"Hello…"`: keep the head.
    #[default]
    End,
}

/// Truncate one line of `text` to at most `columns` columns.
///
/// Text that already fits comes back unchanged. A budget of one column
/// leaves only the ellipsis; a budget of zero leaves nothing. If the width
/// function makes the ellipsis wider than the budget, the text is cut
/// without one. The result never exceeds `columns`.
///
/// ```
/// use n_text::measure::Measurer;
/// use n_text::truncate::{truncate, TruncatePosition};
///
/// let m = Measurer::new();
/// assert_eq!(truncate("Hello World", 7, TruncatePosition::End, &m), "Hello …");
/// assert_eq!(truncate("Hello World", 7, TruncatePosition::Start, &m), "… World");
/// ```
#[must_use]
pub fn truncate(text: &str, columns: usize, position: TruncatePosition, measurer: &Measurer) -> String {
    let chars = tokenize(text, measurer.width_fn());
    if columns > 0 && run_width(&chars) <= columns {
        return text.to_owned();
    }
    serialize(&truncate_chars(&chars, columns, position, measurer.width_fn()))
}

/// Truncate a styled char run. See [`truncate`].
#[must_use]
pub fn truncate_chars(
    chars: &[StyledChar],
    columns: usize,
    position: TruncatePosition,
    width_fn: WidthFn,
) -> Vec<StyledChar> {
    if columns == 0 {
        return Vec::new();
    }
    if run_width(chars) <= columns {
        return chars.to_vec();
    }

    let ellipsis = StyledChar::new(ELLIPSIS, Style::PLAIN, width_fn);
    let Some(budget) = columns.checked_sub(usize::from(ellipsis.width)) else {
        // The ellipsis alone would overflow (ambiguous-wide width tables).
        return head(chars, columns).to_vec();
    };
    match position {
        TruncatePosition::End => {
            let mut out = head(chars, budget).to_vec();
            out.push(ellipsis);
            out
        }
        TruncatePosition::Start => {
            let mut out = vec![ellipsis];
            out.extend_from_slice(tail(chars, budget));
            out
        }
        TruncatePosition::Middle => {
            let left = columns.div_ceil(2).min(budget);
            let right = budget - left;
            let mut out = head(chars, left).to_vec();
            out.push(ellipsis);
            out.extend_from_slice(tail(chars, right));
            out
        }
    }
}

/// Longest prefix of `chars` fitting in `budget` columns.
fn head(chars: &[StyledChar], budget: usize) -> &[StyledChar] {
    let mut width = 0;
    let end = chars
        .iter()
        .position(|c| {
            width += usize::from(c.width);
            width > budget
        })
        .unwrap_or(chars.len());
    &chars[..end]
}

/// Longest suffix of `chars` fitting in `budget` columns.
fn tail(chars: &[StyledChar], budget: usize) -> &[StyledChar] {
    let mut width = 0;
    let kept = chars
        .iter()
        .rev()
        .position(|c| {
            width += usize::from(c.width);
            width > budget
        })
        .unwrap_or(chars.len());
    &chars[chars.len() - kept..]
}
