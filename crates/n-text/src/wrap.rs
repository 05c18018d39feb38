// SPDX-License-Identifier: MIT
//
// Word wrapping to a column budget.
//
// Wrapping works on styled clusters, not bytes, so a row break can never
// land inside a grapheme cluster or an escape sequence, and each row is
// re-serialized with its own opening and closing SGR codes. A red word
// that wraps onto the next row is still red there.
//
// Rules, per logical line (`\n` always starts a new row):
//
//   - Words are runs of non-space clusters; every space is its own token.
//   - Words are packed greedily. When a word would overflow a non-empty
//     row, the row ends (dropping one trailing space, unless the row is
//     nothing but the line's leading indentation) and the word starts
//     the next row.
//   - A space that would overflow a non-empty row is consumed by the
//     break instead of starting the next row.
//   - A word wider than the budget on its own is hard-split cluster by
//     cluster.

use crate::measure::Measurer;
use crate::styled::{run_width, serialize, split_lines, tokenize, StyledChar};
use crate::truncate::{truncate_chars, TruncatePosition};

/// How a text node fits its content into a width limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextWrap {
    /// Word-wrap onto as many rows as needed.
    #[default]
    Wrap,
    /// Keep one row per logical line, truncating with an ellipsis.
    Truncate(TruncatePosition),
}

/// Wrap `text` to `columns`, returning one string per row.
///
/// `columns == 0` disables wrapping: only hard newlines split rows.
///
/// ```
/// use n_text::measure::Measurer;
/// use n_text::wrap::wrap;
///
/// assert_eq!(wrap("Hello World", 5, &Measurer::new()), vec!["Hello", "World"]);
/// ```
#[must_use]
pub fn wrap(text: &str, columns: usize, measurer: &Measurer) -> Vec<String> {
    let chars = tokenize(text, measurer.width_fn());
    wrap_chars(&chars, columns).iter().map(|row| serialize(row)).collect()
}

/// Fit `text` into `columns` using `mode`, returning one string per row.
#[must_use]
pub fn wrap_text(text: &str, columns: usize, mode: TextWrap, measurer: &Measurer) -> Vec<String> {
    match mode {
        TextWrap::Wrap => wrap(text, columns, measurer),
        TextWrap::Truncate(position) => {
            let width_fn = measurer.width_fn();
            let chars = tokenize(text, width_fn);
            split_lines(&chars)
                .into_iter()
                .map(|line| serialize(&truncate_chars(line, columns, position, width_fn)))
                .collect()
        }
    }
}

/// Wrap styled chars into rows. See the module docs for the rules.
#[must_use]
pub fn wrap_chars(chars: &[StyledChar], columns: usize) -> Vec<Vec<StyledChar>> {
    let mut rows = Vec::new();
    for line in split_lines(chars) {
        if columns == 0 {
            rows.push(line.to_vec());
        } else {
            wrap_line(line, columns, &mut rows);
        }
    }
    rows
}

/// A row under construction.
struct Row {
    chars: Vec<StyledChar>,
    width: usize,
    /// The row began at the start of a logical line.
    line_start: bool,
    /// The row holds at least one non-space cluster.
    has_word: bool,
}

impl Row {
    const fn new(line_start: bool) -> Self {
        Self {
            chars: Vec::new(),
            width: 0,
            line_start,
            has_word: false,
        }
    }

    fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    fn push(&mut self, ch: &StyledChar) {
        self.width += usize::from(ch.width);
        self.has_word |= !ch.is_space();
        self.chars.push(ch.clone());
    }

    /// Drop one trailing space, except from pure leading indentation.
    fn trim_trailing_space(&mut self) {
        let indentation_only = self.line_start && !self.has_word;
        if indentation_only || !self.chars.last().is_some_and(StyledChar::is_space) {
            return;
        }
        if let Some(space) = self.chars.pop() {
            self.width -= usize::from(space.width);
        }
    }
}

fn wrap_line(line: &[StyledChar], columns: usize, rows: &mut Vec<Vec<StyledChar>>) {
    let mut row = Row::new(true);
    let mut i = 0;

    while i < line.len() {
        if line[i].is_space() {
            if row.width + usize::from(line[i].width) > columns && !row.is_empty() {
                rows.push(std::mem::take(&mut row.chars));
                row = Row::new(false);
            } else {
                row.push(&line[i]);
            }
            i += 1;
            continue;
        }

        let end = line[i..]
            .iter()
            .position(StyledChar::is_space)
            .map_or(line.len(), |p| i + p);
        let word = &line[i..end];
        let word_width = run_width(word);

        if row.width + word_width > columns && !row.is_empty() {
            row.trim_trailing_space();
            rows.push(std::mem::take(&mut row.chars));
            row = Row::new(false);
        }

        if word_width > columns {
            for ch in word {
                if row.width + usize::from(ch.width) > columns && !row.is_empty() {
                    rows.push(std::mem::take(&mut row.chars));
                    row = Row::new(false);
                }
                row.push(ch);
            }
        } else {
            for ch in word {
                row.push(ch);
            }
        }

        i = end;
    }

    rows.push(row.chars);
}
