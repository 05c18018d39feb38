// SPDX-License-Identifier: MIT
//
// Output — the compositor that turns positioned writes into terminal text.
//
// A render walk records what it wants drawn: text at (x, y), and clip
// regions pushed and popped around subtrees. Nothing is painted while
// recording. `get()` replays the operation log, in order, into a fresh
// grid of styled chars and serializes that grid to a string.
//
// Design:
//
//   - Accumulate, then resolve. The log is immutable once recorded, so
//     `get()` can be called any number of times and always agrees with
//     itself.
//
//   - Clips nest. Pushing a clip intersects it with the active one;
//     popping restores the previous region. Each side of a clip is
//     optional: an unset side does not constrain.
//
//   - Painting is column-exact. Every cell is checked against the grid
//     and the active clip, so a partially visible write paints exactly
//     its visible columns.
//
//   - Wide characters occupy two columns. The first cell holds the
//     cluster; the second is a continuation cell. A wide char with one
//     column clipped leaves a blank in its style in the visible column,
//     never half a glyph. Overwriting either half of an existing wide
//     char breaks it.

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use n_text::style::Style;
use n_text::styled::{plain_text, serialize, split_lines, tokenize, StyledChar};
use n_text::width::{default_char_width, WidthFn};

// ─── Operations ─────────────────────────────────────────────────────────────

/// Rewrites one line of a write before it is painted.
///
/// Receives the line's plain text (styles stripped) and its line index;
/// the returned string is re-tokenized, so it may carry SGR styling.
pub type Transformer = Rc<dyn Fn(&str, usize) -> String>;

/// What a write paints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// A string, optionally carrying SGR sequences.
    Text(String),
    /// Pre-tokenized styled chars.
    Styled(Vec<StyledChar>),
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<StyledChar>> for Content {
    fn from(chars: Vec<StyledChar>) -> Self {
        Self::Styled(chars)
    }
}

/// Per-write options.
#[derive(Clone, Default)]
pub struct WriteOptions {
    /// Applied in order to every line.
    pub transformers: Vec<Transformer>,
    /// Index passed to transformers for the first line.
    pub line_index: Option<usize>,
}

impl fmt::Debug for WriteOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteOptions")
            .field("transformers", &self.transformers.len())
            .field("line_index", &self.line_index)
            .finish()
    }
}

/// A clip region. Lower bounds are inclusive, upper bounds exclusive;
/// `None` leaves that side open.
///
/// ```
/// use n_term::output::Clip;
///
/// let clip = Clip { x1: Some(0), x2: Some(5), y1: None, y2: None };
/// assert!(clip.contains(4, 100));
/// assert!(!clip.contains(5, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Clip {
    pub x1: Option<i32>,
    pub x2: Option<i32>,
    pub y1: Option<i32>,
    pub y2: Option<i32>,
}

impl Clip {
    /// The region inside both `self` and `other`.
    #[must_use]
    pub fn intersect(self, other: Self) -> Self {
        Self {
            x1: tighter(self.x1, other.x1, i32::max),
            x2: tighter(self.x2, other.x2, i32::min),
            y1: tighter(self.y1, other.y1, i32::max),
            y2: tighter(self.y2, other.y2, i32::min),
        }
    }

    /// Whether a cell lies inside the region.
    #[inline]
    #[must_use]
    pub fn contains(self, x: i32, y: i32) -> bool {
        self.x1.is_none_or(|x1| x >= x1) && self.x2.is_none_or(|x2| x < x2) && self.contains_row(y)
    }

    /// Whether row `y` lies inside the region's vertical bounds.
    #[inline]
    #[must_use]
    pub fn contains_row(self, y: i32) -> bool {
        self.y1.is_none_or(|y1| y >= y1) && self.y2.is_none_or(|y2| y < y2)
    }
}

fn tighter(a: Option<i32>, b: Option<i32>, pick: fn(i32, i32) -> i32) -> Option<i32> {
    match (a, b) {
        (Some(a), Some(b)) => Some(pick(a, b)),
        (a, b) => a.or(b),
    }
}

#[derive(Debug, Clone)]
enum Operation {
    Write {
        x: i32,
        y: i32,
        content: Content,
        options: WriteOptions,
    },
    Clip(Clip),
    Unclip,
}

// ─── Grid ───────────────────────────────────────────────────────────────────

/// A width × height grid of styled chars, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    rows: Vec<Vec<StyledChar>>,
}

impl Grid {
    /// A grid of plain blanks.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            rows: vec![vec![StyledChar::blank(Style::PLAIN); width]; height],
        }
    }

    /// Width in columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Height in rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// The cell at `(x, y)`, if in bounds.
    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> Option<&StyledChar> {
        self.rows.get(y)?.get(x)
    }

    /// All rows, top to bottom.
    #[must_use]
    pub fn rows(&self) -> &[Vec<StyledChar>] {
        &self.rows
    }

    /// Serialize every row, trailing unstyled blanks trimmed, joined
    /// with `\n`.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (y, row) in self.rows.iter().enumerate() {
            if y > 0 {
                out.push('\n');
            }
            let end = row
                .iter()
                .rposition(|c| !c.is_plain_blank())
                .map_or(0, |i| i + 1);
            out.push_str(&serialize(&row[..end]));
        }
        out
    }

    /// Signed position to grid indices, if in bounds.
    fn index(&self, x: i32, y: i32) -> Option<(usize, usize)> {
        let x = usize::try_from(x).ok().filter(|&x| x < self.width)?;
        let y = usize::try_from(y).ok().filter(|&y| y < self.rows.len())?;
        Some((x, y))
    }

    /// Break any wide character that touches `(x, y)`.
    ///
    /// - If `(x, y)` is a continuation, the owner at `x - 1` becomes a
    ///   blank in its own style.
    /// - If the cell after `(x, y)` is a continuation, it was the second
    ///   half of a wide char starting here; it becomes a blank.
    fn break_wide_char_at(&mut self, x: usize, y: usize) {
        let row = &mut self.rows[y];

        if row[x].is_continuation() && x > 0 {
            let style = row[x - 1].style;
            row[x - 1] = StyledChar::blank(style);
        }

        if let Some(next) = row.get_mut(x + 1) {
            if next.is_continuation() {
                *next = StyledChar::blank(next.style);
            }
        }
    }

    fn put(&mut self, x: usize, y: usize, ch: StyledChar) {
        self.break_wide_char_at(x, y);
        self.rows[y][x] = ch;
    }

    fn put_wide(&mut self, x: usize, y: usize, ch: StyledChar) {
        let style = ch.style;
        self.put(x, y, ch);
        self.break_wide_char_at(x + 1, y);
        self.rows[y][x + 1] = StyledChar::continuation(style);
    }
}

// ─── Output ─────────────────────────────────────────────────────────────────

/// The rendered frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Rows joined with `\n`, styled with SGR sequences.
    pub text: String,
    /// Number of rows.
    pub height: usize,
}

/// Records positioned writes and clips; composites them on [`get`](Output::get).
///
/// ```
/// use n_term::output::{Clip, Output, WriteOptions};
///
/// let mut output = Output::new(20, 1);
/// output.clip(Clip { x1: Some(0), x2: Some(5), y1: Some(0), y2: Some(1) });
/// output.write(0, 0, "Hello World", WriteOptions::default());
/// output.unclip();
/// assert_eq!(output.get().text, "Hello");
/// ```
#[derive(Debug, Clone)]
pub struct Output {
    width: usize,
    height: usize,
    width_fn: WidthFn,
    operations: Vec<Operation>,
}

impl Output {
    /// An empty frame measured with the default width function.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_width_fn(width, height, default_char_width)
    }

    /// An empty frame measured with a custom width function.
    #[must_use]
    pub const fn with_width_fn(width: usize, height: usize, width_fn: WidthFn) -> Self {
        Self {
            width,
            height,
            width_fn,
            operations: Vec::new(),
        }
    }

    /// Frame width in columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Frame height in rows.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Record a write of `content` with its first cell at `(x, y)`.
    pub fn write(&mut self, x: i32, y: i32, content: impl Into<Content>, options: WriteOptions) {
        self.operations.push(Operation::Write {
            x,
            y,
            content: content.into(),
            options,
        });
    }

    /// Push a clip region (intersected with the active one).
    pub fn clip(&mut self, clip: Clip) {
        self.operations.push(Operation::Clip(clip));
    }

    /// Pop the innermost clip region.
    pub fn unclip(&mut self) {
        self.operations.push(Operation::Unclip);
    }

    /// Replay the log into a fresh grid.
    #[must_use]
    pub fn composite(&self) -> Grid {
        let mut grid = Grid::new(self.width, self.height);
        let mut clips: Vec<Clip> = Vec::new();

        for op in &self.operations {
            match op {
                Operation::Clip(clip) => {
                    let active = clips.last().map_or(*clip, |top| top.intersect(*clip));
                    clips.push(active);
                }
                Operation::Unclip => {
                    if clips.pop().is_none() {
                        tracing::warn!("unclip without a matching clip");
                    }
                }
                Operation::Write {
                    x,
                    y,
                    content,
                    options,
                } => self.paint(&mut grid, *x, *y, content, options, clips.last().copied()),
            }
        }

        if !clips.is_empty() {
            tracing::debug!(open = clips.len(), "clips left open at end of frame");
        }
        grid
    }

    /// Composite and serialize the frame.
    #[must_use]
    pub fn get(&self) -> Rendered {
        Rendered {
            text: self.composite().to_text(),
            height: self.height,
        }
    }

    fn paint(
        &self,
        grid: &mut Grid,
        x: i32,
        y: i32,
        content: &Content,
        options: &WriteOptions,
        clip: Option<Clip>,
    ) {
        let chars: Cow<'_, [StyledChar]> = match content {
            Content::Text(text) => Cow::Owned(tokenize(text, self.width_fn)),
            Content::Styled(chars) => Cow::Borrowed(chars.as_slice()),
        };

        let first_index = options.line_index.unwrap_or(0);
        for (i, line) in split_lines(&chars).into_iter().enumerate() {
            let Ok(offset) = i32::try_from(i) else {
                break;
            };
            let row = y.saturating_add(offset);
            if usize::try_from(row).map_or(true, |r| r >= grid.height()) {
                continue;
            }
            if clip.is_some_and(|c| !c.contains_row(row)) {
                continue;
            }

            if options.transformers.is_empty() {
                paint_line(grid, x, row, line, clip);
            } else {
                let mut text = plain_text(line);
                for transform in &options.transformers {
                    text = transform(&text, first_index + i);
                }
                paint_line(grid, x, row, &tokenize(&text, self.width_fn), clip);
            }
        }
    }
}

/// Paint one line of styled chars starting at `(x, y)`, column by column.
fn paint_line(grid: &mut Grid, x: i32, y: i32, line: &[StyledChar], clip: Option<Clip>) {
    let visible = |grid: &Grid, col: i32| {
        clip.is_none_or(|c| c.contains(col, y))
            .then(|| grid.index(col, y))
            .flatten()
    };

    let mut col = x;
    for ch in line {
        let width = i32::from(ch.width);
        // Zero-width clusters and continuations take no cell of their own.
        if width == 0 {
            continue;
        }
        let start = col;
        col = col.saturating_add(width);

        if width == 1 {
            if let Some((cx, cy)) = visible(grid, start) {
                grid.put(cx, cy, ch.clone());
            }
            continue;
        }

        match (visible(grid, start), visible(grid, start + 1)) {
            (Some((cx, cy)), Some(_)) => grid.put_wide(cx, cy, ch.clone()),
            (Some((cx, cy)), None) | (None, Some((cx, cy))) => {
                grid.put(cx, cy, StyledChar::blank(ch.style));
            }
            (None, None) => {}
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
