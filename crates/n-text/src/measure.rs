// SPDX-License-Identifier: MIT
//
// Text measurement with an explicit, caller-owned cache.
//
// Layout asks "how big is this text?" for every text node on every pass,
// usually about strings it already asked about. `Measurer` answers from a
// cache keyed by the exact text. The cache belongs to the measurer, never
// to the process: swap the width function and the cache goes with it.

use std::collections::HashMap;

use crate::ansi::strip_ansi;
use crate::width::{default_char_width, line_width, WidthFn};

/// Zero-width marker a renderer embeds to record where the terminal cursor
/// should land. Stripped before measuring and before cache lookup.
pub const CURSOR_MARKER: char = '\u{E000}';

/// Width and height of a block of text, in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Dimensions {
    /// Columns of the widest line.
    pub width: usize,
    /// Number of lines.
    pub height: usize,
}

/// Measures text under a pluggable width function, caching results.
///
/// ```
/// use n_text::measure::{Dimensions, Measurer};
///
/// let mut measurer = Measurer::new();
/// assert_eq!(measurer.measure("ab\n中文字"), Dimensions { width: 6, height: 2 });
/// ```
#[derive(Debug, Clone)]
pub struct Measurer {
    width_fn: WidthFn,
    cache: HashMap<String, Dimensions>,
}

impl Measurer {
    /// A measurer using [`default_char_width`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_width_fn(default_char_width)
    }

    /// A measurer using a custom width function.
    #[must_use]
    pub fn with_width_fn(width_fn: WidthFn) -> Self {
        Self {
            width_fn,
            cache: HashMap::new(),
        }
    }

    /// The active width function.
    #[inline]
    #[must_use]
    pub const fn width_fn(&self) -> WidthFn {
        self.width_fn
    }

    /// Swap the width function. Every cached measurement is discarded.
    pub fn set_width_fn(&mut self, width_fn: WidthFn) {
        self.width_fn = width_fn;
        self.invalidate();
    }

    /// Drop every cached measurement.
    pub fn invalidate(&mut self) {
        if !self.cache.is_empty() {
            tracing::debug!(entries = self.cache.len(), "width cache invalidated");
        }
        self.cache.clear();
    }

    /// Number of cached entries.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Measure `text`: widest line and line count.
    ///
    /// Escape sequences and the [`CURSOR_MARKER`] take no space. Empty text
    /// measures 0×0.
    pub fn measure(&mut self, text: &str) -> Dimensions {
        let key = strip_cursor_marker(text);
        if let Some(&dims) = self.cache.get(key.as_ref()) {
            return dims;
        }

        let dims = self.measure_uncached(&key);
        self.cache.insert(key.into_owned(), dims);
        dims
    }

    fn measure_uncached(&self, text: &str) -> Dimensions {
        if text.is_empty() {
            return Dimensions::default();
        }

        let plain = strip_ansi(text);
        let mut dims = Dimensions::default();
        for line in plain.split('\n') {
            dims.width = dims.width.max(self.line_width(line));
            dims.height += 1;
        }
        dims
    }

    /// Width of one line of plain text (no cache).
    #[must_use]
    pub fn line_width(&self, line: &str) -> usize {
        line_width(line, self.width_fn)
    }

    /// Width of the widest line of `text`, escapes ignored (no cache).
    #[must_use]
    pub fn widest_line(&self, text: &str) -> usize {
        strip_ansi(text)
            .split('\n')
            .map(|line| self.line_width(line))
            .max()
            .unwrap_or(0)
    }
}

impl Default for Measurer {
    fn default() -> Self {
        Self::new()
    }
}

/// `text` without any [`CURSOR_MARKER`]. Borrows when there is none.
#[must_use]
pub fn strip_cursor_marker(text: &str) -> std::borrow::Cow<'_, str> {
    if text.contains(CURSOR_MARKER) {
        std::borrow::Cow::Owned(text.replace(CURSOR_MARKER, ""))
    } else {
        std::borrow::Cow::Borrowed(text)
    }
}
