// SPDX-License-Identifier: MIT
//
// Property tests for wrapping, truncation, and measurement.

use n_text::styled::{plain_text, tokenize};
use n_text::{default_char_width, truncate, wrap, Measurer, TruncatePosition};
use proptest::prelude::*;
use unicode_segmentation::UnicodeSegmentation;

// ── Helpers ─────────────────────────────────────────────────────────────

fn text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 .,中文字👍\n]{0,60}").expect("valid regex")
}

fn position_strategy() -> impl Strategy<Value = TruncatePosition> {
    prop_oneof![
        Just(TruncatePosition::Start),
        Just(TruncatePosition::Middle),
        Just(TruncatePosition::End),
    ]
}

/// East Asian ambiguous characters drawn wide, as CJK locales do.
fn ambiguous_wide(c: char) -> usize {
    if c == '…' { 2 } else { default_char_width(c) }
}

/// Non-space, non-newline clusters of `text`, in order.
fn ink(text: &str) -> Vec<String> {
    text.graphemes(true)
        .filter(|g| *g != " " && *g != "\n")
        .map(str::to_owned)
        .collect()
}

// ── Wrap ────────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn wrap_keeps_every_visible_cluster(text in text_strategy(), columns in 1usize..20) {
        let m = Measurer::new();
        let rows = wrap(&text, columns, &m);
        let rejoined: Vec<String> = rows.iter().flat_map(|row| ink(row)).collect();
        prop_assert_eq!(rejoined, ink(&text));
    }

    #[test]
    fn wrap_rows_fit_unless_single_cluster(text in text_strategy(), columns in 1usize..20) {
        let m = Measurer::new();
        for row in wrap(&text, columns, &m) {
            let width = m.widest_line(&row);
            let clusters = row.graphemes(true).count();
            prop_assert!(
                width <= columns || clusters == 1,
                "row {:?} is {} wide for budget {}", row, width, columns
            );
        }
    }

    #[test]
    fn wrap_at_least_one_row_per_line(text in text_strategy(), columns in 0usize..20) {
        let m = Measurer::new();
        let lines = text.split('\n').count();
        prop_assert!(wrap(&text, columns, &m).len() >= lines);
    }

    #[test]
    fn wrap_styled_matches_plain(text in text_strategy(), columns in 1usize..20) {
        let m = Measurer::new();
        let styled = format!("\x1b[1m{text}\x1b[22m");
        let plain_rows = wrap(&text, columns, &m);
        let styled_rows: Vec<String> = wrap(&styled, columns, &m)
            .iter()
            .map(|row| plain_text(&tokenize(row, m.width_fn())))
            .collect();
        prop_assert_eq!(styled_rows, plain_rows);
    }
}

// ── Truncate ────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn truncate_fits_budget(
        text in "[a-zA-Z 中文👍]{0,40}",
        columns in 0usize..30,
        position in position_strategy(),
    ) {
        let m = Measurer::new();
        let out = truncate(&text, columns, position, &m);
        prop_assert!(m.widest_line(&out) <= columns, "{:?} -> {:?}", text, out);
    }

    #[test]
    fn truncate_fits_budget_with_wide_ellipsis(
        text in "[a-zA-Z 中文👍]{0,40}",
        columns in 0usize..30,
        position in position_strategy(),
    ) {
        let m = Measurer::with_width_fn(ambiguous_wide);
        let out = truncate(&text, columns, position, &m);
        prop_assert!(m.widest_line(&out) <= columns, "{:?} -> {:?}", text, out);
        prop_assert_eq!(truncate(&out, columns, position, &m), out);
    }

    #[test]
    fn truncate_idempotent(
        text in "[a-zA-Z 中文👍]{0,40}",
        columns in 0usize..30,
        position in position_strategy(),
    ) {
        let m = Measurer::new();
        let once = truncate(&text, columns, position, &m);
        prop_assert_eq!(truncate(&once, columns, position, &m), once);
    }
}

// ── Measure ─────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn measure_matches_uncached(text in text_strategy()) {
        let mut m = Measurer::new();
        let first = m.measure(&text);
        let second = m.measure(&text);
        prop_assert_eq!(first, second);
        if text.is_empty() {
            prop_assert_eq!(first.height, 0);
        } else {
            prop_assert_eq!(first.width, m.widest_line(&text));
            prop_assert_eq!(first.height, text.split('\n').count());
        }
    }
}
