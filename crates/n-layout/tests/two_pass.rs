// SPDX-License-Identifier: MIT
//
// End-to-end layout of nested boxes with wrapped and truncated text.

use n_layout::{BoxStyle, Edges, LayoutTree, NodeId, Rect, Size};
use taffy::style_helpers::TaffyMaxContent;
use n_text::wrap::TextWrap;
use n_text::TruncatePosition;
use pretty_assertions::assert_eq;

/// A bordered card holding a title (truncated) and a body (wrapped).
fn card(tree: &mut LayoutTree, width: u16) -> (NodeId, NodeId, NodeId) {
    let title = tree
        .new_text("A rather long card title", TextWrap::Truncate(TruncatePosition::End))
        .unwrap();
    let body = tree
        .new_text("the quick brown fox jumps over the lazy dog", TextWrap::Wrap)
        .unwrap();
    let style = BoxStyle::column()
        .width(width)
        .border(true)
        .padding(Edges::symmetric(0, 1));
    let card = tree.new_box(style, &[title, body]).unwrap();
    (card, title, body)
}

#[test]
fn card_layout() {
    let mut tree = LayoutTree::new();
    let (root, title, body) = card(&mut tree, 16);
    tree.compute(root, Size::MAX_CONTENT).unwrap();

    // 16 wide, minus two border and two padding cells.
    assert_eq!(tree.text_rows(title).unwrap(), ["A rather lo…"]);
    assert_eq!(
        tree.text_rows(body).unwrap(),
        ["the quick", "brown fox", "jumps over", "the lazy dog"]
    );
    assert_eq!(
        tree.layout(body).unwrap(),
        Rect {
            x: 2,
            y: 2,
            width: 12,
            height: 4
        }
    );
    // Border + title + body + border.
    assert_eq!(tree.layout(root).unwrap().height, 7);
}

#[test]
fn nested_positions_are_absolute() {
    let mut tree = LayoutTree::new();
    let (inner, _, body) = card(&mut tree, 16);
    let label = tree.new_text("side", TextWrap::Wrap).unwrap();
    let outer = tree
        .new_box(BoxStyle::row().gap(1).padding(Edges::all(1)), &[label, inner])
        .unwrap();
    tree.compute(outer, Size::MAX_CONTENT).unwrap();

    // Padding 1, "side" 4, gap 1: the card starts at column 6.
    assert_eq!(tree.layout(inner).unwrap().x, 6);
    let body = tree.layout(body).unwrap();
    assert_eq!((body.x, body.y), (8, 3));
}

#[test]
fn repeated_compute_converges_at_every_width() {
    for width in 4..30 {
        let mut tree = LayoutTree::new();
        let (root, title, body) = card(&mut tree, width);

        tree.compute(root, Size::MAX_CONTENT).unwrap();
        let once = [tree.layout(root).unwrap(), tree.layout(title).unwrap(), tree.layout(body).unwrap()];
        let rows = tree.text_rows(body).unwrap().to_vec();

        tree.compute(root, Size::MAX_CONTENT).unwrap();
        let twice = [tree.layout(root).unwrap(), tree.layout(title).unwrap(), tree.layout(body).unwrap()];

        assert_eq!(once, twice, "width {width}");
        assert_eq!(rows, tree.text_rows(body).unwrap(), "width {width}");
    }
}

#[test]
fn wrapped_rows_fit_the_card() {
    let measurer = n_text::Measurer::new();
    for width in 5..30 {
        let mut tree = LayoutTree::new();
        let (root, _, body) = card(&mut tree, width);
        tree.compute(root, Size::MAX_CONTENT).unwrap();

        let limit = usize::from(width) - 4;
        for row in tree.text_rows(body).unwrap() {
            assert!(measurer.widest_line(row) <= limit, "{row:?} at width {width}");
        }
    }
}
