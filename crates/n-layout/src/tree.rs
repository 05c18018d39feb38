// SPDX-License-Identifier: MIT
//
// Layout tree: taffy flexbox plus two-pass text reconciliation.
//
// Flexbox alone can't size wrapped text. A text node's height depends on
// where it wraps, and where it wraps depends on its container's width,
// which the flex pass is still computing. We resolve it in two passes:
//
//   1. Every text node gets its natural size (no wrapping, one row per
//      logical line) and the tree is laid out.
//   2. Any text node wider than its parent's content box (width minus
//      border and padding) is re-fit to that width through the wrap or
//      truncate engine, its intrinsic size is overwritten, and the tree
//      is laid out again.
//
// Every compute walks the whole tree from natural sizes, so computing
// twice gives the same geometry as computing once.

use n_text::measure::{Dimensions, Measurer};
use n_text::width::WidthFn;
use n_text::wrap::{wrap, wrap_text, TextWrap};
use taffy::{AvailableSpace, NodeId, Size, TaffyTree};

use crate::error::{LayoutError, Result};
use crate::style::{text_style, BoxStyle};

/// Computed geometry of a node, in cells, relative to the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: usize,
    pub height: usize,
}

/// Per-node context for text leaves.
#[derive(Debug, Clone)]
struct TextNode {
    text: String,
    wrap: TextWrap,
    /// The size reported to taffy.
    size: Dimensions,
    /// The rows the current size was measured from.
    rows: Vec<String>,
}

/// A tree of boxes and text leaves with wrap-aware layout.
///
/// ```
/// use n_layout::{BoxStyle, LayoutTree, Size};
/// use n_text::wrap::TextWrap;
/// use taffy::style_helpers::TaffyMaxContent;
///
/// let mut tree = LayoutTree::new();
/// let text = tree.new_text("Hello World", TextWrap::Wrap).unwrap();
/// let root = tree.new_box(BoxStyle::column().width(5), &[text]).unwrap();
/// tree.compute(root, Size::MAX_CONTENT).unwrap();
///
/// assert_eq!(tree.layout(text).unwrap().height, 2);
/// assert_eq!(tree.text_rows(text).unwrap(), ["Hello", "World"]);
/// ```
#[derive(Debug)]
pub struct LayoutTree {
    taffy: TaffyTree<TextNode>,
    measurer: Measurer,
    /// Every node ever created, for whole-tree invalidation.
    nodes: Vec<NodeId>,
}

impl LayoutTree {
    /// An empty tree measuring with the default width function.
    #[must_use]
    pub fn new() -> Self {
        Self::with_measurer(Measurer::new())
    }

    /// An empty tree measuring through `measurer`.
    #[must_use]
    pub fn with_measurer(measurer: Measurer) -> Self {
        Self {
            taffy: TaffyTree::new(),
            measurer,
            nodes: Vec::new(),
        }
    }

    /// The measurer used for text nodes.
    #[must_use]
    pub const fn measurer(&self) -> &Measurer {
        &self.measurer
    }

    /// Swap the width function and [`recalculate`](Self::recalculate).
    pub fn set_width_fn(&mut self, width_fn: WidthFn) -> Result<()> {
        self.measurer.set_width_fn(width_fn);
        self.recalculate()
    }

    /// Forget every cached measurement and mark every node dirty.
    ///
    /// Call after anything that changes how text measures, such as a new
    /// width function. The next [`compute`](Self::compute) lays out from
    /// scratch.
    pub fn recalculate(&mut self) -> Result<()> {
        self.measurer.invalidate();
        for &node in &self.nodes {
            self.taffy.mark_dirty(node)?;
        }
        tracing::debug!(nodes = self.nodes.len(), "layout marked for full recalculation");
        Ok(())
    }

    // ─── Building ────────────────────────────────────────────────────────

    /// A box node with `children`.
    pub fn new_box(&mut self, style: BoxStyle, children: &[NodeId]) -> Result<NodeId> {
        let node = self.taffy.new_with_children(style.to_taffy(), children)?;
        self.nodes.push(node);
        Ok(node)
    }

    /// A text leaf.
    pub fn new_text(&mut self, text: impl Into<String>, wrap: TextWrap) -> Result<NodeId> {
        let context = TextNode {
            text: text.into(),
            wrap,
            size: Dimensions::default(),
            rows: Vec::new(),
        };
        let node = self.taffy.new_leaf_with_context(text_style(), context)?;
        self.nodes.push(node);
        Ok(node)
    }

    /// Replace the content of a text node.
    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) -> Result<()> {
        let context = self
            .taffy
            .get_node_context_mut(node)
            .ok_or(LayoutError::NotAText(node))?;
        context.text = text.into();
        self.taffy.mark_dirty(node)?;
        Ok(())
    }

    /// Append `child` to `parent`.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.taffy.add_child(parent, child)?;
        Ok(())
    }

    /// Restyle a box node.
    pub fn set_style(&mut self, node: NodeId, style: BoxStyle) -> Result<()> {
        self.taffy.set_style(node, style.to_taffy())?;
        Ok(())
    }

    // ─── Layout ──────────────────────────────────────────────────────────

    /// Lay out the tree under `root` within `available` space.
    pub fn compute(&mut self, root: NodeId, available: Size<AvailableSpace>) -> Result<()> {
        let texts = self.text_nodes(root)?;

        for &node in &texts {
            self.reset_natural(node)?;
        }
        self.run_flex(root, available)?;

        let mut corrected = 0usize;
        for &node in &texts {
            let Some(limit) = self.content_width(node, root, available)? else {
                continue;
            };
            if self.refit(node, limit)? {
                corrected += 1;
            }
        }

        if corrected > 0 {
            tracing::debug!(corrected, "text nodes re-fit, running second layout pass");
            self.run_flex(root, available)?;
        }
        Ok(())
    }

    /// Geometry of `node`, relative to the root it was computed under.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn layout(&self, node: NodeId) -> Result<Rect> {
        let own = self.taffy.layout(node)?;
        let mut x = own.location.x;
        let mut y = own.location.y;
        let mut current = node;
        while let Some(parent) = self.taffy.parent(current) {
            let layout = self.taffy.layout(parent)?;
            x += layout.location.x;
            y += layout.location.y;
            current = parent;
        }
        Ok(Rect {
            x: x.round() as i32,
            y: y.round() as i32,
            width: own.size.width.round().max(0.0) as usize,
            height: own.size.height.round().max(0.0) as usize,
        })
    }

    /// The rows a text node was last laid out with.
    pub fn text_rows(&self, node: NodeId) -> Result<&[String]> {
        self.text(node).map(|t| t.rows.as_slice())
    }

    /// The content of a text node.
    pub fn text_content(&self, node: NodeId) -> Result<&str> {
        self.text(node).map(|t| t.text.as_str())
    }

    fn text(&self, node: NodeId) -> Result<&TextNode> {
        self.taffy
            .get_node_context(node)
            .ok_or(LayoutError::NotAText(node))
    }

    /// Every text leaf under `root`, depth first.
    fn text_nodes(&self, root: NodeId) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if self.taffy.get_node_context(node).is_some() {
                out.push(node);
            }
            let children = self.taffy.children(node)?;
            stack.extend(children.into_iter().rev());
        }
        Ok(out)
    }

    /// Give a text node its unwrapped size.
    fn reset_natural(&mut self, node: NodeId) -> Result<()> {
        let context = self
            .taffy
            .get_node_context(node)
            .ok_or(LayoutError::NotAText(node))?;
        let size = self.measurer.measure(&context.text);
        let rows = if context.text.is_empty() {
            Vec::new()
        } else {
            wrap(&context.text, 0, &self.measurer)
        };
        self.store(node, size, rows)
    }

    /// Re-fit a text node to `limit` columns if its natural width exceeds
    /// it. Returns whether the size changed.
    fn refit(&mut self, node: NodeId, limit: usize) -> Result<bool> {
        let context = self.text(node)?;
        if context.size.width <= limit || limit == 0 {
            return Ok(false);
        }

        let rows = wrap_text(&context.text, limit, context.wrap, &self.measurer);
        let size = Dimensions {
            width: rows
                .iter()
                .map(|row| self.measurer.widest_line(row))
                .max()
                .unwrap_or(0),
            height: rows.len(),
        };
        tracing::debug!(?node, limit, from = ?context.size, to = ?size, "text re-fit");
        self.store(node, size, rows)?;
        Ok(true)
    }

    fn store(&mut self, node: NodeId, size: Dimensions, rows: Vec<String>) -> Result<()> {
        let context = self
            .taffy
            .get_node_context_mut(node)
            .ok_or(LayoutError::NotAText(node))?;
        let changed = context.size != size;
        context.size = size;
        context.rows = rows;
        if changed {
            self.taffy.mark_dirty(node)?;
        }
        Ok(())
    }

    /// Columns available inside the parent of `node` after pass one.
    ///
    /// A text root is limited by the definite available width, if any.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn content_width(
        &self,
        node: NodeId,
        root: NodeId,
        available: Size<AvailableSpace>,
    ) -> Result<Option<usize>> {
        let parent = if node == root {
            None
        } else {
            self.taffy.parent(node)
        };
        let Some(parent) = parent else {
            return Ok(match available.width {
                AvailableSpace::Definite(w) => Some(w.floor().max(0.0) as usize),
                AvailableSpace::MinContent | AvailableSpace::MaxContent => None,
            });
        };

        let layout = self.taffy.layout(parent)?;
        let inner = layout.size.width
            - layout.border.left
            - layout.border.right
            - layout.padding.left
            - layout.padding.right;
        Ok(Some(inner.floor().max(0.0) as usize))
    }

    #[allow(clippy::cast_precision_loss)]
    fn run_flex(&mut self, root: NodeId, available: Size<AvailableSpace>) -> Result<()> {
        self.taffy.compute_layout_with_measure(
            root,
            available,
            |known, _available, _node, context, _style| {
                let Some(text) = context else {
                    return Size::ZERO;
                };
                Size {
                    width: known.width.unwrap_or(text.size.width as f32),
                    height: known.height.unwrap_or(text.size.height as f32),
                }
            },
        )?;
        Ok(())
    }
}

impl Default for LayoutTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use taffy::style_helpers::TaffyMaxContent;

    use super::*;
    use crate::style::Edges;

    fn width(w: f32) -> Size<AvailableSpace> {
        Size {
            width: AvailableSpace::Definite(w),
            height: AvailableSpace::MaxContent,
        }
    }

    #[test]
    fn text_at_natural_size_when_it_fits() {
        let mut tree = LayoutTree::new();
        let text = tree.new_text("hi", TextWrap::Wrap).unwrap();
        let root = tree.new_box(BoxStyle::row().width(10), &[text]).unwrap();
        tree.compute(root, Size::MAX_CONTENT).unwrap();

        assert_eq!(
            tree.layout(text).unwrap(),
            Rect {
                x: 0,
                y: 0,
                width: 2,
                height: 1
            }
        );
        assert_eq!(tree.text_rows(text).unwrap(), ["hi"]);
    }

    #[test]
    fn overflowing_text_wraps_to_parent() {
        let mut tree = LayoutTree::new();
        let text = tree.new_text("Hello World", TextWrap::Wrap).unwrap();
        let root = tree.new_box(BoxStyle::row().width(5), &[text]).unwrap();
        tree.compute(root, Size::MAX_CONTENT).unwrap();

        let rect = tree.layout(text).unwrap();
        assert_eq!((rect.width, rect.height), (5, 2));
        assert_eq!(tree.text_rows(text).unwrap(), ["Hello", "World"]);
        assert_eq!(tree.layout(root).unwrap().height, 2);
    }

    #[test]
    fn limit_excludes_border_and_padding() {
        let mut tree = LayoutTree::new();
        let text = tree.new_text("aaaa bbbb", TextWrap::Wrap).unwrap();
        let style = BoxStyle::column()
            .width(8)
            .border(true)
            .padding(Edges::symmetric(0, 1));
        let root = tree.new_box(style, &[text]).unwrap();
        tree.compute(root, Size::MAX_CONTENT).unwrap();

        // 8 - 2 border - 2 padding leaves 4 columns.
        assert_eq!(tree.text_rows(text).unwrap(), ["aaaa", "bbbb"]);
        let rect = tree.layout(text).unwrap();
        assert_eq!((rect.x, rect.y, rect.height), (2, 1, 2));
        assert_eq!(tree.layout(root).unwrap().height, 4);
    }

    #[test]
    fn truncate_mode_keeps_one_row() {
        let mut tree = LayoutTree::new();
        let text = tree
            .new_text("Hello World", TextWrap::Truncate(n_text::TruncatePosition::End))
            .unwrap();
        let root = tree.new_box(BoxStyle::row().width(7), &[text]).unwrap();
        tree.compute(root, Size::MAX_CONTENT).unwrap();

        assert_eq!(tree.text_rows(text).unwrap(), ["Hello …"]);
        assert_eq!(tree.layout(text).unwrap().height, 1);
    }

    #[test]
    fn taller_text_pushes_siblings_down() {
        let mut tree = LayoutTree::new();
        let first = tree.new_text("one two three", TextWrap::Wrap).unwrap();
        let second = tree.new_text("after", TextWrap::Wrap).unwrap();
        let root = tree.new_box(BoxStyle::column().width(6), &[first, second]).unwrap();
        tree.compute(root, Size::MAX_CONTENT).unwrap();

        assert_eq!(tree.text_rows(first).unwrap(), ["one", "two", "three"]);
        assert_eq!(tree.layout(second).unwrap().y, 3);
    }

    #[test]
    fn compute_is_idempotent() {
        let mut tree = LayoutTree::new();
        let text = tree.new_text("a b c d e f", TextWrap::Wrap).unwrap();
        let root = tree.new_box(BoxStyle::column().width(3), &[text]).unwrap();

        tree.compute(root, Size::MAX_CONTENT).unwrap();
        let first = (tree.layout(text).unwrap(), tree.text_rows(text).unwrap().to_vec());
        tree.compute(root, Size::MAX_CONTENT).unwrap();
        let second = (tree.layout(text).unwrap(), tree.text_rows(text).unwrap().to_vec());
        assert_eq!(first, second);
    }

    #[test]
    fn set_text_relayouts() {
        let mut tree = LayoutTree::new();
        let text = tree.new_text("short", TextWrap::Wrap).unwrap();
        let root = tree.new_box(BoxStyle::column().width(6), &[text]).unwrap();
        tree.compute(root, Size::MAX_CONTENT).unwrap();
        assert_eq!(tree.layout(text).unwrap().height, 1);

        tree.set_text(text, "much longer").unwrap();
        tree.compute(root, Size::MAX_CONTENT).unwrap();
        assert_eq!(tree.text_rows(text).unwrap(), ["much", "longer"]);
        assert_eq!(tree.text_content(text).unwrap(), "much longer");
    }

    #[test]
    fn text_ops_reject_boxes() {
        let mut tree = LayoutTree::new();
        let root = tree.new_box(BoxStyle::row(), &[]).unwrap();
        assert!(matches!(tree.set_text(root, "x"), Err(LayoutError::NotAText(n)) if n == root));
        assert!(matches!(tree.text_rows(root), Err(LayoutError::NotAText(_))));
    }

    #[test]
    fn text_root_uses_available_width() {
        let mut tree = LayoutTree::new();
        let text = tree.new_text("Hello World", TextWrap::Wrap).unwrap();
        tree.compute(text, width(5.0)).unwrap();
        assert_eq!(tree.text_rows(text).unwrap(), ["Hello", "World"]);
    }

    #[test]
    fn recalculate_picks_up_new_width_fn() {
        fn double(_: char) -> usize {
            2
        }

        let mut tree = LayoutTree::new();
        let text = tree.new_text("abc", TextWrap::Wrap).unwrap();
        let root = tree.new_box(BoxStyle::row(), &[text]).unwrap();
        tree.compute(root, Size::MAX_CONTENT).unwrap();
        assert_eq!(tree.layout(text).unwrap().width, 3);

        tree.set_width_fn(double).unwrap();
        assert_eq!(tree.measurer().cached(), 0);
        tree.compute(root, Size::MAX_CONTENT).unwrap();
        assert_eq!(tree.layout(text).unwrap().width, 6);
    }

    #[test]
    fn add_child_appends() {
        let mut tree = LayoutTree::new();
        let a = tree.new_text("a", TextWrap::Wrap).unwrap();
        let b = tree.new_text("bb", TextWrap::Wrap).unwrap();
        let root = tree.new_box(BoxStyle::row().gap(1), &[a]).unwrap();
        tree.add_child(root, b).unwrap();
        tree.compute(root, Size::MAX_CONTENT).unwrap();
        assert_eq!(tree.layout(b).unwrap().x, 2);
        assert_eq!(tree.layout(root).unwrap().width, 4);
    }
}
