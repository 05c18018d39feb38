// SPDX-License-Identifier: MIT
//
// n-layout — flexbox layout with wrap-aware text for terminal UIs.
//
// Box geometry comes from taffy. Text leaves are measured with n-text and
// re-fit to their container in a second pass, so a paragraph inside a
// 40-column box gets the height of its wrapped rows, not of one long line.

pub mod error;
pub mod style;
pub mod tree;

pub use error::{LayoutError, Result};
pub use style::{BoxStyle, Edges};
pub use tree::{LayoutTree, Rect};

pub use taffy::{AvailableSpace, FlexDirection, NodeId, Size};
