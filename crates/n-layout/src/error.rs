// SPDX-License-Identifier: MIT
//
// Errors from the layout bridge.

use taffy::NodeId;

/// Everything that can go wrong while building or laying out a tree.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// The flexbox engine rejected an operation (unknown node, bad child
    /// index, ...).
    #[error("layout engine: {0}")]
    Taffy(#[from] taffy::TaffyError),

    /// A text operation was given a box node.
    #[error("node {0:?} is not a text node")]
    NotAText(NodeId),
}

/// Result alias for layout operations.
pub type Result<T> = std::result::Result<T, LayoutError>;
