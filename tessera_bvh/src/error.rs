// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use thiserror::Error;

/// An index buffer element width other than 2 or 4 bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
#[error("unsupported index width: {0} bytes (expected 2 or 4)")]
pub struct UnsupportedIndexWidth(pub usize);

/// A structural defect reported by [`Bvh::validate`](crate::Bvh::validate).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A primitive is referenced by more than one leaf slot.
    #[error("primitive {primitive} appears in more than one leaf")]
    DuplicatePrimitive {
        /// Original primitive index.
        primitive: u32,
    },
    /// A primitive is not reachable from any leaf.
    #[error("primitive {primitive} is not reachable from any leaf")]
    MissingPrimitive {
        /// Original primitive index.
        primitive: u32,
    },
    /// A leaf's stored box does not contain one of its primitives.
    #[error("leaf node {node} does not contain primitive {primitive}")]
    LeafBoundsTooSmall {
        /// Node index of the leaf.
        node: u32,
        /// Original primitive index.
        primitive: u32,
    },
    /// A child's box leaks out of its parent's box.
    #[error("child node {child} is not contained in parent node {parent}")]
    ChildBoundsEscapeParent {
        /// Parent node index.
        parent: u32,
        /// Offending child node index.
        child: u32,
    },
    /// An internal node points at an invalid child pair.
    #[error("internal node {node} has invalid left child {left}")]
    BadChildIndex {
        /// Internal node index.
        node: u32,
        /// Stored left child index.
        left: u32,
    },
    /// A leaf owns no primitives or a range past the permutation array.
    #[error("leaf node {node} has an empty or out-of-range primitive range")]
    EmptyLeaf {
        /// Node index of the leaf.
        node: u32,
    },
    /// The node array exceeds `2 * primitive_count - 1` entries.
    #[error("{nodes} nodes exceed the limit for {primitives} primitives")]
    TooManyNodes {
        /// Number of nodes in the tree.
        nodes: usize,
        /// Number of primitives in the tree.
        primitives: usize,
    },
    /// A non-root internal node was split while holding too few primitives.
    #[error("internal node {node} was split with only {primitives} primitives")]
    UnderfilledSplit {
        /// Internal node index.
        node: u32,
        /// Primitives under the node.
        primitives: u32,
    },
}
