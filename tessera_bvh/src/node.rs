// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat tree nodes.

use bytemuck::{Pod, Zeroable};

use crate::types::{Aabb, Axis};

/// What a [`Node`] holds besides its bounds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// A run of primitives in the permutation array.
    Leaf {
        /// Offset of the first owned slot in [`Bvh::primitives`](crate::Bvh::primitives).
        first_primitive: u32,
        /// Number of owned slots. Never zero.
        primitive_count: u32,
    },
    /// Two children stored next to each other.
    Internal {
        /// Index of the left child; the right child is `left_child + 1`.
        left_child: u32,
        /// Axis the node's primitives were partitioned along.
        axis: Axis,
    },
}

/// A node of the flat tree: bounds plus either a leaf range or a child pair.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Node {
    /// Bounds of everything below this node.
    pub aabb: Aabb,
    /// Leaf or internal payload.
    pub kind: NodeKind,
}

impl Node {
    pub(crate) const fn leaf(aabb: Aabb, first_primitive: u32, primitive_count: u32) -> Self {
        Self {
            aabb,
            kind: NodeKind::Leaf {
                first_primitive,
                primitive_count,
            },
        }
    }

    /// True for leaves.
    #[inline]
    pub const fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// Primitive count of a leaf, zero for internal nodes.
    #[inline]
    pub const fn primitive_count(&self) -> u32 {
        match self.kind {
            NodeKind::Leaf {
                primitive_count, ..
            } => primitive_count,
            NodeKind::Internal { .. } => 0,
        }
    }

    /// Indices of the left and right child of an internal node.
    #[inline]
    pub const fn children(&self) -> Option<(u32, u32)> {
        match self.kind {
            NodeKind::Internal { left_child, .. } => Some((left_child, left_child + 1)),
            NodeKind::Leaf { .. } => None,
        }
    }

    /// Pack into the 32-byte GPU layout.
    pub fn to_packed(&self) -> PackedNode {
        let (left_or_first, count) = match self.kind {
            NodeKind::Leaf {
                first_primitive,
                primitive_count,
            } => (first_primitive, primitive_count),
            NodeKind::Internal { left_child, .. } => (left_child, 0),
        };
        PackedNode {
            min: self.aabb.min.to_array(),
            left_or_first,
            max: self.aabb.max.to_array(),
            count,
        }
    }
}

/// GPU-friendly node (32 bytes).
///
/// Internal node: `left_or_first` = left child index, `count` = 0.
/// Leaf node: `left_or_first` = first primitive slot, `count` > 0.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PackedNode {
    /// Minimum corner.
    pub min: [f32; 3],
    /// Left child (internal) or first primitive slot (leaf).
    pub left_or_first: u32,
    /// Maximum corner.
    pub max: [f32; 3],
    /// Primitive count; zero marks an internal node.
    pub count: u32,
}

const _: () = assert!(size_of::<PackedNode>() == 32, "PackedNode must stay 32 bytes");
