// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`Bvh`] builder: owned node/primitive/centroid arrays and the build loop.

use alloc::vec::Vec;

use glam::Vec3;

use crate::node::{Node, NodeKind, PackedNode};
use crate::options::BuildOptions;
use crate::source::{IndexFormat, PrimitiveSource, TriangleMesh, U16Indices, U32Indices};
use crate::split::find_best_split;
use crate::types::Aabb;

/// A bounding volume hierarchy over a fixed primitive set.
///
/// The tree is stored as a flat node array with the root at index 0. Leaves refer to
/// contiguous runs of [`Bvh::primitives`], a permutation of the original primitive
/// indices, so source geometry never moves.
#[derive(Clone, Debug, Default)]
pub struct Bvh {
    options: BuildOptions,
    nodes: Vec<Node>,
    primitives: Vec<u32>,
    centroids: Vec<Vec3>,
    stack: Vec<u32>,
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "Primitive and node counts are 32-bit in the node layout."
)]
#[inline]
const fn to_u32(n: usize) -> u32 {
    n as u32
}

impl Bvh {
    /// Create an empty tree with default [`BuildOptions`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty tree that builds with `options`.
    pub fn with_options(options: BuildOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Build a tree over a triangle mesh.
    pub fn from_mesh(mesh: &TriangleMesh<'_>, scene: Aabb, centroids: Option<&[Vec3]>) -> Self {
        let mut bvh = Self::new();
        bvh.recreate_from_mesh(mesh, scene, centroids);
        bvh
    }

    /// Build a tree over one box per primitive.
    pub fn from_aabbs(aabbs: &[Aabb], scene: Aabb, centroids: Option<&[Vec3]>) -> Self {
        let mut bvh = Self::new();
        bvh.recreate_from_aabbs(aabbs, scene, centroids);
        bvh
    }

    /// Options used by subsequent builds.
    pub const fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Rebuild over the triangles of `mesh`.
    ///
    /// See [`Bvh::recreate`] for the meaning of `scene` and `centroids`.
    pub fn recreate_from_mesh(
        &mut self,
        mesh: &TriangleMesh<'_>,
        scene: Aabb,
        centroids: Option<&[Vec3]>,
    ) {
        match mesh.index_format() {
            IndexFormat::U16 => self.recreate(&mesh.source::<U16Indices>(), scene, centroids),
            IndexFormat::U32 => self.recreate(&mesh.source::<U32Indices>(), scene, centroids),
        }
    }

    /// Rebuild over one box per primitive.
    ///
    /// See [`Bvh::recreate`] for the meaning of `scene` and `centroids`.
    pub fn recreate_from_aabbs(
        &mut self,
        aabbs: &[Aabb],
        scene: Aabb,
        centroids: Option<&[Vec3]>,
    ) {
        self.recreate(aabbs, scene, centroids);
    }

    /// Throw away the current tree and build a new one over `source`.
    ///
    /// `scene` becomes the root's bounds and should contain every primitive.
    /// `centroids`, if given, must hold one point per primitive and replaces the
    /// centroids `source` would compute.
    pub fn recreate<S: PrimitiveSource + ?Sized>(
        &mut self,
        source: &S,
        scene: Aabb,
        centroids: Option<&[Vec3]>,
    ) {
        let count = source.len();
        debug_assert!(count > 0, "cannot build a tree over zero primitives");
        debug_assert!(
            u32::try_from(count).is_ok(),
            "{count} primitives exceed the 32-bit node layout"
        );

        self.nodes.clear();
        self.primitives.clear();
        self.centroids.clear();
        self.stack.clear();
        if count == 0 {
            return;
        }

        self.nodes.reserve(2 * count - 1);
        self.primitives.extend(0..to_u32(count));
        match centroids {
            Some(c) => {
                debug_assert_eq!(c.len(), count, "one centroid per primitive is required");
                self.centroids.extend_from_slice(c);
            }
            None => self.centroids.extend((0..count).map(|i| source.centroid(i))),
        }

        self.nodes.push(Node::leaf(scene, 0, to_u32(count)));
        self.build(source);

        self.nodes.shrink_to_fit();
        tracing::debug!(
            primitives = count,
            nodes = self.nodes.len(),
            leaves = self.nodes.iter().filter(|n| n.is_leaf()).count(),
            "built bvh"
        );
    }

    fn build<S: PrimitiveSource + ?Sized>(&mut self, source: &S) {
        let bin_count = self.options.effective_bin_count();
        let floor = self.options.min_split_primitives;
        let mut current = Some(0_u32);

        while let Some(node_index) = current {
            current = match self.split_node(source, node_index, bin_count) {
                Some((left, right)) => {
                    // Continue into the larger child and defer the smaller one.
                    let (big, small) = if self.leaf_count(right) > self.leaf_count(left) {
                        (right, left)
                    } else {
                        (left, right)
                    };
                    if self.leaf_count(small) > floor {
                        self.stack.push(small);
                    }
                    if self.leaf_count(big) > floor {
                        Some(big)
                    } else {
                        self.stack.pop()
                    }
                }
                None => self.stack.pop(),
            };
        }
    }

    fn leaf_count(&self, node: u32) -> u32 {
        self.nodes[node as usize].primitive_count()
    }

    /// Try to split leaf `node_index` in two. Returns the new children on success;
    /// otherwise the node stays a leaf.
    fn split_node<S: PrimitiveSource + ?Sized>(
        &mut self,
        source: &S,
        node_index: u32,
        bin_count: usize,
    ) -> Option<(u32, u32)> {
        let node = self.nodes[node_index as usize];
        let NodeKind::Leaf {
            first_primitive,
            primitive_count,
        } = node.kind
        else {
            return None;
        };
        let first = first_primitive as usize;
        let last = first + primitive_count as usize;

        let split = find_best_split(
            source,
            &self.primitives[first..last],
            &self.centroids,
            bin_count,
        )?;
        let leaf_cost = node.aabb.surface_area() * primitive_count as f32;
        if split.cost >= leaf_cost {
            tracing::trace!(
                node = node_index,
                split_cost = split.cost,
                leaf_cost,
                "split not worthwhile"
            );
            return None;
        }

        // Centroids left of the plane stay in front; the rest are swapped to the back.
        let mut i = first;
        let mut j = last;
        while i < j {
            let p = self.primitives[i] as usize;
            if split.axis.of(self.centroids[p]) < split.position {
                i += 1;
            } else {
                j -= 1;
                self.primitives.swap(i, j);
            }
        }
        let left_count = i - first;
        if left_count == 0 || left_count == primitive_count as usize {
            tracing::trace!(node = node_index, "degenerate partition");
            return None;
        }

        let left = to_u32(self.nodes.len());
        let left_node = Node::leaf(
            self.range_bounds(source, first..i),
            first_primitive,
            to_u32(left_count),
        );
        let right_node = Node::leaf(
            self.range_bounds(source, i..last),
            to_u32(i),
            primitive_count - to_u32(left_count),
        );
        self.nodes.push(left_node);
        self.nodes.push(right_node);
        self.nodes[node_index as usize].kind = NodeKind::Internal {
            left_child: left,
            axis: split.axis,
        };
        Some((left, left + 1))
    }

    /// Exact bounds of the primitives in a slot range of the permutation array.
    fn range_bounds<S: PrimitiveSource + ?Sized>(
        &self,
        source: &S,
        slots: core::ops::Range<usize>,
    ) -> Aabb {
        self.primitives[slots]
            .iter()
            .fold(Aabb::EMPTY, |acc, &p| acc.union(&source.bounds(p as usize)))
    }

    /// The flat node array; index 0 is the root.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The primitive permutation. Leaf ranges index into this.
    pub fn primitives(&self) -> &[u32] {
        &self.primitives
    }

    /// One centroid per original primitive.
    pub fn centroids(&self) -> &[Vec3] {
        &self.centroids
    }

    /// The root node, if a tree has been built.
    pub fn root(&self) -> Option<&Node> {
        self.nodes.first()
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of primitives the tree was built over.
    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    /// True if no tree has been built.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Original primitive indices owned by a leaf. Empty for internal nodes.
    pub fn leaf_primitives(&self, node: &Node) -> &[u32] {
        match node.kind {
            NodeKind::Leaf {
                first_primitive,
                primitive_count,
            } => {
                let first = first_primitive as usize;
                &self.primitives[first..first + primitive_count as usize]
            }
            NodeKind::Internal { .. } => &[],
        }
    }

    /// The node array in the 32-byte GPU layout.
    pub fn packed_nodes(&self) -> Vec<PackedNode> {
        self.nodes.iter().map(Node::to_packed).collect()
    }
}
