// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree statistics and structural validation.

use alloc::vec;

use crate::bvh::Bvh;
use crate::error::ValidationError;
use crate::node::NodeKind;
use crate::source::PrimitiveSource;

/// Shape summary of a built tree.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BvhStats {
    /// Total nodes.
    pub node_count: usize,
    /// Leaf nodes.
    pub leaf_count: usize,
    /// Depth of the deepest leaf; the root is at depth 0.
    pub max_depth: usize,
    /// Largest primitive count of any leaf.
    pub max_leaf_primitives: u32,
}

impl Bvh {
    /// Count nodes and leaves and measure depth.
    pub fn stats(&self) -> BvhStats {
        let mut stats = BvhStats {
            node_count: self.nodes().len(),
            ..BvhStats::default()
        };
        if self.is_empty() {
            return stats;
        }
        let mut stack = vec![(0_u32, 0_usize)];
        while let Some((i, depth)) = stack.pop() {
            let node = &self.nodes()[i as usize];
            match node.kind {
                NodeKind::Leaf {
                    primitive_count, ..
                } => {
                    stats.leaf_count += 1;
                    stats.max_depth = stats.max_depth.max(depth);
                    stats.max_leaf_primitives = stats.max_leaf_primitives.max(primitive_count);
                }
                NodeKind::Internal { left_child, .. } => {
                    stack.push((left_child, depth + 1));
                    stack.push((left_child + 1, depth + 1));
                }
            }
        }
        stats
    }

    /// SAH cost of the whole tree relative to the root: every internal node costs its
    /// area, every leaf its area times its primitive count. Lower is better.
    pub fn sah_cost(&self) -> f32 {
        let Some(root) = self.root() else {
            return 0.0;
        };
        let root_area = root.aabb.surface_area();
        if root_area <= 0.0 {
            return 0.0;
        }
        let total: f32 = self
            .nodes()
            .iter()
            .map(|n| match n.kind {
                NodeKind::Leaf {
                    primitive_count, ..
                } => n.aabb.surface_area() * primitive_count as f32,
                NodeKind::Internal { .. } => n.aabb.surface_area(),
            })
            .sum();
        total / root_area
    }

    /// Check the tree against the geometry it was built from.
    ///
    /// Verifies that every primitive is owned by exactly one leaf, that leaf bounds
    /// contain their primitives and parent bounds contain their children, that child
    /// links point forward to a valid pair, that the node count stays within
    /// `2 * primitive_count - 1`, and that no non-root node was split while holding
    /// [`BuildOptions::min_split_primitives`](crate::BuildOptions::min_split_primitives)
    /// primitives or fewer.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Node and primitive indices are 32-bit in the node layout."
    )]
    pub fn validate<S: PrimitiveSource + ?Sized>(&self, source: &S) -> Result<(), ValidationError> {
        let nodes = self.nodes();
        let primitives = self.primitives().len();
        if nodes.is_empty() {
            return Ok(());
        }
        if nodes.len() > (2 * primitives).saturating_sub(1) {
            return Err(ValidationError::TooManyNodes {
                nodes: nodes.len(),
                primitives,
            });
        }

        let mut seen = vec![false; primitives];
        let mut stack = vec![0_u32];
        while let Some(index) = stack.pop() {
            let node = &nodes[index as usize];
            match node.kind {
                NodeKind::Leaf {
                    first_primitive,
                    primitive_count,
                } => {
                    let first = first_primitive as usize;
                    let last = first + primitive_count as usize;
                    if primitive_count == 0 || last > primitives {
                        return Err(ValidationError::EmptyLeaf { node: index });
                    }
                    for &p in &self.primitives()[first..last] {
                        let Some(slot) = seen.get_mut(p as usize) else {
                            return Err(ValidationError::EmptyLeaf { node: index });
                        };
                        if *slot {
                            return Err(ValidationError::DuplicatePrimitive { primitive: p });
                        }
                        *slot = true;
                        if !node.aabb.contains_aabb(&source.bounds(p as usize)) {
                            return Err(ValidationError::LeafBoundsTooSmall {
                                node: index,
                                primitive: p,
                            });
                        }
                    }
                }
                NodeKind::Internal { left_child, .. } => {
                    if left_child <= index || left_child as usize + 1 >= nodes.len() {
                        return Err(ValidationError::BadChildIndex {
                            node: index,
                            left: left_child,
                        });
                    }
                    for child in [left_child, left_child + 1] {
                        if !node.aabb.contains_aabb(&nodes[child as usize].aabb) {
                            return Err(ValidationError::ChildBoundsEscapeParent {
                                parent: index,
                                child,
                            });
                        }
                        stack.push(child);
                    }
                }
            }
        }

        if let Some(missing) = seen.iter().position(|s| !s) {
            return Err(ValidationError::MissingPrimitive {
                primitive: missing as u32,
            });
        }

        // Children always follow their parent, so a reverse sweep sees them first.
        let floor = self.options().min_split_primitives;
        let mut under = vec![0_u32; nodes.len()];
        for (i, node) in nodes.iter().enumerate().rev() {
            under[i] = match node.kind {
                NodeKind::Leaf {
                    primitive_count, ..
                } => primitive_count,
                NodeKind::Internal { left_child, .. } => {
                    under[left_child as usize] + under[left_child as usize + 1]
                }
            };
            if i != 0 && !node.is_leaf() && under[i] <= floor {
                return Err(ValidationError::UnderfilledSplit {
                    node: i as u32,
                    primitives: under[i],
                });
            }
        }
        Ok(())
    }
}
