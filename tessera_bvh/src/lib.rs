// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tessera BVH: a binned-SAH bounding volume hierarchy builder.
//!
//! Tessera BVH builds a static binary tree of axis-aligned boxes over a fixed set of
//! primitives, for ray tracers, collision and culling code to traverse.
//!
//! - Accepts an indexed [`TriangleMesh`] (arbitrary vertex stride, 16- or 32-bit
//!   indices) or a slice of [`Aabb`]s, one per primitive.
//! - Splits top-down with a binned Surface Area Heuristic and stops where keeping a
//!   node as a leaf is no more expensive than splitting it.
//! - Stores the result as a flat [`Node`] array plus a permutation of primitive
//!   indices, so source geometry is never moved.
//!
//! The build is iterative: pending nodes live on an explicit stack rather than the
//! call stack, so pathological inputs cannot overflow it. Builds are deterministic;
//! the same input always produces the same node array.
//!
//! # Example
//!
//! ```rust
//! use glam::Vec3;
//! use tessera_bvh::{Aabb, Bvh, NodeKind, TriangleMesh};
//!
//! // Three triangles spread along x.
//! let positions: Vec<[f32; 3]> = (0..3)
//!     .flat_map(|i| {
//!         let x = i as f32 * 10.0;
//!         [[x, 0.0, 0.0], [x + 1.0, 0.0, 0.0], [x, 1.0, 0.0]]
//!     })
//!     .collect();
//! let indices: Vec<u32> = (0..9).collect();
//! let mesh = TriangleMesh::from_positions(&positions, &indices);
//! let scene = Aabb::new(Vec3::ZERO, Vec3::new(21.0, 1.0, 0.0));
//!
//! let bvh = Bvh::from_mesh(&mesh, scene, None);
//! assert!(matches!(bvh.root().unwrap().kind, NodeKind::Internal { .. }));
//! assert!(bvh.validate(&mesh).is_ok());
//!
//! // Every triangle ends up in exactly one leaf.
//! let mut seen: Vec<u32> = bvh
//!     .nodes()
//!     .iter()
//!     .flat_map(|n| bvh.leaf_primitives(n).iter().copied())
//!     .collect();
//! seen.sort();
//! assert_eq!(seen, vec![0, 1, 2]);
//! ```
//!
//! ## Tuning
//!
//! [`BuildOptions`] controls the number of bins per axis (default 8) and the leaf
//! floor: children with that many primitives or fewer (default 2) are not split further.
//!
//! ```rust
//! use tessera_bvh::{BuildOptions, Bvh};
//!
//! let bvh = Bvh::with_options(BuildOptions::default().with_bin_count(16));
//! assert_eq!(bvh.options().bin_count, 16);
//! assert!(bvh.is_empty());
//! ```
//!
//! ### Float semantics
//!
//! Inputs are assumed finite (no NaNs). Contract violations such as empty inputs or
//! a centroid slice of the wrong length are checked with debug assertions only.

#![no_std]

extern crate alloc;

pub mod bvh;
pub mod diagnostics;
pub mod error;
pub mod node;
pub mod options;
pub mod source;
pub mod split;
pub mod types;

pub use bvh::Bvh;
pub use diagnostics::BvhStats;
pub use error::{UnsupportedIndexWidth, ValidationError};
pub use node::{Node, NodeKind, PackedNode};
pub use options::{BuildOptions, MAX_BINS};
pub use source::{IndexFormat, PrimitiveSource, TriangleMesh};
pub use split::SplitCandidate;
pub use types::{Aabb, Axis};
