// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! BVH over boxes.
//!
//! Rebuild one tree over the same random boxes with different bin counts and compare
//! shape and SAH cost.
//!
//! Run:
//! - `cargo run -p tessera_demos --example bvh_boxes_stats`

use glam::Vec3;
use tessera_bvh::{Aabb, BuildOptions, Bvh};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Deterministic xorshift so runs are comparable.
    let mut state = 0x2545_F491_4F6C_DD1D_u64;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state >> 40) as f32 / (1_u64 << 24) as f32
    };

    let boxes: Vec<Aabb> = (0..5000)
        .map(|_| {
            let min = Vec3::new(next(), next(), next()) * 500.0;
            let size = Vec3::new(next(), next(), next()) * 4.0 + Vec3::splat(0.1);
            Aabb::new(min, min + size)
        })
        .collect();
    let scene = boxes.iter().fold(Aabb::EMPTY, |acc, b| acc.union(b));

    for bins in [2, 4, 8, 16, 32] {
        let mut bvh = Bvh::with_options(BuildOptions::default().with_bin_count(bins));
        bvh.recreate_from_aabbs(&boxes, scene, None);
        bvh.validate(&boxes[..]).expect("tree is consistent with its boxes");
        let stats = bvh.stats();
        println!(
            "bins={bins:>2} nodes={} leaves={} depth={} largest_leaf={} sah={:.2}",
            stats.node_count,
            stats.leaf_count,
            stats.max_depth,
            stats.max_leaf_primitives,
            bvh.sah_cost()
        );
    }
}
