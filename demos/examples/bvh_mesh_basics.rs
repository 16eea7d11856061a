// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! BVH mesh basics.
//!
//! Build a tree over an interleaved triangle mesh, walk its leaves, and pack it for upload.
//!
//! Run:
//! - `RUST_LOG=tessera_bvh=debug cargo run -p tessera_demos --example bvh_mesh_basics`

use glam::Vec3;
use tessera_bvh::{Aabb, Bvh, IndexFormat, NodeKind, PrimitiveSource, TriangleMesh};
use tracing_subscriber::EnvFilter;

/// Position followed by a normal, as a renderer's vertex buffer would hold it.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // A strip of quads along x, two triangles each.
    let quads = 16_u16;
    let mut vertices = Vec::new();
    for i in 0..=quads {
        let x = f32::from(i) * 2.0;
        for y in [0.0, 1.0] {
            vertices.push(Vertex {
                position: [x, y, (x * 0.25).sin()],
                normal: [0.0, 0.0, 1.0],
            });
        }
    }
    let mut indices: Vec<u16> = Vec::new();
    for q in 0..quads {
        let i = q * 2;
        indices.extend_from_slice(&[i, i + 2, i + 1, i + 1, i + 2, i + 3]);
    }

    let format = IndexFormat::from_byte_width(size_of::<u16>()).expect("16-bit indices");
    let mesh = TriangleMesh::new(
        bytemuck::cast_slice(&vertices),
        size_of::<Vertex>(),
        bytemuck::cast_slice(&indices),
        format,
    );
    let scene = (0..mesh.len()).fold(Aabb::EMPTY, |acc, t| acc.union(&mesh.bounds(t)));

    let bvh = Bvh::from_mesh(&mesh, scene, None);
    bvh.validate(&mesh).expect("tree is consistent with its mesh");

    println!("{} triangles, {:?}", mesh.len(), bvh.stats());
    for (i, node) in bvh.nodes().iter().enumerate() {
        match node.kind {
            NodeKind::Leaf { .. } => println!(
                "node {i}: leaf {:?} triangles {:?}",
                node.aabb.center(),
                bvh.leaf_primitives(node)
            ),
            NodeKind::Internal { left_child, axis } => {
                println!("node {i}: split on {axis:?} -> {left_child}, {}", left_child + 1);
            }
        }
    }

    let packed = bvh.packed_nodes();
    let bytes: &[u8] = bytemuck::cast_slice(&packed);
    println!("packed {} nodes into {} bytes", packed.len(), bytes.len());
    println!("centroid of triangle 0: {}", bvh.centroids()[0]);
    assert!(scene.contains_point(Vec3::from_array(vertices[0].position)));
}
