// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::Vec3;
use tessera_bvh::{Aabb, BuildOptions, Bvh, TriangleMesh};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f32(&mut self) -> f32 {
        let v = self.next_u64() >> 40;
        (v as f32) / ((1u64 << 24) as f32)
    }
    fn next_vec3(&mut self, scale: f32) -> Vec3 {
        Vec3::new(self.next_f32(), self.next_f32(), self.next_f32()) * scale
    }
}

fn gen_random_boxes(count: usize, extent: f32, size: f32) -> Vec<Aabb> {
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    (0..count)
        .map(|_| {
            let min = rng.next_vec3(extent);
            Aabb::new(min, min + rng.next_vec3(size) + Vec3::splat(0.01))
        })
        .collect()
}

fn gen_clustered_boxes(n_clusters: usize, per_cluster: usize, spread: f32) -> Vec<Aabb> {
    let mut rng = Rng::new(0xC1A5_7E55_9999_ABCD);
    let centers: Vec<Vec3> = (0..n_clusters).map(|_| rng.next_vec3(2000.0)).collect();
    let mut out = Vec::with_capacity(n_clusters * per_cluster);
    for c in centers {
        for _ in 0..per_cluster {
            let min = c + (rng.next_vec3(1.0) - Vec3::splat(0.5)) * spread;
            out.push(Aabb::new(min, min + Vec3::splat(12.0)));
        }
    }
    out
}

/// A `n` x `n` height-field grid: two triangles per cell, 16-bit indices when they fit.
fn gen_grid_mesh(n: usize) -> (Vec<[f32; 3]>, Vec<u32>) {
    let mut positions = Vec::with_capacity((n + 1) * (n + 1));
    for z in 0..=n {
        for x in 0..=n {
            let h = ((x as f32) * 0.3).sin() * ((z as f32) * 0.2).cos();
            positions.push([x as f32, h, z as f32]);
        }
    }
    let row = (n + 1) as u32;
    let mut indices = Vec::with_capacity(n * n * 6);
    for z in 0..n as u32 {
        for x in 0..n as u32 {
            let i = z * row + x;
            indices.extend_from_slice(&[i, i + 1, i + row, i + 1, i + row + 1, i + row]);
        }
    }
    (positions, indices)
}

fn scene_of(boxes: &[Aabb]) -> Aabb {
    boxes.iter().fold(Aabb::EMPTY, |acc, b| acc.union(b))
}

fn bench_boxes(c: &mut Criterion) {
    let mut group = c.benchmark_group("boxes");
    for &n in &[1_000usize, 10_000, 100_000] {
        let boxes = gen_random_boxes(n, 1000.0, 8.0);
        let scene = scene_of(&boxes);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("recreate_random_n{}", n), |b| {
            b.iter_batched(
                Bvh::new,
                |mut bvh| {
                    bvh.recreate_from_aabbs(&boxes, scene, None);
                    black_box(bvh.node_count());
                },
                BatchSize::LargeInput,
            )
        });
    }
    let boxes = gen_clustered_boxes(64, 256, 80.0);
    let scene = scene_of(&boxes);
    group.bench_function("recreate_clustered", |b| {
        let mut bvh = Bvh::new();
        b.iter(|| {
            bvh.recreate_from_aabbs(&boxes, scene, None);
            black_box(bvh.node_count());
        })
    });
    group.finish();
}

fn bench_mesh(c: &mut Criterion) {
    let mut group = c.benchmark_group("mesh");
    for &n in &[32usize, 128] {
        let (positions, indices) = gen_grid_mesh(n);
        let narrow: Vec<u16> = indices.iter().map(|&i| i as u16).collect();
        let wide = TriangleMesh::from_positions(&positions, &indices);
        let scene = Aabb::from_points(positions.iter().map(|&p| Vec3::from_array(p)));
        group.throughput(Throughput::Elements(wide.triangle_count() as u64));
        group.bench_function(format!("recreate_grid_u32_n{}", n), |b| {
            let mut bvh = Bvh::new();
            b.iter(|| {
                bvh.recreate_from_mesh(&wide, scene, None);
                black_box(bvh.node_count());
            })
        });
        // 129 * 129 vertices still fit in 16 bits.
        let short = TriangleMesh::from_positions_u16(&positions, &narrow);
        group.bench_function(format!("recreate_grid_u16_n{}", n), |b| {
            let mut bvh = Bvh::new();
            b.iter(|| {
                bvh.recreate_from_mesh(&short, scene, None);
                black_box(bvh.node_count());
            })
        });
    }
    group.finish();
}

fn bench_bins(c: &mut Criterion) {
    let mut group = c.benchmark_group("bins");
    let boxes = gen_random_boxes(20_000, 1000.0, 8.0);
    let scene = scene_of(&boxes);
    for &bins in &[4usize, 8, 16, 32] {
        group.bench_function(format!("recreate_bins{}", bins), |b| {
            let mut bvh = Bvh::with_options(BuildOptions::default().with_bin_count(bins));
            b.iter(|| {
                bvh.recreate_from_aabbs(&boxes, scene, None);
                black_box(bvh.sah_cost());
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_boxes, bench_mesh, bench_bins);
criterion_main!(benches);
