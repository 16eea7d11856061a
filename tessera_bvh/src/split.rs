// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Binned SAH split search.
//!
//! For each axis the centroid range of a node is cut into `bin_count` equal bins.
//! Every primitive lands in the bin its centroid falls into, and each bin tracks the
//! union of its primitives' bounds and how many there are. A prefix scan from the
//! left and a suffix scan from the right then give, for each of the `bin_count - 1`
//! planes between bins, the cost
//!
//! `cost(i) = count(L_i) * area(L_i) + count(R_i) * area(R_i)`
//!
//! and the cheapest plane over all three axes wins. This is O(n + bins) per axis
//! instead of the O(n²) of trying every primitive boundary.

use glam::Vec3;

use crate::options::MAX_BINS;
use crate::source::PrimitiveSource;
use crate::types::{Aabb, Axis};

/// The best plane found for a node.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SplitCandidate {
    /// Axis the plane is perpendicular to.
    pub axis: Axis,
    /// World-space coordinate of the plane along `axis`.
    pub position: f32,
    /// SAH cost of splitting here.
    pub cost: f32,
}

#[derive(Copy, Clone, Debug, Default)]
struct Bin {
    bounds: Aabb,
    count: u32,
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "The scaled offset is non-negative and clamped to the bin range."
)]
#[inline]
fn bin_index(c: f32, lo: f32, scale: f32, bin_count: usize) -> usize {
    (((c - lo) * scale) as usize).min(bin_count - 1)
}

/// Find the cheapest binned split plane for the primitives in `primitives`.
///
/// `primitives` is the node's slice of the permutation array; entries index into
/// `source` and `centroids`. Axes whose centroids all coincide are skipped. Ties
/// keep the first candidate found, in X, Y, Z order and then by increasing plane.
/// Returns `None` when no axis offers a plane with primitives on both sides.
pub fn find_best_split<S: PrimitiveSource + ?Sized>(
    source: &S,
    primitives: &[u32],
    centroids: &[Vec3],
    bin_count: usize,
) -> Option<SplitCandidate> {
    debug_assert!(
        (2..=MAX_BINS).contains(&bin_count),
        "bin count {bin_count} out of range"
    );
    let mut best: Option<SplitCandidate> = None;

    for axis in Axis::ALL {
        let (lo, hi) = primitives
            .iter()
            .map(|&p| axis.of(centroids[p as usize]))
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), c| {
                (lo.min(c), hi.max(c))
            });
        if hi <= lo {
            continue;
        }

        let scale = bin_count as f32 / (hi - lo);
        let mut bins = [Bin::default(); MAX_BINS];
        for &p in primitives {
            let c = axis.of(centroids[p as usize]);
            let bin = &mut bins[bin_index(c, lo, scale, bin_count)];
            bin.bounds.grow(&source.bounds(p as usize));
            bin.count += 1;
        }

        // Plane `i` sits between bin `i` and bin `i + 1`.
        let planes = bin_count - 1;
        let mut left_area = [0.0_f32; MAX_BINS];
        let mut left_count = [0_u32; MAX_BINS];
        let mut acc = Aabb::EMPTY;
        let mut n = 0;
        for i in 0..planes {
            acc.grow(&bins[i].bounds);
            n += bins[i].count;
            left_area[i] = acc.surface_area();
            left_count[i] = n;
        }

        let mut right_area = [0.0_f32; MAX_BINS];
        let mut right_count = [0_u32; MAX_BINS];
        acc = Aabb::EMPTY;
        n = 0;
        for i in (1..bin_count).rev() {
            acc.grow(&bins[i].bounds);
            n += bins[i].count;
            right_area[i - 1] = acc.surface_area();
            right_count[i - 1] = n;
        }

        for i in 0..planes {
            if left_count[i] == 0 || right_count[i] == 0 {
                continue;
            }
            let cost = left_count[i] as f32 * left_area[i] + right_count[i] as f32 * right_area[i];
            if best.is_none_or(|b| cost < b.cost) {
                best = Some(SplitCandidate {
                    axis,
                    position: lo + (i + 1) as f32 * (hi - lo) / bin_count as f32,
                    cost,
                });
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn cubes_at(xs: &[f32]) -> Vec<Aabb> {
        xs.iter()
            .map(|&x| Aabb::new(Vec3::new(x, 0.0, 0.0), Vec3::new(x + 1.0, 1.0, 1.0)))
            .collect()
    }

    fn centers(boxes: &[Aabb]) -> Vec<Vec3> {
        boxes.iter().map(Aabb::center).collect()
    }

    #[test]
    fn coincident_centroids_have_no_split() {
        let boxes = cubes_at(&[3.0, 3.0, 3.0, 3.0]);
        let c = centers(&boxes);
        let prims: Vec<u32> = (0..4).collect();
        assert_eq!(find_best_split(&boxes[..], &prims, &c, 8), None);
    }

    #[test]
    fn two_clusters_split_between_them() {
        let boxes = cubes_at(&[0.0, 1.0, 2.0, 50.0, 51.0, 52.0]);
        let c = centers(&boxes);
        let prims: Vec<u32> = (0..6).collect();
        let s = find_best_split(&boxes[..], &prims, &c, 8).unwrap();
        assert_eq!(s.axis, Axis::X);
        assert!(s.position > 3.0 && s.position < 50.5, "plane at {}", s.position);
        // Left: 3 * area(3x1x1 box) = 3 * 14; right the same.
        assert_eq!(s.cost, 84.0);
    }

    #[test]
    fn only_the_listed_range_is_binned() {
        let boxes = cubes_at(&[0.0, 10.0, 20.0, 30.0]);
        let c = centers(&boxes);
        // Primitives 1 and 3 only; 0 and 2 must not influence the result.
        let s = find_best_split(&boxes[..], &[3, 1], &c, 4).unwrap();
        assert_eq!(s.axis, Axis::X);
        assert_eq!(s.cost, 12.0);
        assert!(s.position > 10.5 && s.position <= 30.5, "plane at {}", s.position);
    }

    #[test]
    fn equal_costs_keep_the_lowest_axis() {
        // Four cubes on the diagonal: every axis sees the same distribution.
        let boxes: Vec<Aabb> = (0..4)
            .map(|i| {
                let o = Vec3::splat(i as f32 * 10.0);
                Aabb::new(o, o + Vec3::ONE)
            })
            .collect();
        let c = centers(&boxes);
        let prims: Vec<u32> = (0..4).collect();
        let s = find_best_split(&boxes[..], &prims, &c, 8).unwrap();
        assert_eq!(s.axis, Axis::X);
    }

    #[test]
    fn flat_axes_are_skipped() {
        // Spread only along z.
        let boxes: Vec<Aabb> = [0.0, 5.0, 10.0]
            .iter()
            .map(|&z| Aabb::new(Vec3::new(0.0, 0.0, z), Vec3::new(1.0, 1.0, z + 1.0)))
            .collect();
        let c = centers(&boxes);
        let s = find_best_split(&boxes[..], &[0, 1, 2], &c, 8).unwrap();
        assert_eq!(s.axis, Axis::Z);
    }
}
