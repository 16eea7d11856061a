// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive sources the builder reads geometry from.
//!
//! Two kinds of input are supported out of the box:
//!
//! - A slice of [`Aabb`]s, one per primitive.
//! - An indexed [`TriangleMesh`] over raw byte buffers with arbitrary vertex stride
//!   and 16- or 32-bit indices.
//!
//! Anything else can be fed to [`Bvh::recreate`](crate::Bvh::recreate) by implementing
//! [`PrimitiveSource`].

use core::fmt::Debug;
use core::marker::PhantomData;

use glam::Vec3;

use crate::error::UnsupportedIndexWidth;
use crate::types::Aabb;

/// Size in bytes of a vertex position (`[f32; 3]`).
pub const POSITION_SIZE: usize = 12;

/// Geometry provider abstraction used by the builder.
pub trait PrimitiveSource {
    /// Number of primitives.
    fn len(&self) -> usize;

    /// True if there are no primitives.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Exact bounds of primitive `primitive`.
    fn bounds(&self, primitive: usize) -> Aabb;

    /// Representative point of primitive `primitive`, used to pick a split side.
    fn centroid(&self, primitive: usize) -> Vec3;
}

impl PrimitiveSource for [Aabb] {
    #[inline]
    fn len(&self) -> usize {
        <[Aabb]>::len(self)
    }

    #[inline]
    fn bounds(&self, primitive: usize) -> Aabb {
        self[primitive]
    }

    #[inline]
    fn centroid(&self, primitive: usize) -> Vec3 {
        self[primitive].center()
    }
}

/// Element width of an index buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    /// 16-bit indices.
    U16,
    /// 32-bit indices.
    U32,
}

impl IndexFormat {
    /// Size of one index in bytes.
    pub const fn byte_width(self) -> usize {
        match self {
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }

    /// Map an index byte width to a format. Only 2 and 4 are supported.
    pub const fn from_byte_width(width: usize) -> Result<Self, UnsupportedIndexWidth> {
        match width {
            2 => Ok(Self::U16),
            4 => Ok(Self::U32),
            other => Err(UnsupportedIndexWidth(other)),
        }
    }
}

/// Reads one index of a fixed width out of a byte buffer.
///
/// Implemented by [`U16Indices`] and [`U32Indices`] so the builder's inner loops are
/// monomorphised per width instead of branching on every fetch.
pub trait IndexReader: Debug {
    /// Width of one index in bytes.
    const WIDTH: usize;

    /// Read the `i`th index of `bytes`.
    fn read(bytes: &[u8], i: usize) -> usize;
}

/// Native-endian 16-bit index reader.
#[derive(Copy, Clone, Debug)]
pub struct U16Indices;

impl IndexReader for U16Indices {
    const WIDTH: usize = 2;

    #[inline]
    fn read(bytes: &[u8], i: usize) -> usize {
        let at = i * Self::WIDTH;
        usize::from(bytemuck::pod_read_unaligned::<u16>(&bytes[at..at + Self::WIDTH]))
    }
}

/// Native-endian 32-bit index reader.
#[derive(Copy, Clone, Debug)]
pub struct U32Indices;

impl IndexReader for U32Indices {
    const WIDTH: usize = 4;

    #[inline]
    fn read(bytes: &[u8], i: usize) -> usize {
        let at = i * Self::WIDTH;
        bytemuck::pod_read_unaligned::<u32>(&bytes[at..at + Self::WIDTH]) as usize
    }
}

/// An indexed triangle list over raw vertex and index buffers.
///
/// Each vertex element is `vertex_stride` bytes wide and begins with an `{x, y, z}`
/// `f32` position; any interleaved attributes after it are ignored. Every three
/// consecutive indices form one triangle.
#[derive(Copy, Clone, Debug)]
pub struct TriangleMesh<'a> {
    vertices: &'a [u8],
    vertex_stride: usize,
    indices: &'a [u8],
    index_format: IndexFormat,
}

impl<'a> TriangleMesh<'a> {
    /// Describe a mesh over raw buffers.
    ///
    /// The index count (`indices.len() / index_format.byte_width()`) must be a positive
    /// multiple of three and `vertex_stride` must hold at least a position. Both are
    /// checked in debug builds only.
    pub fn new(
        vertices: &'a [u8],
        vertex_stride: usize,
        indices: &'a [u8],
        index_format: IndexFormat,
    ) -> Self {
        debug_assert!(
            vertex_stride >= POSITION_SIZE,
            "vertex stride {vertex_stride} cannot hold a position"
        );
        debug_assert!(!vertices.is_empty(), "vertex buffer is empty");
        debug_assert!(
            indices.len() % index_format.byte_width() == 0,
            "index buffer length is not a whole number of indices"
        );
        let index_count = indices.len() / index_format.byte_width();
        debug_assert!(
            index_count > 0 && index_count % 3 == 0,
            "index count {index_count} is not a positive multiple of 3"
        );
        Self {
            vertices,
            vertex_stride,
            indices,
            index_format,
        }
    }

    /// A mesh over tightly packed positions and 32-bit indices.
    pub fn from_positions(positions: &'a [[f32; 3]], indices: &'a [u32]) -> Self {
        Self::new(
            bytemuck::cast_slice(positions),
            POSITION_SIZE,
            bytemuck::cast_slice(indices),
            IndexFormat::U32,
        )
    }

    /// A mesh over tightly packed positions and 16-bit indices.
    pub fn from_positions_u16(positions: &'a [[f32; 3]], indices: &'a [u16]) -> Self {
        Self::new(
            bytemuck::cast_slice(positions),
            POSITION_SIZE,
            bytemuck::cast_slice(indices),
            IndexFormat::U16,
        )
    }

    /// Width of the index buffer's elements.
    pub const fn index_format(&self) -> IndexFormat {
        self.index_format
    }

    /// Number of indices in the index buffer.
    pub const fn index_count(&self) -> usize {
        self.indices.len() / self.index_format.byte_width()
    }

    /// Number of triangles.
    pub const fn triangle_count(&self) -> usize {
        self.index_count() / 3
    }

    /// Position of vertex `vertex`.
    #[inline]
    pub fn position(&self, vertex: usize) -> Vec3 {
        let at = vertex * self.vertex_stride;
        Vec3::from_array(bytemuck::pod_read_unaligned(
            &self.vertices[at..at + POSITION_SIZE],
        ))
    }

    /// The three corner positions of `triangle`, reading indices with `R`.
    #[inline]
    pub fn triangle_with<R: IndexReader>(&self, triangle: usize) -> [Vec3; 3] {
        let base = triangle * 3;
        [0, 1, 2].map(|k| self.position(R::read(self.indices, base + k)))
    }

    /// The three corner positions of `triangle`.
    pub fn triangle(&self, triangle: usize) -> [Vec3; 3] {
        match self.index_format {
            IndexFormat::U16 => self.triangle_with::<U16Indices>(triangle),
            IndexFormat::U32 => self.triangle_with::<U32Indices>(triangle),
        }
    }

    /// View this mesh as a primitive source with a fixed index reader.
    ///
    /// `R::WIDTH` must match [`TriangleMesh::index_format`].
    pub fn source<R: IndexReader>(&self) -> MeshSource<'_, 'a, R> {
        debug_assert_eq!(
            R::WIDTH,
            self.index_format.byte_width(),
            "index reader does not match the mesh's index format"
        );
        MeshSource {
            mesh: self,
            _reader: PhantomData,
        }
    }
}

/// Triangle bounds: the box over the three corners.
#[inline]
fn triangle_bounds([a, b, c]: [Vec3; 3]) -> Aabb {
    Aabb::new(a.min(b).min(c), a.max(b).max(c))
}

/// Triangle centroid: the average of the three corners.
#[inline]
fn triangle_centroid([a, b, c]: [Vec3; 3]) -> Vec3 {
    (a + b + c) / 3.0
}

impl PrimitiveSource for TriangleMesh<'_> {
    fn len(&self) -> usize {
        self.triangle_count()
    }

    fn bounds(&self, primitive: usize) -> Aabb {
        triangle_bounds(self.triangle(primitive))
    }

    fn centroid(&self, primitive: usize) -> Vec3 {
        triangle_centroid(self.triangle(primitive))
    }
}

/// A [`TriangleMesh`] with its index width fixed at compile time.
#[derive(Debug)]
pub struct MeshSource<'m, 'a, R> {
    mesh: &'m TriangleMesh<'a>,
    _reader: PhantomData<R>,
}

impl<R: IndexReader> PrimitiveSource for MeshSource<'_, '_, R> {
    #[inline]
    fn len(&self) -> usize {
        self.mesh.triangle_count()
    }

    #[inline]
    fn bounds(&self, primitive: usize) -> Aabb {
        triangle_bounds(self.mesh.triangle_with::<R>(primitive))
    }

    #[inline]
    fn centroid(&self, primitive: usize) -> Vec3 {
        triangle_centroid(self.mesh.triangle_with::<R>(primitive))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn index_width_conversion() {
        assert_eq!(IndexFormat::from_byte_width(2), Ok(IndexFormat::U16));
        assert_eq!(IndexFormat::from_byte_width(4), Ok(IndexFormat::U32));
        assert_eq!(
            IndexFormat::from_byte_width(1),
            Err(UnsupportedIndexWidth(1))
        );
        assert_eq!(
            IndexFormat::from_byte_width(8),
            Err(UnsupportedIndexWidth(8))
        );
    }

    #[test]
    fn strided_vertices_skip_trailing_attributes() {
        // Position followed by a normal: 24-byte stride.
        let interleaved: [[f32; 6]; 3] = [
            [0.0, 0.0, 0.0, 9.0, 9.0, 9.0],
            [3.0, 0.0, 0.0, 9.0, 9.0, 9.0],
            [0.0, 3.0, 1.5, 9.0, 9.0, 9.0],
        ];
        let indices: [u16; 3] = [0, 1, 2];
        let mesh = TriangleMesh::new(
            bytemuck::cast_slice(&interleaved),
            24,
            bytemuck::cast_slice(&indices),
            IndexFormat::U16,
        );
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.position(2), Vec3::new(0.0, 3.0, 1.5));
        assert_eq!(
            mesh.bounds(0),
            Aabb::new(Vec3::ZERO, Vec3::new(3.0, 3.0, 1.5))
        );
        assert_eq!(mesh.centroid(0), Vec3::new(1.0, 1.0, 0.5));
    }

    #[test]
    fn readers_agree_across_widths() {
        let positions: [[f32; 3]; 4] = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [1.0, 1.0, 1.0],
        ];
        let wide: [u32; 6] = [0, 1, 2, 1, 3, 2];
        let narrow: Vec<u16> = wide
            .iter()
            .map(|&i| u16::try_from(i).unwrap())
            .collect();
        let a = TriangleMesh::from_positions(&positions, &wide);
        let b = TriangleMesh::from_positions_u16(&positions, &narrow);
        let sa = a.source::<U32Indices>();
        let sb = b.source::<U16Indices>();
        assert_eq!(sa.len(), 2);
        for t in 0..2 {
            assert_eq!(sa.bounds(t), sb.bounds(t));
            assert_eq!(sa.centroid(t), sb.centroid(t));
            assert_eq!(a.triangle(t), b.triangle(t));
        }
    }

    #[test]
    fn box_slice_centroid_is_center() {
        let boxes = [Aabb::new(Vec3::ZERO, Vec3::new(2.0, 4.0, 6.0))];
        let src: &[Aabb] = &boxes;
        assert_eq!(src.len(), 1);
        assert_eq!(src.centroid(0), Vec3::new(1.0, 2.0, 3.0));
    }
}
