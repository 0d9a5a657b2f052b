/// Static indexed geometry with flat per-vertex colors
use bytemuck::{Pod, Zeroable};
use nalgebra::{Point3, Vector3};

/// Interleaved vertex, laid out for direct upload: 3 position floats then 4 color floats.
/// `Pod` lets front ends cast a vertex slice straight to bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ColoredVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl ColoredVertex {
    pub const STRIDE: usize = std::mem::size_of::<Self>();
    pub const COLOR_OFFSET: usize = 3 * std::mem::size_of::<f32>();

    pub fn new(position: [f32; 3], color: [f32; 4]) -> Self {
        Self { position, color }
    }

    pub fn point(&self) -> Point3<f32> {
        Point3::from(self.position)
    }
}

/// One color per cube face, in face order front, back, top, bottom, right, left
const FACE_COLORS: [[f32; 4]; 6] = [
    [1.0, 0.0, 0.0, 1.0],
    [0.0, 1.0, 0.0, 1.0],
    [0.0, 0.0, 1.0, 1.0],
    [1.0, 1.0, 0.0, 1.0],
    [1.0, 0.0, 1.0, 1.0],
    [0.0, 1.0, 1.0, 1.0],
];

/// Triangle mesh addressed through a 16-bit index buffer
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedMesh {
    pub vertices: Vec<ColoredVertex>,
    pub indices: Vec<u16>,
}

impl IndexedMesh {
    pub fn new(vertices: Vec<ColoredVertex>, indices: Vec<u16>) -> Self {
        Self { vertices, indices }
    }

    /// Axis-aligned cube centred on the origin: 4 vertices per face so each
    /// face keeps its own flat color (24 vertices, 36 indices).
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;

        // Corners wind counter-clockwise seen from outside the face
        let faces: [[[f32; 3]; 4]; 6] = [
            // Front
            [[-h, -h, h], [h, -h, h], [h, h, h], [-h, h, h]],
            // Back
            [[-h, -h, -h], [-h, h, -h], [h, h, -h], [h, -h, -h]],
            // Top
            [[-h, h, -h], [-h, h, h], [h, h, h], [h, h, -h]],
            // Bottom
            [[-h, -h, -h], [h, -h, -h], [h, -h, h], [-h, -h, h]],
            // Right
            [[h, -h, -h], [h, h, -h], [h, h, h], [h, -h, h]],
            // Left
            [[-h, -h, -h], [-h, -h, h], [-h, h, h], [-h, h, -h]],
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (face, corners) in faces.iter().enumerate() {
            let base = (face * 4) as u16;
            vertices.extend(
                corners
                    .iter()
                    .map(|&corner| ColoredVertex::new(corner, FACE_COLORS[face])),
            );
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self::new(vertices, indices)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Resolve the index buffer into vertex triples. A trailing partial
    /// triangle is skipped.
    pub fn triangles(&self) -> impl Iterator<Item = [ColoredVertex; 3]> + '_ {
        self.indices.chunks_exact(3).map(move |tri| {
            [
                self.vertices[tri[0] as usize],
                self.vertices[tri[1] as usize],
                self.vertices[tri[2] as usize],
            ]
        })
    }
}

/// Unit normal of a counter-clockwise triangle
pub fn face_normal(triangle: &[ColoredVertex; 3]) -> Vector3<f32> {
    let v0 = triangle[0].point();
    let edge1 = triangle[1].point() - v0;
    let edge2 = triangle[2].point() - v0;

    edge1.cross(&edge2).normalize()
}
