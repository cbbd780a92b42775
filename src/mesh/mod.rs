//! Procedural mesh data.
//!
//! Generators produce CPU-side [`Mesh`] values: parallel position, color and
//! normal arrays plus an index buffer in either triangle-list or
//! triangle-strip topology. Nothing here touches the GPU; upload happens in
//! [`crate::renderer`].

pub mod cube;
pub mod plane;
pub mod sphere;

use std::fmt;

use glam::Vec3;

pub use cube::cube;
pub use plane::{PlaneBuilder, PlaneDesc};
pub use sphere::{sphere, MAX_SPHERE_LEVEL};

/// Index topology of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    /// Every three indices form one triangle.
    TriangleList,
    /// Each index after the second forms a triangle with the previous two.
    TriangleStrip,
}

impl Topology {
    /// Matching wgpu primitive topology.
    pub fn to_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            Self::TriangleList => wgpu::PrimitiveTopology::TriangleList,
            Self::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
        }
    }
}

/// Errors from mesh generation and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// A plane needs at least two samples along each axis.
    InvalidSubdivision {
        /// Requested horizontal samples.
        horizontal: u32,
        /// Requested vertical samples.
        vertical: u32,
    },
    /// Sphere subdivision level above [`MAX_SPHERE_LEVEL`].
    LevelTooHigh(u32),
    /// Plane axes are zero or parallel.
    DegenerateAxes,
    /// Position, color and normal arrays differ in length.
    LengthMismatch {
        /// Number of positions.
        positions: usize,
        /// Number of colors.
        colors: usize,
        /// Number of normals.
        normals: usize,
    },
    /// An index refers past the end of the vertex arrays.
    IndexOutOfRange {
        /// Offending index value.
        index: u32,
        /// Number of vertices.
        vertex_count: usize,
    },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSubdivision {
                horizontal,
                vertical,
            } => write!(
                f,
                "plane needs at least 2x2 samples, got {horizontal}x{vertical}"
            ),
            Self::LevelTooHigh(level) => write!(
                f,
                "sphere level {level} exceeds maximum {MAX_SPHERE_LEVEL}"
            ),
            Self::DegenerateAxes => {
                write!(f, "plane axes are zero-length or parallel")
            }
            Self::LengthMismatch {
                positions,
                colors,
                normals,
            } => write!(
                f,
                "vertex arrays differ in length: {positions} positions, \
                 {colors} colors, {normals} normals"
            ),
            Self::IndexOutOfRange {
                index,
                vertex_count,
            } => write!(
                f,
                "index {index} out of range for {vertex_count} vertices"
            ),
        }
    }
}

impl std::error::Error for MeshError {}

/// Interleaved vertex as uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Linear RGB color.
    pub color: [f32; 3],
    /// Unit normal.
    pub normal: [f32; 3],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x3
    ];

    /// Vertex buffer layout matching `VertexInput` in `mesh.wgsl`.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Indexed geometry with per-vertex color and normal.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Per-vertex colors, index-aligned with `positions`.
    pub colors: Vec<Vec3>,
    /// Per-vertex unit normals, index-aligned with `positions`.
    pub normals: Vec<Vec3>,
    /// Triangle indices.
    pub indices: Vec<u32>,
    /// How `indices` form triangles.
    pub topology: Topology,
}

impl Mesh {
    /// Empty mesh with the given topology.
    pub fn new(topology: Topology) -> Self {
        Self {
            positions: Vec::new(),
            colors: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
            topology,
        }
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles the index buffer describes, counting degenerate
    /// strip triangles.
    pub fn triangle_count(&self) -> usize {
        match self.topology {
            Topology::TriangleList => self.indices.len() / 3,
            Topology::TriangleStrip => self.indices.len().saturating_sub(2),
        }
    }

    /// Check that the vertex arrays are index-aligned and every index is in
    /// range.
    pub fn validate(&self) -> Result<(), MeshError> {
        let positions = self.positions.len();
        if self.colors.len() != positions || self.normals.len() != positions {
            return Err(MeshError::LengthMismatch {
                positions,
                colors: self.colors.len(),
                normals: self.normals.len(),
            });
        }
        if let Some(&index) =
            self.indices.iter().find(|&&i| i as usize >= positions)
        {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count: positions,
            });
        }
        Ok(())
    }

    /// Interleave the vertex arrays for upload.
    pub fn vertices(&self) -> Vec<Vertex> {
        self.positions
            .iter()
            .zip(&self.colors)
            .zip(&self.normals)
            .map(|((p, c), n)| Vertex {
                position: p.to_array(),
                color: c.to_array(),
                normal: n.to_array(),
            })
            .collect()
    }

    /// Append one vertex, returning its index.
    pub(crate) fn push_vertex(
        &mut self,
        position: Vec3,
        color: Vec3,
        normal: Vec3,
    ) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        self.colors.push(color);
        self.normals.push(normal);
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_reports_misaligned_arrays() {
        let mut mesh = Mesh::new(Topology::TriangleList);
        let _ = mesh.push_vertex(Vec3::ZERO, Vec3::ONE, Vec3::Y);
        mesh.colors.push(Vec3::ONE);
        assert_eq!(
            mesh.validate(),
            Err(MeshError::LengthMismatch {
                positions: 1,
                colors: 2,
                normals: 1
            })
        );
    }

    #[test]
    fn validate_reports_out_of_range_index() {
        let mut mesh = Mesh::new(Topology::TriangleList);
        for _ in 0..3 {
            let _ = mesh.push_vertex(Vec3::ZERO, Vec3::ONE, Vec3::Y);
        }
        mesh.indices = vec![0, 1, 3];
        assert_eq!(
            mesh.validate(),
            Err(MeshError::IndexOutOfRange {
                index: 3,
                vertex_count: 3
            })
        );
        mesh.indices = vec![0, 1, 2];
        assert!(mesh.validate().is_ok());
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn vertex_layout_matches_struct() {
        let layout = Vertex::layout();
        assert_eq!(layout.array_stride, 36);
        assert_eq!(layout.attributes.len(), 3);
        assert_eq!(layout.attributes[2].offset, 24);
    }
}
