//! Subdivided planes accumulated into one triangle strip.

use glam::Vec3;

use super::{Mesh, MeshError, Topology};

/// One rectangular patch for [`PlaneBuilder::add_plane`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneDesc {
    /// Samples along the horizontal axis (at least 2).
    pub horizontal: u32,
    /// Samples along the vertical axis (at least 2).
    pub vertical: u32,
    /// Corner the axes start from.
    pub origin: Vec3,
    /// Full horizontal edge.
    pub horizontal_axis: Vec3,
    /// Full vertical edge.
    pub vertical_axis: Vec3,
    /// Color applied to every vertex of the patch.
    pub color: Vec3,
}

impl Default for PlaneDesc {
    /// Unit square in the XZ plane facing +Y.
    fn default() -> Self {
        Self {
            horizontal: 2,
            vertical: 2,
            origin: Vec3::new(-0.5, 0.0, -0.5),
            horizontal_axis: Vec3::X,
            vertical_axis: Vec3::Z,
            color: Vec3::ONE,
        }
    }
}

/// Accumulates planes into a single triangle-strip [`Mesh`].
///
/// Each call to [`add_plane`](Self::add_plane) appends; patches are joined
/// with degenerate triangles so the whole builder draws in one call.
#[derive(Debug, Clone)]
pub struct PlaneBuilder {
    mesh: Mesh,
}

impl Default for PlaneBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaneBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self {
            mesh: Mesh::new(Topology::TriangleStrip),
        }
    }

    /// Append a subdivided patch.
    ///
    /// Vertex `(i, j)` sits at `origin + horizontal_axis * i / (h - 1) +
    /// vertical_axis * j / (v - 1)`. The strip emits one band per pair of
    /// adjacent rows, with two degenerate indices between bands and a
    /// trailing repeat of the last index. Patches after the first also get a
    /// leading repeat of their first index so strip parity is preserved.
    pub fn add_plane(&mut self, desc: &PlaneDesc) -> Result<(), MeshError> {
        let (h, v) = (desc.horizontal, desc.vertical);
        if h < 2 || v < 2 {
            log::warn!("rejecting {h}x{v} plane: needs at least 2x2 samples");
            return Err(MeshError::InvalidSubdivision {
                horizontal: h,
                vertical: v,
            });
        }

        let normal = desc.vertical_axis.cross(desc.horizontal_axis);
        let scale = desc.horizontal_axis.length_squared()
            * desc.vertical_axis.length_squared();
        if normal.length_squared() <= f32::EPSILON * scale {
            log::warn!("rejecting plane with degenerate axes");
            return Err(MeshError::DegenerateAxes);
        }
        let normal = normal.normalize();

        let mesh = &mut self.mesh;
        let first_plane = mesh.indices.is_empty();
        let base = mesh.positions.len() as u32;

        mesh.positions.reserve((h * v) as usize);
        for j in 0..v {
            let along_v = desc.vertical_axis * (j as f32 / (v - 1) as f32);
            for i in 0..h {
                let along_h =
                    desc.horizontal_axis * (i as f32 / (h - 1) as f32);
                let _ = mesh.push_vertex(
                    desc.origin + along_h + along_v,
                    desc.color,
                    normal,
                );
            }
        }

        let at = |i: u32, j: u32| base + j * h + i;
        if !first_plane {
            mesh.indices.push(at(0, 0));
        }
        for j in 0..v - 1 {
            if j > 0 {
                mesh.indices.push(at(h - 1, j));
                mesh.indices.push(at(0, j));
            }
            for i in 0..h {
                mesh.indices.push(at(i, j));
                mesh.indices.push(at(i, j + 1));
            }
        }
        mesh.indices.push(at(h - 1, v - 1));

        log::trace!(
            "plane {h}x{v}: {} vertices, {} indices total",
            mesh.positions.len(),
            mesh.indices.len()
        );
        Ok(())
    }

    /// Accumulated geometry.
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Consume the builder.
    pub fn into_mesh(self) -> Mesh {
        self.mesh
    }
}
