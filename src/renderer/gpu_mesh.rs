use glam::Mat4;

use crate::gpu::dynamic_buffer::TypedBuffer;
use crate::mesh::{Topology, Vertex};

/// Per-mesh uniform: model matrix and the matrix that carries normals to
/// world space.
///
/// Layout matches `ModelUniform` in `assets/shaders/raster/mesh.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniform {
    /// Object-to-world transform.
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of `model`.
    pub normal: [[f32; 4]; 4],
}

impl ModelUniform {
    /// Uniform for a model matrix. Singular matrices (zero scale) reuse the
    /// model matrix for normals.
    pub fn from_model(model: Mat4) -> Self {
        let normal = if model.determinant().abs() > f32::EPSILON {
            model.inverse().transpose()
        } else {
            model
        };
        Self {
            model: model.to_cols_array_2d(),
            normal: normal.to_cols_array_2d(),
        }
    }
}

/// Geometry uploaded by [`Renderer::prepare`](super::Renderer::prepare).
pub struct GpuMesh {
    pub(super) vertices: TypedBuffer<Vertex>,
    pub(super) indices: TypedBuffer<u32>,
    pub(super) topology: Topology,
    pub(super) model_buffer: wgpu::Buffer,
    pub(super) model_bind_group: wgpu::BindGroup,
}

impl GpuMesh {
    /// Index topology the mesh was uploaded with.
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Number of vertices currently uploaded.
    pub fn vertex_count(&self) -> usize {
        self.vertices.count()
    }

    /// Number of indices currently uploaded.
    pub fn index_count(&self) -> u32 {
        self.indices.count() as u32
    }
}

#[cfg(test)]
mod tests {
    use glam::{Quat, Vec3};

    use super::*;

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let model = Mat4::from_scale_rotation_translation(
            Vec3::new(2.0, 1.0, 1.0),
            Quat::IDENTITY,
            Vec3::new(5.0, 0.0, 0.0),
        );
        let uniform = ModelUniform::from_model(model);
        let normal = Mat4::from_cols_array_2d(&uniform.normal);
        let n = normal.transform_vector3(Vec3::X);
        assert!(n.abs_diff_eq(Vec3::new(0.5, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn rigid_transform_keeps_rotation_for_normals() {
        let rotation = Quat::from_rotation_y(0.7);
        let model = Mat4::from_rotation_translation(rotation, Vec3::ONE);
        let uniform = ModelUniform::from_model(model);
        let normal = Mat4::from_cols_array_2d(&uniform.normal);
        assert!(normal
            .transform_vector3(Vec3::Z)
            .abs_diff_eq(rotation * Vec3::Z, 1e-5));
    }

    #[test]
    fn singular_model_does_not_produce_nan() {
        let uniform = ModelUniform::from_model(Mat4::from_scale(Vec3::ZERO));
        assert!(uniform.normal.iter().flatten().all(|v| v.is_finite()));
        assert_eq!(size_of::<ModelUniform>(), 128);
    }
}
