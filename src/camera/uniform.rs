use glam::Mat4;

use crate::camera::core::Camera;

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
/// GPU uniform buffer holding the camera matrices and eye position.
///
/// Layout matches `CameraUniform` in `assets/shaders/modules/camera.wgsl`.
pub struct CameraUniform {
    /// Combined view-projection matrix.
    pub view_proj: [[f32; 4]; 4],
    /// World-to-camera matrix.
    pub view: [[f32; 4]; 4],
    /// Camera world-space position.
    pub position: [f32; 3],
    /// Padding for GPU alignment.
    pub(crate) _pad: f32,
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraUniform {
    /// Uniform with identity matrices.
    pub fn new() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            view: Mat4::IDENTITY.to_cols_array_2d(),
            position: [0.0; 3],
            _pad: 0.0,
        }
    }

    /// Refresh from the camera, flushing its pending movement.
    pub fn update(&mut self, camera: &mut Camera) {
        let view = camera.view();
        let proj = camera.projection();
        self.view_proj = (proj * view).to_cols_array_2d();
        self.view = view.to_cols_array_2d();
        self.position = camera.position().to_array();
    }
}
