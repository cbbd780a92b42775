//! Model transform for a single drawable.

use glam::{Mat4, Quat, Vec3};

use crate::util::cached::Cached;

/// Position plus accumulated orientation, with a lazily rebuilt model
/// matrix.
///
/// Rotations are deltas: each `rotate_*` call adds to a pending angle that
/// the next [`model_matrix`](Self::model_matrix) folds into the orientation
/// and then clears. Continuous spinning means calling `rotate_*` every
/// frame.
#[derive(Debug, Clone)]
pub struct Object3D {
    position: Vec3,
    orientation: Quat,
    forward: Vec3,
    up: Vec3,
    right: Vec3,
    /// Pending (pitch, yaw, roll) about the local X, Y and Z axes.
    pending: Vec3,
    model: Cached<Mat4>,
}

impl Default for Object3D {
    fn default() -> Self {
        Self::new()
    }
}

impl Object3D {
    /// Object at the origin with identity orientation.
    pub fn new() -> Self {
        Self::at(Vec3::ZERO)
    }

    /// Object at `position` with identity orientation.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
            right: Vec3::X,
            pending: Vec3::ZERO,
            model: Cached::stale(Mat4::IDENTITY),
        }
    }

    /// Move the object to `position`.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.model.invalidate();
    }

    /// Offset the object by a world-space vector.
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
        self.model.invalidate();
    }

    /// Queue a rotation about the local X axis.
    pub fn rotate_pitch(&mut self, angle: f32) {
        self.pending.x += angle;
        self.model.invalidate();
    }

    /// Queue a rotation about the local Y axis.
    pub fn rotate_yaw(&mut self, angle: f32) {
        self.pending.y += angle;
        self.model.invalidate();
    }

    /// Queue a rotation about the local Z axis.
    pub fn rotate_roll(&mut self, angle: f32) {
        self.pending.z += angle;
        self.model.invalidate();
    }

    /// `T(position) * R(orientation)`, after folding in pending rotation.
    pub fn model_matrix(&mut self) -> Mat4 {
        if !self.model.is_valid() {
            self.apply_pending();
        }
        let (position, orientation) = (self.position, self.orientation);
        self.model.get_or_update(|| {
            log::trace!("rebuilding model matrix");
            Mat4::from_rotation_translation(orientation, position)
        })
    }

    fn apply_pending(&mut self) {
        if self.pending == Vec3::ZERO {
            return;
        }
        let delta = Quat::from_rotation_z(self.pending.z)
            * Quat::from_rotation_y(self.pending.y)
            * Quat::from_rotation_x(self.pending.x);
        self.orientation = (self.orientation * delta).normalize();
        self.pending = Vec3::ZERO;

        self.forward = self.orientation * Vec3::NEG_Z;
        self.up = self.orientation * Vec3::Y;
        self.right = self.orientation * Vec3::X;
    }

    /// World-space position.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Committed orientation (pending rotation not yet applied).
    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    /// Rotation queued since the last model-matrix rebuild, as
    /// (pitch, yaw, roll).
    pub fn pending_rotation(&self) -> Vec3 {
        self.pending
    }

    /// Local -Z in world space.
    pub fn forward_dir(&self) -> Vec3 {
        self.forward
    }

    /// Local +Y in world space.
    pub fn up_dir(&self) -> Vec3 {
        self.up
    }

    /// Local +X in world space.
    pub fn right_dir(&self) -> Vec3 {
        self.right
    }
}
