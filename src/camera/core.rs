use glam::{Mat4, Quat, Vec3};

use crate::camera::movement::MovementPolicy;
use crate::options::CameraOptions;
use crate::util::{angle::wrap_angle, cached::Cached};

/// Free-flying perspective camera with lazily cached matrices.
///
/// Mutators only record intent: movement is accumulated as pending deltas
/// along the camera-local axes and rotations as pending angle deltas. The
/// next call to [`view`](Self::view) folds everything into the position and
/// basis, clears the pending state and caches the resulting matrix. The
/// projection matrix is cached the same way and only rebuilt after a
/// projection parameter changes.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    forward: Vec3,
    up: Vec3,
    right: Vec3,

    /// Vertical field of view in radians.
    fov_y: f32,
    aspect: f32,
    znear: f32,
    zfar: f32,

    // Accumulated orientation, wrapped into [-π, π).
    yaw: f32,
    pitch: f32,
    roll: f32,

    /// Pending (pitch, yaw, roll) deltas since the last view rebuild.
    pending_rotation: Vec3,
    /// Pending (right, up, forward) movement since the last view rebuild.
    pending_movement: Vec3,
    movement: MovementPolicy,

    projection: Cached<Mat4>,
    view: Cached<Mat4>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_options(&CameraOptions::default(), 16.0 / 9.0)
    }
}

impl Camera {
    /// Camera at `position` looking at `target`, with projection parameters
    /// taken from `options`. Parameters rejected by
    /// [`set_fov_y`](Self::set_fov_y), [`set_aspect`](Self::set_aspect) or
    /// [`set_clip`](Self::set_clip) fall back to the defaults with a warning.
    pub fn looking_at(
        position: Vec3,
        target: Vec3,
        up: Vec3,
        options: &CameraOptions,
        aspect: f32,
    ) -> Self {
        let (forward, up, right) = orthonormal_basis(target - position, up);
        let defaults = CameraOptions::default();
        let mut camera = Self {
            position,
            forward,
            up,
            right,
            fov_y: defaults.fovy.to_radians(),
            aspect: 1.0,
            znear: defaults.znear,
            zfar: defaults.zfar,
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
            pending_rotation: Vec3::ZERO,
            pending_movement: Vec3::ZERO,
            movement: options.movement,
            projection: Cached::stale(Mat4::IDENTITY),
            view: Cached::stale(Mat4::IDENTITY),
        };
        camera.set_fov_y(options.fovy.to_radians());
        camera.set_aspect(aspect);
        camera.set_clip(options.znear, options.zfar);
        camera
    }

    /// Camera at the origin looking down -Z.
    pub fn from_options(options: &CameraOptions, aspect: f32) -> Self {
        Self::looking_at(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y, options, aspect)
    }

    // -- Position and movement ---------------------------------------------

    /// Replace the camera position. Pending movement is kept and applied on
    /// top of the new position.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.view.invalidate();
    }

    /// Restrict which world axes movement may change.
    pub fn set_movement_policy(&mut self, policy: MovementPolicy) {
        self.movement = policy;
        self.view.invalidate();
    }

    /// Move along the view direction (negative moves backwards).
    pub fn forward(&mut self, amount: f32) {
        self.pending_movement.z += amount;
        self.view.invalidate();
    }

    /// Strafe along the camera's right axis (negative strafes left).
    pub fn right(&mut self, amount: f32) {
        self.pending_movement.x += amount;
        self.view.invalidate();
    }

    /// Move along the camera's up axis (negative moves down).
    pub fn up(&mut self, amount: f32) {
        self.pending_movement.y += amount;
        self.view.invalidate();
    }

    // -- Rotation ----------------------------------------------------------

    /// Rotate about the camera's right axis (positive tilts up).
    pub fn rotate_pitch(&mut self, angle: f32) {
        self.pending_rotation.x += angle;
        self.pitch = wrap_angle(self.pitch + angle);
        self.view.invalidate();
    }

    /// Rotate about the camera's up axis (positive turns left).
    pub fn rotate_yaw(&mut self, angle: f32) {
        self.pending_rotation.y += angle;
        self.yaw = wrap_angle(self.yaw + angle);
        self.view.invalidate();
    }

    /// Rotate about the view direction.
    pub fn rotate_roll(&mut self, angle: f32) {
        self.pending_rotation.z += angle;
        self.roll = wrap_angle(self.roll + angle);
        self.view.invalidate();
    }

    // -- Projection parameters ---------------------------------------------

    /// Set the vertical field of view in radians.
    pub fn set_fov_y(&mut self, fov_y: f32) {
        if !(fov_y > 0.0 && fov_y < std::f32::consts::PI) {
            log::warn!("ignoring field of view outside (0, π): {fov_y}");
            return;
        }
        self.fov_y = fov_y;
        self.projection.invalidate();
    }

    /// Set the viewport aspect ratio (width / height).
    pub fn set_aspect(&mut self, aspect: f32) {
        if !(aspect.is_finite() && aspect > 0.0) {
            log::warn!("ignoring non-positive aspect ratio: {aspect}");
            return;
        }
        self.aspect = aspect;
        self.projection.invalidate();
    }

    /// Update the aspect ratio from a viewport size in pixels. Zero-sized
    /// viewports (minimized windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.set_aspect(width as f32 / height as f32);
        }
    }

    /// Set the near and far clip distances.
    pub fn set_clip(&mut self, znear: f32, zfar: f32) {
        if !(znear > 0.0 && zfar > znear) {
            log::warn!("ignoring clip range near={znear} far={zfar}");
            return;
        }
        self.znear = znear;
        self.zfar = zfar;
        self.projection.invalidate();
    }

    // -- Matrices ----------------------------------------------------------

    /// Perspective projection, rebuilt only after a projection parameter
    /// changed.
    pub fn projection(&mut self) -> Mat4 {
        let (fov_y, aspect, znear, zfar) =
            (self.fov_y, self.aspect, self.znear, self.zfar);
        self.projection.get_or_update(|| {
            log::trace!("rebuilding camera projection");
            Mat4::perspective_rh(fov_y, aspect, znear, zfar)
        })
    }

    /// World-to-camera matrix. Applies and clears all pending rotation and
    /// movement if anything changed since the last call.
    pub fn view(&mut self) -> Mat4 {
        if !self.view.is_valid() {
            self.apply_pending();
        }
        let (position, forward, up) = (self.position, self.forward, self.up);
        self.view.get_or_update(|| {
            log::trace!("rebuilding camera view");
            Mat4::look_at_rh(position, position + forward, up)
        })
    }

    /// `projection * view`.
    pub fn view_projection(&mut self) -> Mat4 {
        self.projection() * self.view()
    }

    fn apply_pending(&mut self) {
        if self.pending_rotation != Vec3::ZERO {
            let rotation = frame_rotation(
                self.pending_rotation,
                self.right,
                self.up,
                self.forward,
            );
            let forward = rotation * self.forward;
            let up = rotation * self.up;
            (self.forward, self.up, self.right) =
                orthonormal_basis(forward, up);
        }

        let displacement = self.right * self.pending_movement.x
            + self.up * self.pending_movement.y
            + self.forward * self.pending_movement.z;
        self.position += self.movement.apply(displacement);

        self.pending_movement = Vec3::ZERO;
        self.pending_rotation = Vec3::ZERO;
    }

    // -- Accessors ---------------------------------------------------------

    /// Committed world-space position (pending movement not yet applied).
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Unit view direction.
    pub fn forward_dir(&self) -> Vec3 {
        self.forward
    }

    /// Unit up vector.
    pub fn up_dir(&self) -> Vec3 {
        self.up
    }

    /// Unit right vector.
    pub fn right_dir(&self) -> Vec3 {
        self.right
    }

    /// Movement not yet folded into the position, as (right, up, forward).
    pub fn pending_movement(&self) -> Vec3 {
        self.pending_movement
    }

    /// Accumulated yaw in `[-π, π)`.
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Accumulated pitch in `[-π, π)`.
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Accumulated roll in `[-π, π)`.
    pub fn roll(&self) -> f32 {
        self.roll
    }

    /// Vertical field of view in radians.
    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    /// Viewport aspect ratio.
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Near and far clip distances.
    pub fn clip(&self) -> (f32, f32) {
        (self.znear, self.zfar)
    }

    /// Active movement policy.
    pub fn movement_policy(&self) -> MovementPolicy {
        self.movement
    }
}

/// Rotation for (pitch, yaw, roll) deltas applied in that order about the
/// given axes of the current frame.
pub(crate) fn frame_rotation(
    deltas: Vec3,
    right: Vec3,
    up: Vec3,
    forward: Vec3,
) -> Quat {
    Quat::from_axis_angle(forward, deltas.z)
        * Quat::from_axis_angle(up, deltas.y)
        * Quat::from_axis_angle(right, deltas.x)
}

/// Build a right-handed (forward, up, right) basis from a view direction and
/// an approximate up vector.
fn orthonormal_basis(forward: Vec3, up: Vec3) -> (Vec3, Vec3, Vec3) {
    let forward = forward.try_normalize().unwrap_or(Vec3::NEG_Z);
    let right = forward
        .cross(up)
        .try_normalize()
        .unwrap_or_else(|| forward.any_orthonormal_vector());
    let up = right.cross(forward);
    (forward, up, right)
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{PI, TAU};

    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    fn camera_at(position: Vec3) -> Camera {
        Camera::looking_at(
            position,
            position + Vec3::NEG_Z,
            Vec3::Y,
            &CameraOptions::default(),
            1.5,
        )
    }

    #[test]
    fn view_matches_closed_form_translation() {
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 5.0));
        camera.forward(2.0);
        camera.right(1.0);
        camera.up(-0.5);
        camera.forward(-0.5);

        let view = camera.view();

        let expected_pos = Vec3::new(1.0, -0.5, 3.5);
        let expected =
            Mat4::look_at_rh(expected_pos, expected_pos + Vec3::NEG_Z, Vec3::Y);
        assert!(view.abs_diff_eq(expected, 1e-5));
        assert!(camera.position().abs_diff_eq(expected_pos, 1e-5));
        assert_eq!(camera.pending_movement(), Vec3::ZERO);
    }

    #[test]
    fn random_movement_sequences_match_closed_form() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..50 {
            let start = Vec3::new(
                rng.random_range(-10.0..10.0),
                rng.random_range(-10.0..10.0),
                rng.random_range(-10.0..10.0),
            );
            let mut camera = camera_at(start);
            let mut sum = Vec3::ZERO;
            for _ in 0..rng.random_range(1..20) {
                let amount: f32 = rng.random_range(-3.0..3.0);
                match rng.random_range(0..3) {
                    0 => {
                        camera.forward(amount);
                        sum.z += amount;
                    }
                    1 => {
                        camera.right(amount);
                        sum.x += amount;
                    }
                    _ => {
                        camera.up(amount);
                        sum.y += amount;
                    }
                }
            }

            let view = camera.view();

            // Basis is (X, Y, -Z) for a camera looking down -Z.
            let pos = start + Vec3::new(sum.x, sum.y, -sum.z);
            let expected = Mat4::look_at_rh(pos, pos + Vec3::NEG_Z, Vec3::Y);
            assert!(view.abs_diff_eq(expected, 1e-4));
            assert_eq!(camera.pending_movement(), Vec3::ZERO);
        }
    }

    #[test]
    fn rotation_applies_pitch_then_yaw_then_roll_about_current_axes() {
        let mut camera = camera_at(Vec3::ZERO);
        camera.rotate_yaw(0.4);
        camera.rotate_pitch(0.25);
        camera.rotate_roll(-0.1);
        camera.forward(1.0);

        let view = camera.view();

        let q = Quat::from_axis_angle(Vec3::NEG_Z, -0.1)
            * Quat::from_axis_angle(Vec3::Y, 0.4)
            * Quat::from_axis_angle(Vec3::X, 0.25);
        let forward = q * Vec3::NEG_Z;
        let up = q * Vec3::Y;
        let expected = Mat4::look_at_rh(forward, forward + forward, up);
        assert!(view.abs_diff_eq(expected, 1e-5));
        assert!(camera.forward_dir().dot(camera.up_dir()).abs() < 1e-5);
        assert!((camera.right_dir().length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn pending_rotation_is_consumed_by_view() {
        let mut camera = camera_at(Vec3::ZERO);
        camera.rotate_yaw(PI / 2.0);
        let _ = camera.view();
        let turned = camera.forward_dir();
        assert!(turned.abs_diff_eq(Vec3::NEG_X, 1e-5));

        // A second view() with no new input must not rotate again.
        camera.set_position(Vec3::ONE);
        let _ = camera.view();
        assert!(camera.forward_dir().abs_diff_eq(turned, 1e-6));
    }

    #[test]
    fn projection_is_stable_until_a_parameter_changes() {
        let mut camera = camera_at(Vec3::ZERO);
        let first = camera.projection();
        let second = camera.projection();
        assert_eq!(first.to_cols_array(), second.to_cols_array());

        // Movement and rotation leave the projection cache alone.
        camera.forward(3.0);
        camera.rotate_yaw(0.2);
        camera.set_movement_policy(MovementPolicy::GROUND);
        assert!(camera.projection.is_valid());
        assert_eq!(camera.projection(), first);

        camera.set_fov_y(1.2);
        let after_fov = camera.projection();
        assert_ne!(after_fov, first);

        camera.set_aspect(2.0);
        let after_aspect = camera.projection();
        assert_ne!(after_aspect, after_fov);

        camera.set_clip(0.5, 50.0);
        assert_ne!(camera.projection(), after_aspect);
    }

    #[test]
    fn invalid_projection_parameters_are_ignored() {
        let mut camera = camera_at(Vec3::ZERO);
        let before = camera.projection();
        camera.set_aspect(0.0);
        camera.set_clip(10.0, 1.0);
        camera.set_fov_y(-1.0);
        camera.resize(0, 600);
        assert!(camera.projection.is_valid());
        assert_eq!(camera.projection(), before);
    }

    #[test]
    fn invalid_options_fall_back_to_default_projection() {
        let options = CameraOptions {
            fovy: 0.0,
            znear: 0.0,
            zfar: 0.0,
            ..CameraOptions::default()
        };
        let mut camera =
            Camera::looking_at(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y, &options, 0.0);
        let defaults = CameraOptions::default();
        assert_eq!(camera.clip(), (defaults.znear, defaults.zfar));
        assert!((camera.fov_y() - defaults.fovy.to_radians()).abs() < 1e-6);
        assert_eq!(camera.aspect(), 1.0);
        assert!(camera.projection().is_finite());
    }

    #[test]
    fn yaw_stays_bounded_past_two_and_four_turns() {
        let mut camera = camera_at(Vec3::ZERO);
        let step = 1.0;
        let mut sum = 0.0_f32;
        while sum <= 2.0 * TAU + 0.5 {
            camera.rotate_yaw(step);
            sum += step;
            assert!((-PI..PI).contains(&camera.yaw()));
        }
        assert!(sum > 2.0 * TAU);
        assert!((camera.yaw() - wrap_angle(sum)).abs() < 1e-4);

        camera.rotate_pitch(3.0 * TAU);
        camera.rotate_roll(-3.0 * TAU - 0.25);
        assert!((-PI..PI).contains(&camera.pitch()));
        assert!((camera.roll() + 0.25).abs() < 1e-4);
    }

    #[test]
    fn ground_policy_locks_vertical_movement() {
        let mut camera = camera_at(Vec3::new(0.0, 1.7, 0.0));
        camera.set_movement_policy(MovementPolicy::GROUND);
        camera.rotate_pitch(-0.6);
        camera.forward(4.0);
        camera.up(2.0);
        let _ = camera.view();

        assert!((camera.position().y - 1.7).abs() < 1e-6);
        assert!(camera.position().z < 0.0);
    }
}
