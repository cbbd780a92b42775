use glam::Vec2;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::camera::core::Camera;
use crate::options::{CameraOptions, KeyBindings};

/// Continuous camera intents that can be bound to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraAction {
    /// Move along the view direction.
    MoveForward,
    /// Move against the view direction.
    MoveBackward,
    /// Strafe left.
    StrafeLeft,
    /// Strafe right.
    StrafeRight,
    /// Move along the camera up axis.
    MoveUp,
    /// Move against the camera up axis.
    MoveDown,
    /// Turn left.
    YawLeft,
    /// Turn right.
    YawRight,
    /// Tilt up.
    PitchUp,
    /// Tilt down.
    PitchDown,
    /// Roll counter-clockwise.
    RollLeft,
    /// Roll clockwise.
    RollRight,
}

/// Turns held keys and mouse motion into camera mutations once per frame.
///
/// The controller owns no camera; the host passes one to
/// [`update`](Self::update) after feeding input events. Held actions scale
/// with the frame delta, mouse look is consumed in full each update.
pub struct CameraController {
    held: FxHashSet<CameraAction>,
    look_delta: Vec2,
    move_speed: f32,
    turn_speed: f32,
    mouse_sensitivity: f32,
}

impl CameraController {
    /// Controller using the speeds from `options`.
    pub fn new(options: &CameraOptions) -> Self {
        Self {
            held: FxHashSet::default(),
            look_delta: Vec2::ZERO,
            move_speed: options.move_speed,
            turn_speed: options.turn_speed,
            mouse_sensitivity: options.mouse_sensitivity,
        }
    }

    /// Start or stop an action.
    pub fn set_action(&mut self, action: CameraAction, active: bool) {
        if active {
            let _ = self.held.insert(action);
        } else {
            let _ = self.held.remove(&action);
        }
    }

    /// Whether `action` is currently held.
    pub fn is_active(&self, action: CameraAction) -> bool {
        self.held.contains(&action)
    }

    /// Route a key event through `bindings`. Returns `true` if the key was
    /// bound to a camera action.
    pub fn handle_key(
        &mut self,
        bindings: &KeyBindings,
        key: &str,
        pressed: bool,
    ) -> bool {
        bindings.lookup(key).is_some_and(|action| {
            self.set_action(action, pressed);
            true
        })
    }

    /// Accumulate mouse motion in pixels.
    pub fn look(&mut self, dx: f32, dy: f32) {
        self.look_delta += Vec2::new(dx, dy);
    }

    /// Release every held action (e.g. on focus loss).
    pub fn clear(&mut self) {
        self.held.clear();
        self.look_delta = Vec2::ZERO;
    }

    /// Apply held actions for `dt` seconds plus any pending mouse look.
    pub fn update(&mut self, camera: &mut Camera, dt: f32) {
        let step = self.move_speed * dt;
        let turn = self.turn_speed * dt;

        let forward = self.axis(CameraAction::MoveForward, CameraAction::MoveBackward);
        let right = self.axis(CameraAction::StrafeRight, CameraAction::StrafeLeft);
        let up = self.axis(CameraAction::MoveUp, CameraAction::MoveDown);
        let yaw = self.axis(CameraAction::YawLeft, CameraAction::YawRight);
        let pitch = self.axis(CameraAction::PitchUp, CameraAction::PitchDown);
        let roll = self.axis(CameraAction::RollLeft, CameraAction::RollRight);

        if forward != 0.0 {
            camera.forward(forward * step);
        }
        if right != 0.0 {
            camera.right(right * step);
        }
        if up != 0.0 {
            camera.up(up * step);
        }

        // Screen-space mouse motion: +x turns right, +y tilts down.
        let look = self.look_delta * self.mouse_sensitivity;
        self.look_delta = Vec2::ZERO;

        let yaw = yaw * turn - look.x;
        let pitch = pitch * turn - look.y;
        if yaw != 0.0 {
            camera.rotate_yaw(yaw);
        }
        if pitch != 0.0 {
            camera.rotate_pitch(pitch);
        }
        if roll != 0.0 {
            camera.rotate_roll(roll * turn);
        }
    }

    fn axis(&self, positive: CameraAction, negative: CameraAction) -> f32 {
        f32::from(u8::from(self.is_active(positive)))
            - f32::from(u8::from(self.is_active(negative)))
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    #[test]
    fn held_forward_moves_by_speed_times_dt() {
        let options = CameraOptions::default();
        let mut controller = CameraController::new(&options);
        let mut camera = Camera::from_options(&options, 1.0);

        assert!(controller.handle_key(&KeyBindings::default(), "KeyW", true));
        controller.update(&mut camera, 0.5);
        let _ = camera.view();

        let expected = Vec3::NEG_Z * options.move_speed * 0.5;
        assert!(camera.position().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn opposite_actions_cancel() {
        let options = CameraOptions::default();
        let mut controller = CameraController::new(&options);
        let mut camera = Camera::from_options(&options, 1.0);

        controller.set_action(CameraAction::StrafeLeft, true);
        controller.set_action(CameraAction::StrafeRight, true);
        controller.update(&mut camera, 1.0);
        assert_eq!(camera.pending_movement(), Vec3::ZERO);
    }

    #[test]
    fn release_stops_motion_and_unbound_keys_are_ignored() {
        let options = CameraOptions::default();
        let bindings = KeyBindings::default();
        let mut controller = CameraController::new(&options);

        assert!(controller.handle_key(&bindings, "KeyA", true));
        assert!(controller.is_active(CameraAction::StrafeLeft));
        assert!(controller.handle_key(&bindings, "KeyA", false));
        assert!(!controller.is_active(CameraAction::StrafeLeft));
        assert!(!controller.handle_key(&bindings, "F13", true));
    }

    #[test]
    fn mouse_look_is_consumed_once() {
        let options = CameraOptions::default();
        let mut controller = CameraController::new(&options);
        let mut camera = Camera::from_options(&options, 1.0);

        controller.look(10.0, 0.0);
        controller.update(&mut camera, 0.016);
        let yaw_after_first = camera.yaw();
        assert!(
            (yaw_after_first + 10.0 * options.mouse_sensitivity).abs() < 1e-6
        );

        controller.update(&mut camera, 0.016);
        assert_eq!(camera.yaw(), yaw_after_first);
    }
}
