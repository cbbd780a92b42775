use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::camera::MovementPolicy;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Camera", inline)]
#[serde(default)]
/// Camera projection and control parameters.
pub struct CameraOptions {
    /// Vertical field of view in degrees.
    #[schemars(title = "Field of View", range(min = 20.0, max = 120.0), extend("step" = 1.0))]
    pub fovy: f32,
    /// Near clipping plane distance.
    #[schemars(skip)]
    pub znear: f32,
    /// Far clipping plane distance.
    #[schemars(skip)]
    pub zfar: f32,
    /// Movement speed in world units per second.
    #[schemars(title = "Move Speed", range(min = 0.1, max = 50.0), extend("step" = 0.1))]
    pub move_speed: f32,
    /// Keyboard turn speed in radians per second.
    #[schemars(title = "Turn Speed", range(min = 0.1, max = 6.0), extend("step" = 0.1))]
    pub turn_speed: f32,
    /// Mouse look sensitivity in radians per pixel.
    #[schemars(title = "Mouse Sensitivity", range(min = 0.0005, max = 0.02), extend("step" = 0.0005))]
    pub mouse_sensitivity: f32,
    /// Which world axes the camera may move along.
    #[schemars(skip)]
    pub movement: MovementPolicy,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            fovy: 60.0,
            znear: 0.1,
            zfar: 1000.0,
            move_speed: 4.0,
            turn_speed: 1.5,
            mouse_sensitivity: 0.003,
            movement: MovementPolicy::FREE,
        }
    }
}
