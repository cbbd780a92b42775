use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::camera::CameraAction;

/// Maps physical key strings to [`CameraAction`]s.
///
/// Key strings use the `winit::keyboard::KeyCode` debug format:
/// `"KeyW"`, `"Space"`, `"ShiftLeft"`, etc.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct KeyBindings {
    /// Forward map: key string → action.
    bindings: HashMap<String, CameraAction>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let bindings = HashMap::from([
            ("KeyW".into(), CameraAction::MoveForward),
            ("KeyS".into(), CameraAction::MoveBackward),
            ("KeyA".into(), CameraAction::StrafeLeft),
            ("KeyD".into(), CameraAction::StrafeRight),
            ("Space".into(), CameraAction::MoveUp),
            ("ShiftLeft".into(), CameraAction::MoveDown),
            ("ArrowLeft".into(), CameraAction::YawLeft),
            ("ArrowRight".into(), CameraAction::YawRight),
            ("ArrowUp".into(), CameraAction::PitchUp),
            ("ArrowDown".into(), CameraAction::PitchDown),
            ("KeyQ".into(), CameraAction::RollLeft),
            ("KeyE".into(), CameraAction::RollRight),
        ]);
        Self { bindings }
    }
}

impl KeyBindings {
    /// Look up the action for a physical key string.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<CameraAction> {
        self.bindings.get(key).copied()
    }

    /// Bind `key` to `action`, replacing any previous binding for the key.
    pub fn bind(&mut self, key: impl Into<String>, action: CameraAction) {
        let _ = self.bindings.insert(key.into(), action);
    }
}
