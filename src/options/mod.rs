//! Centralized rendering options with TOML preset support.
//!
//! Camera, render-target, geometry and key-binding settings are consolidated
//! here. Options serialize to/from TOML so a host can keep presets on disk.

mod camera;
mod geometry;
mod keybindings;
mod render_target;

use std::path::Path;

pub use camera::CameraOptions;
pub use geometry::GeometryOptions;
pub use keybindings::KeyBindings;
pub use render_target::{AntialiasingMode, RenderTargetOptions};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::PrimitivaError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[camera]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Camera projection and control parameters.
    pub camera: CameraOptions,
    /// Off-screen render target parameters.
    pub render_target: RenderTargetOptions,
    /// Procedural mesh detail.
    pub geometry: GeometryOptions,
    /// Keyboard binding options.
    #[schemars(skip)]
    pub keybindings: KeyBindings,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, PrimitivaError> {
        let content =
            std::fs::read_to_string(path).map_err(PrimitivaError::Io)?;
        toml::from_str(&content)
            .map_err(|e| PrimitivaError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), PrimitivaError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| PrimitivaError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(PrimitivaError::Io)?;
        }
        std::fs::write(path, content).map_err(PrimitivaError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}
