use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Geometry", inline)]
#[serde(default)]
/// Detail levels for the procedural meshes.
pub struct GeometryOptions {
    /// Sphere subdivision level (vertex count grows as 4^level).
    #[schemars(title = "Sphere Level", range(min = 0, max = 7))]
    pub sphere_level: u32,
    /// Samples along each edge of generated planes.
    #[schemars(title = "Plane Samples", range(min = 2, max = 256))]
    pub plane_samples: u32,
}

impl Default for GeometryOptions {
    fn default() -> Self {
        Self {
            sphere_level: 4,
            plane_samples: 16,
        }
    }
}
