use glam::{BVec3, Vec3};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Per-axis restriction applied to camera displacement.
///
/// The camera sums its pending movement into a world-space displacement and
/// passes it through [`MovementPolicy::apply`] before adding it to the
/// position. Disabling an axis pins that world coordinate, which is how a
/// walking camera keeps its eye height while looking up or down.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
pub struct MovementPolicy {
    /// Allow movement along world X.
    pub x: bool,
    /// Allow movement along world Y.
    pub y: bool,
    /// Allow movement along world Z.
    pub z: bool,
}

impl MovementPolicy {
    /// Unrestricted flight.
    pub const FREE: Self = Self {
        x: true,
        y: true,
        z: true,
    };

    /// Walking: height is locked.
    pub const GROUND: Self = Self {
        x: true,
        y: false,
        z: true,
    };

    /// Zero out the disabled components of `displacement`.
    #[inline]
    pub fn apply(self, displacement: Vec3) -> Vec3 {
        Vec3::select(
            BVec3::new(self.x, self.y, self.z),
            displacement,
            Vec3::ZERO,
        )
    }
}

impl Default for MovementPolicy {
    fn default() -> Self {
        Self::FREE
    }
}
