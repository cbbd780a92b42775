//! Angle normalization.

use std::f32::consts::{PI, TAU};

/// Wrap an angle in radians into `[-π, π)`.
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    // rem_euclid can round up to TAU for inputs just below a multiple of it
    if wrapped >= PI {
        wrapped - TAU
    } else {
        wrapped
    }
}
