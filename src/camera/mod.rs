//! Camera system for 3D scene viewing.
//!
//! Provides a free-flying perspective camera with lazily cached matrices,
//! per-axis movement restriction, a keyboard/mouse controller and the GPU
//! uniform layout.

/// Key/mouse driven camera controller.
pub mod controller;
/// Core camera struct.
pub mod core;
/// Per-axis movement restriction.
pub mod movement;
/// GPU uniform layout for camera matrices.
pub mod uniform;

pub use controller::{CameraAction, CameraController};
pub use self::core::Camera;
pub use movement::MovementPolicy;
pub use uniform::CameraUniform;
