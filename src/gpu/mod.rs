//! GPU resource management utilities.
//!
//! Provides wgpu device/surface initialization, growable buffers, shared
//! pipeline boilerplate and shader composition.

/// Growable GPU buffers with automatic reallocation.
pub mod dynamic_buffer;
/// Shared wgpu boilerplate for the mesh and blit pipelines.
pub mod pipeline_helpers;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// WGSL shader composition with `#import` support via naga-oil.
pub mod shader_composer;

pub use render_context::{RenderContext, RenderContextError};
pub use shader_composer::{ShaderComposer, ShaderError};
