//! Crate-level error types.

use std::fmt;

use crate::gpu::render_context::RenderContextError;
use crate::gpu::shader_composer::ShaderError;
use crate::mesh::MeshError;
use crate::target::RenderTargetError;

/// Errors produced by the primitiva crate.
#[derive(Debug)]
pub enum PrimitivaError {
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// Shader composition failure.
    Shader(ShaderError),
    /// Render-target allocation or usage failure.
    RenderTarget(RenderTargetError),
    /// Invalid procedural mesh parameters or malformed mesh data.
    Mesh(MeshError),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
}

impl fmt::Display for PrimitivaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::Shader(e) => write!(f, "shader error: {e}"),
            Self::RenderTarget(e) => write!(f, "render target error: {e}"),
            Self::Mesh(e) => write!(f, "mesh error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
        }
    }
}

impl std::error::Error for PrimitivaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Shader(e) => Some(e),
            Self::RenderTarget(e) => Some(e),
            Self::Mesh(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::OptionsParse(_) => None,
        }
    }
}

impl From<RenderContextError> for PrimitivaError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<ShaderError> for PrimitivaError {
    fn from(e: ShaderError) -> Self {
        Self::Shader(e)
    }
}

impl From<RenderTargetError> for PrimitivaError {
    fn from(e: RenderTargetError) -> Self {
        Self::RenderTarget(e)
    }
}

impl From<MeshError> for PrimitivaError {
    fn from(e: MeshError) -> Self {
        Self::Mesh(e)
    }
}

impl From<std::io::Error> for PrimitivaError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
