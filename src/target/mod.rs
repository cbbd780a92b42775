//! Off-screen render targets.
//!
//! Every target owns a color and a depth texture and moves through
//! `Uninitialized -> Ready -> Destroyed`. [`RenderTarget::bind`] begins a
//! render pass into the target and hands back a [`TargetPass`] carrying the
//! attachment format, so pipelines can be matched to it;
//! [`RenderTarget::unbind`] ends the pass. [`RenderTarget::blit`] copies the
//! finished color image into a [`BlitDestination`] such as the swapchain.
//!
//! Three variants differ in how the color image is produced and copied out:
//!
//! - [`FramebufferTarget`]: single-sampled, any-size blit with nearest
//!   filtering, optional depth copy.
//! - [`MsaaTarget`]: multisampled, resolved at the end of every pass; blits
//!   only at 1:1 size.
//! - [`SsaaTarget`]: rendered at an integer multiple of the output size and
//!   downsampled with linear filtering on blit.
//!
//! [`ScreenTarget`] provides the depth buffer for drawing straight to a
//! surface texture.

mod blit;
mod framebuffer;
mod msaa;
mod screen;
mod ssaa;
mod texture;

use std::fmt;

pub use blit::{BlitDestination, BlitRegion, Blitter};
pub use framebuffer::FramebufferTarget;
pub use msaa::MsaaTarget;
pub use screen::ScreenTarget;
pub use ssaa::SsaaTarget;

use crate::gpu::render_context::RenderContext;
use crate::options::{AntialiasingMode, RenderTargetOptions};

/// Errors from render-target allocation and use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderTargetError {
    /// Zero or oversized extent.
    Incomplete {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
        /// Device limit per dimension.
        max: u32,
    },
    /// MSAA sample count the adapter does not support.
    UnsupportedSampleCount {
        /// Requested count.
        requested: u32,
        /// Counts the adapter reports.
        supported: Vec<u32>,
    },
    /// Supersampling factor below 1.
    InvalidFactor(u32),
    /// Target used before a successful `init`.
    NotReady,
    /// Target used after `destroy`.
    Destroyed,
    /// Sizes that must match do not.
    SizeMismatch {
        /// Size the operation needs.
        expected: (u32, u32),
        /// Size it got.
        actual: (u32, u32),
    },
    /// Texture formats that must match do not.
    FormatMismatch {
        /// Format the operation needs.
        expected: wgpu::TextureFormat,
        /// Format it got.
        actual: wgpu::TextureFormat,
    },
    /// Blit region empty or not inside the destination.
    OutOfBounds {
        /// Requested region.
        region: BlitRegion,
        /// Destination size.
        destination: (u32, u32),
    },
    /// The device rejected texture creation.
    Allocation(String),
}

impl fmt::Display for RenderTargetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Incomplete { width, height, max } => write!(
                f,
                "incomplete target: {width}x{height} (each side must be in \
                 1..={max})"
            ),
            Self::UnsupportedSampleCount {
                requested,
                supported,
            } => write!(
                f,
                "sample count {requested} not supported (supported: \
                 {supported:?})"
            ),
            Self::InvalidFactor(factor) => {
                write!(f, "supersampling factor {factor} must be at least 1")
            }
            Self::NotReady => write!(f, "render target is not initialized"),
            Self::Destroyed => write!(f, "render target was destroyed"),
            Self::SizeMismatch { expected, actual } => write!(
                f,
                "size mismatch: expected {}x{}, got {}x{}",
                expected.0, expected.1, actual.0, actual.1
            ),
            Self::FormatMismatch { expected, actual } => write!(
                f,
                "format mismatch: expected {expected:?}, got {actual:?}"
            ),
            Self::OutOfBounds {
                region,
                destination,
            } => write!(
                f,
                "blit region {}x{} at ({}, {}) outside {}x{} destination",
                region.width,
                region.height,
                region.x,
                region.y,
                destination.0,
                destination.1
            ),
            Self::Allocation(message) => {
                write!(f, "texture allocation failed: {message}")
            }
        }
    }
}

impl std::error::Error for RenderTargetError {}

/// Lifecycle state of a render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    /// Created, not yet allocated.
    Uninitialized,
    /// Textures allocated; bind, unbind and blit are allowed.
    Ready,
    /// Textures released; the target cannot be used again.
    Destroyed,
}

/// Color format and sample count of the attachments a pass draws into.
/// Depth is always [`DEPTH_FORMAT`](crate::gpu::pipeline_helpers::DEPTH_FORMAT).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttachmentFormat {
    /// Color attachment format.
    pub color: wgpu::TextureFormat,
    /// Samples per pixel.
    pub samples: u32,
}

/// An open render pass into a target, tagged with its attachment format.
pub struct TargetPass<'e> {
    pass: wgpu::RenderPass<'e>,
    format: AttachmentFormat,
}

impl<'e> TargetPass<'e> {
    pub(crate) fn new(
        pass: wgpu::RenderPass<'e>,
        format: AttachmentFormat,
    ) -> Self {
        Self { pass, format }
    }

    /// Attachment format pipelines must match.
    pub fn format(&self) -> AttachmentFormat {
        self.format
    }

    /// The underlying wgpu pass, for custom draws.
    pub fn render_pass(&mut self) -> &mut wgpu::RenderPass<'e> {
        &mut self.pass
    }

    /// End the pass.
    pub fn end(self) {
        drop(self.pass);
    }
}

/// Common interface of the off-screen targets.
pub trait RenderTarget {
    /// Current lifecycle state.
    fn state(&self) -> TargetState;

    /// Output size in pixels, `None` unless ready.
    fn size(&self) -> Option<(u32, u32)>;

    /// Reallocate at a new output size, keeping the sample count or
    /// supersampling factor.
    ///
    /// # Errors
    ///
    /// Same as the variant's `init`.
    fn resize(
        &mut self,
        context: &RenderContext,
        width: u32,
        height: u32,
    ) -> Result<(), RenderTargetError>;

    /// Begin a render pass into this target with the viewport covering the
    /// whole color attachment. `clear` clears color and depth; `None` keeps
    /// the previous contents.
    ///
    /// # Errors
    ///
    /// [`RenderTargetError::NotReady`] or [`RenderTargetError::Destroyed`].
    fn bind<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        clear: Option<wgpu::Color>,
    ) -> Result<TargetPass<'e>, RenderTargetError>;

    /// End a pass begun by [`bind`](Self::bind).
    fn unbind(&self, pass: TargetPass<'_>) {
        pass.end();
    }

    /// Copy the color image into `region` of `destination`.
    ///
    /// # Errors
    ///
    /// Fails if the target is not ready, the region is empty or outside the
    /// destination, or the variant cannot scale to the region size.
    fn blit(
        &self,
        blitter: &mut Blitter,
        encoder: &mut wgpu::CommandEncoder,
        destination: &BlitDestination<'_>,
        region: BlitRegion,
    ) -> Result<(), RenderTargetError>;

    /// Release all GPU textures. Idempotent.
    fn destroy(&mut self);
}

/// Create and initialize the target kind selected in `options`.
///
/// # Errors
///
/// Propagates the chosen variant's `init` error.
pub fn create_target(
    context: &RenderContext,
    options: &RenderTargetOptions,
    width: u32,
    height: u32,
) -> Result<Box<dyn RenderTarget>, RenderTargetError> {
    Ok(match options.antialiasing {
        AntialiasingMode::None => {
            let mut target = FramebufferTarget::new();
            target.init(context, width, height)?;
            Box::new(target)
        }
        AntialiasingMode::Msaa => {
            let mut target = MsaaTarget::new();
            target.init(context, width, height, options.msaa_samples)?;
            Box::new(target)
        }
        AntialiasingMode::Ssaa => {
            let mut target = SsaaTarget::new();
            target.init(context, width, height, options.ssaa_factor)?;
            Box::new(target)
        }
    })
}

/// Reject zero or oversized extents.
///
/// # Errors
///
/// [`RenderTargetError::Incomplete`].
pub fn validate_extent(
    width: u32,
    height: u32,
    max: u32,
) -> Result<(), RenderTargetError> {
    if width == 0 || height == 0 || width > max || height > max {
        return Err(RenderTargetError::Incomplete { width, height, max });
    }
    Ok(())
}

/// Accept a multisample count only if it is above 1 and in `supported`.
///
/// # Errors
///
/// [`RenderTargetError::UnsupportedSampleCount`].
pub fn validate_sample_count(
    samples: u32,
    supported: &[u32],
) -> Result<(), RenderTargetError> {
    if samples > 1 && supported.contains(&samples) {
        return Ok(());
    }
    Err(RenderTargetError::UnsupportedSampleCount {
        requested: samples,
        supported: supported.iter().copied().filter(|&s| s > 1).collect(),
    })
}

/// Internal extent of a supersampled target.
///
/// # Errors
///
/// [`RenderTargetError::InvalidFactor`] for a zero factor,
/// [`RenderTargetError::Incomplete`] if either side is zero or the scaled
/// extent exceeds `max`.
pub fn scaled_extent(
    width: u32,
    height: u32,
    factor: u32,
    max: u32,
) -> Result<(u32, u32), RenderTargetError> {
    if factor == 0 {
        return Err(RenderTargetError::InvalidFactor(factor));
    }
    validate_extent(width, height, max)?;
    match (width.checked_mul(factor), height.checked_mul(factor)) {
        (Some(w), Some(h)) if w <= max && h <= max => Ok((w, h)),
        _ => Err(RenderTargetError::Incomplete {
            width: width.saturating_mul(factor),
            height: height.saturating_mul(factor),
            max,
        }),
    }
}

/// Storage shared by the off-screen variants: allocated resources plus the
/// lifecycle state.
#[derive(Debug)]
pub(crate) enum Slot<T> {
    Uninitialized,
    Ready(T),
    Destroyed,
}

impl<T> Slot<T> {
    pub(crate) fn state(&self) -> TargetState {
        match self {
            Self::Uninitialized => TargetState::Uninitialized,
            Self::Ready(_) => TargetState::Ready,
            Self::Destroyed => TargetState::Destroyed,
        }
    }

    pub(crate) fn ready(&self) -> Result<&T, RenderTargetError> {
        match self {
            Self::Ready(resources) => Ok(resources),
            Self::Uninitialized => Err(RenderTargetError::NotReady),
            Self::Destroyed => Err(RenderTargetError::Destroyed),
        }
    }

    /// Fail if the slot can no longer be (re)initialized.
    pub(crate) fn check_alive(&self) -> Result<(), RenderTargetError> {
        match self {
            Self::Destroyed => Err(RenderTargetError::Destroyed),
            _ => Ok(()),
        }
    }

    /// Move to `Destroyed`, returning resources that were allocated.
    pub(crate) fn take_for_destroy(&mut self) -> Option<T> {
        match std::mem::replace(self, Self::Destroyed) {
            Self::Ready(resources) => Some(resources),
            _ => None,
        }
    }
}

/// Log a failure at the point of detection and hand it back.
pub(crate) fn report(kind: &str, error: RenderTargetError) -> RenderTargetError {
    log::error!("{kind} target: {error}");
    error
}
