use super::texture::Attachments;
use super::{
    report, validate_extent, AttachmentFormat, BlitDestination, BlitRegion,
    Blitter, RenderTarget, RenderTargetError, Slot, TargetPass, TargetState,
};
use crate::gpu::{pipeline_helpers::DEPTH_FORMAT, render_context::RenderContext};

/// Single-sampled off-screen target.
///
/// Blits scale to any region size with nearest filtering. The depth buffer
/// can be copied out with [`blit_depth`](Self::blit_depth).
#[derive(Debug)]
pub struct FramebufferTarget {
    slot: Slot<Attachments>,
}

impl Default for FramebufferTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl FramebufferTarget {
    /// Uninitialized target.
    pub fn new() -> Self {
        Self {
            slot: Slot::Uninitialized,
        }
    }

    /// Allocate color and depth textures at `width` x `height` in the
    /// context's color format. Re-initializing a ready target reallocates.
    ///
    /// # Errors
    ///
    /// [`RenderTargetError::Incomplete`] for a zero or oversized extent,
    /// [`RenderTargetError::Destroyed`] after `destroy`,
    /// [`RenderTargetError::Allocation`] if the device rejects the textures.
    pub fn init(
        &mut self,
        context: &RenderContext,
        width: u32,
        height: u32,
    ) -> Result<(), RenderTargetError> {
        let fail = |e| report("framebuffer", e);
        self.slot.check_alive().map_err(fail)?;
        validate_extent(width, height, context.max_texture_dimension())
            .map_err(fail)?;

        let format = AttachmentFormat {
            color: context.format(),
            samples: 1,
        };
        let attachments = Attachments::allocate(
            &context.device,
            "Framebuffer Target",
            (width, height),
            format,
        )
        .map_err(fail)?;

        if let Slot::Ready(old) = &self.slot {
            old.destroy();
        }
        self.slot = Slot::Ready(attachments);
        Ok(())
    }

    /// Copy the depth buffer into `destination`, which must be a
    /// same-sized depth texture with `COPY_DST` usage.
    ///
    /// # Errors
    ///
    /// Fails if the target is not ready or the destination format or size
    /// differs.
    pub fn blit_depth(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        destination: &wgpu::Texture,
    ) -> Result<(), RenderTargetError> {
        let fail = |e| report("framebuffer", e);
        let attachments = self.slot.ready().map_err(fail)?;
        if destination.format() != DEPTH_FORMAT {
            return Err(fail(RenderTargetError::FormatMismatch {
                expected: DEPTH_FORMAT,
                actual: destination.format(),
            }));
        }
        let size = attachments.size();
        let actual = (destination.width(), destination.height());
        if actual != size {
            return Err(fail(RenderTargetError::SizeMismatch {
                expected: size,
                actual,
            }));
        }

        encoder.copy_texture_to_texture(
            attachments.depth.texture.as_image_copy(),
            destination.as_image_copy(),
            wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
        );
        Ok(())
    }
}

impl RenderTarget for FramebufferTarget {
    fn state(&self) -> TargetState {
        self.slot.state()
    }

    fn size(&self) -> Option<(u32, u32)> {
        self.slot.ready().ok().map(Attachments::size)
    }

    fn resize(
        &mut self,
        context: &RenderContext,
        width: u32,
        height: u32,
    ) -> Result<(), RenderTargetError> {
        let _ = self.slot.ready().map_err(|e| report("framebuffer", e))?;
        self.init(context, width, height)
    }

    fn bind<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        clear: Option<wgpu::Color>,
    ) -> Result<TargetPass<'e>, RenderTargetError> {
        let attachments =
            self.slot.ready().map_err(|e| report("framebuffer", e))?;
        Ok(attachments.begin_pass(encoder, "Framebuffer Target Pass", clear))
    }

    fn blit(
        &self,
        blitter: &mut Blitter,
        encoder: &mut wgpu::CommandEncoder,
        destination: &BlitDestination<'_>,
        region: BlitRegion,
    ) -> Result<(), RenderTargetError> {
        let fail = |e| report("framebuffer", e);
        let attachments = self.slot.ready().map_err(fail)?;
        region.fits_within(destination.size()).map_err(fail)?;
        blitter.copy(
            encoder,
            &attachments.sampled().view,
            destination,
            region,
            wgpu::FilterMode::Nearest,
        );
        Ok(())
    }

    fn destroy(&mut self) {
        if let Some(attachments) = self.slot.take_for_destroy() {
            attachments.destroy();
            log::info!("destroyed framebuffer target");
        }
    }
}
