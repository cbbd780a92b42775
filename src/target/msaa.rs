use super::texture::Attachments;
use super::{
    report, validate_extent, validate_sample_count, AttachmentFormat,
    BlitDestination, BlitRegion, Blitter, RenderTarget, RenderTargetError,
    Slot, TargetPass, TargetState,
};
use crate::gpu::render_context::RenderContext;

/// Multisampled off-screen target.
///
/// Every pass resolves into a single-sample texture. Blits copy that image
/// 1:1, so the region must have exactly the target's size.
#[derive(Debug)]
pub struct MsaaTarget {
    slot: Slot<Attachments>,
}

impl Default for MsaaTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl MsaaTarget {
    /// Uninitialized target.
    pub fn new() -> Self {
        Self {
            slot: Slot::Uninitialized,
        }
    }

    /// Allocate multisampled color and depth textures plus a resolve
    /// texture. Re-initializing a ready target reallocates.
    ///
    /// # Errors
    ///
    /// [`RenderTargetError::UnsupportedSampleCount`] unless `samples` is
    /// above 1 and supported by the adapter, plus the errors of
    /// [`FramebufferTarget::init`](super::FramebufferTarget::init).
    pub fn init(
        &mut self,
        context: &RenderContext,
        width: u32,
        height: u32,
        samples: u32,
    ) -> Result<(), RenderTargetError> {
        let fail = |e| report("msaa", e);
        self.slot.check_alive().map_err(fail)?;
        validate_extent(width, height, context.max_texture_dimension())
            .map_err(fail)?;
        validate_sample_count(samples, context.supported_sample_counts())
            .map_err(fail)?;

        let format = AttachmentFormat {
            color: context.format(),
            samples,
        };
        let attachments = Attachments::allocate(
            &context.device,
            "MSAA Target",
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

    /// Samples per pixel, `None` unless ready.
    pub fn samples(&self) -> Option<u32> {
        self.slot.ready().ok().map(|a| a.format.samples)
    }
}

impl RenderTarget for MsaaTarget {
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
        let samples = self
            .slot
            .ready()
            .map_err(|e| report("msaa", e))?
            .format
            .samples;
        self.init(context, width, height, samples)
    }

    fn bind<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        clear: Option<wgpu::Color>,
    ) -> Result<TargetPass<'e>, RenderTargetError> {
        let attachments = self.slot.ready().map_err(|e| report("msaa", e))?;
        Ok(attachments.begin_pass(encoder, "MSAA Target Pass", clear))
    }

    fn blit(
        &self,
        blitter: &mut Blitter,
        encoder: &mut wgpu::CommandEncoder,
        destination: &BlitDestination<'_>,
        region: BlitRegion,
    ) -> Result<(), RenderTargetError> {
        let fail = |e| report("msaa", e);
        let attachments = self.slot.ready().map_err(fail)?;
        if region.size() != attachments.size() {
            return Err(fail(RenderTargetError::SizeMismatch {
                expected: attachments.size(),
                actual: region.size(),
            }));
        }
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
            log::info!("destroyed msaa target");
        }
    }
}
