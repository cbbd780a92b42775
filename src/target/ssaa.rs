use super::texture::Attachments;
use super::{
    report, scaled_extent, AttachmentFormat, BlitDestination, BlitRegion,
    Blitter, RenderTarget, RenderTargetError, Slot, TargetPass, TargetState,
};
use crate::gpu::render_context::RenderContext;

/// Supersampled target state: textures at the scaled extent plus the
/// output size they downsample to.
#[derive(Debug)]
struct Supersampled {
    attachments: Attachments,
    output: (u32, u32),
    factor: u32,
}

/// Off-screen target rendered at `factor` times the output resolution.
///
/// Blits downsample with linear filtering and may target any region size.
/// A factor of 2 makes each output pixel the exact average of a 2x2 block.
#[derive(Debug)]
pub struct SsaaTarget {
    slot: Slot<Supersampled>,
}

impl Default for SsaaTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl SsaaTarget {
    /// Uninitialized target.
    pub fn new() -> Self {
        Self {
            slot: Slot::Uninitialized,
        }
    }

    /// Allocate color and depth textures at `width * factor` x
    /// `height * factor`. Re-initializing a ready target reallocates.
    ///
    /// # Errors
    ///
    /// [`RenderTargetError::InvalidFactor`] for a zero factor,
    /// [`RenderTargetError::Incomplete`] if the output or scaled extent is
    /// zero or exceeds the device limit, plus the lifecycle and allocation
    /// errors of the other variants.
    pub fn init(
        &mut self,
        context: &RenderContext,
        width: u32,
        height: u32,
        factor: u32,
    ) -> Result<(), RenderTargetError> {
        let fail = |e| report("ssaa", e);
        self.slot.check_alive().map_err(fail)?;
        let scaled =
            scaled_extent(width, height, factor, context.max_texture_dimension())
                .map_err(fail)?;

        let format = AttachmentFormat {
            color: context.format(),
            samples: 1,
        };
        let attachments = Attachments::allocate(
            &context.device,
            "SSAA Target",
            scaled,
            format,
        )
        .map_err(fail)?;

        if let Slot::Ready(old) = &self.slot {
            old.attachments.destroy();
        }
        self.slot = Slot::Ready(Supersampled {
            attachments,
            output: (width, height),
            factor,
        });
        Ok(())
    }

    /// Supersampling factor, `None` unless ready.
    pub fn factor(&self) -> Option<u32> {
        self.slot.ready().ok().map(|s| s.factor)
    }

    /// Size of the textures actually drawn into, `None` unless ready.
    pub fn render_size(&self) -> Option<(u32, u32)> {
        self.slot.ready().ok().map(|s| s.attachments.size())
    }
}

impl RenderTarget for SsaaTarget {
    fn state(&self) -> TargetState {
        self.slot.state()
    }

    fn size(&self) -> Option<(u32, u32)> {
        self.slot.ready().ok().map(|s| s.output)
    }

    fn resize(
        &mut self,
        context: &RenderContext,
        width: u32,
        height: u32,
    ) -> Result<(), RenderTargetError> {
        let factor =
            self.slot.ready().map_err(|e| report("ssaa", e))?.factor;
        self.init(context, width, height, factor)
    }

    fn bind<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        clear: Option<wgpu::Color>,
    ) -> Result<TargetPass<'e>, RenderTargetError> {
        let state = self.slot.ready().map_err(|e| report("ssaa", e))?;
        Ok(state
            .attachments
            .begin_pass(encoder, "SSAA Target Pass", clear))
    }

    fn blit(
        &self,
        blitter: &mut Blitter,
        encoder: &mut wgpu::CommandEncoder,
        destination: &BlitDestination<'_>,
        region: BlitRegion,
    ) -> Result<(), RenderTargetError> {
        let fail = |e| report("ssaa", e);
        let state = self.slot.ready().map_err(fail)?;
        region.fits_within(destination.size()).map_err(fail)?;
        blitter.copy(
            encoder,
            &state.attachments.sampled().view,
            destination,
            region,
            wgpu::FilterMode::Linear,
        );
        Ok(())
    }

    fn destroy(&mut self) {
        if let Some(state) = self.slot.take_for_destroy() {
            state.attachments.destroy();
            log::info!("destroyed ssaa target");
        }
    }
}
