use super::texture::{begin_pass, TargetTexture};
use super::{
    report, validate_extent, AttachmentFormat, BlitDestination,
    RenderTargetError, TargetPass,
};
use crate::gpu::{pipeline_helpers::DEPTH_FORMAT, render_context::RenderContext};

/// Depth buffer for drawing straight into a surface texture.
///
/// The color view comes from the swapchain each frame, so only depth is
/// owned here. Call [`resize`](Self::resize) whenever the surface is
/// reconfigured.
#[derive(Debug)]
pub struct ScreenTarget {
    depth: TargetTexture,
    format: AttachmentFormat,
}

impl ScreenTarget {
    /// Depth buffer matching the context's current surface size.
    ///
    /// # Errors
    ///
    /// [`RenderTargetError::Incomplete`] for a zero or oversized surface,
    /// [`RenderTargetError::Allocation`] if the device rejects the texture.
    pub fn new(context: &RenderContext) -> Result<Self, RenderTargetError> {
        let (width, height) = context.size();
        Ok(Self {
            depth: allocate_depth(context, width, height)?,
            format: AttachmentFormat {
                color: context.format(),
                samples: 1,
            },
        })
    }

    /// Reallocate the depth buffer for a new surface size.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new); the old buffer is kept on failure.
    pub fn resize(
        &mut self,
        context: &RenderContext,
        width: u32,
        height: u32,
    ) -> Result<(), RenderTargetError> {
        if self.depth.size() != (width, height) {
            let depth = allocate_depth(context, width, height)?;
            self.depth.texture.destroy();
            self.depth = depth;
        }
        self.format.color = context.format();
        Ok(())
    }

    /// Depth buffer size.
    pub fn size(&self) -> (u32, u32) {
        self.depth.size()
    }

    /// Begin a pass into `surface_view` with this depth buffer.
    ///
    /// # Errors
    ///
    /// [`RenderTargetError::SizeMismatch`] if `surface` differs in size
    /// from the depth buffer.
    pub fn bind<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        surface: &BlitDestination<'_>,
        clear: Option<wgpu::Color>,
    ) -> Result<TargetPass<'e>, RenderTargetError> {
        if surface.size() != self.size() {
            return Err(report(
                "screen",
                RenderTargetError::SizeMismatch {
                    expected: self.size(),
                    actual: surface.size(),
                },
            ));
        }
        let pass = begin_pass(
            encoder,
            "Screen Pass",
            surface.view,
            None,
            &self.depth.view,
            clear,
            self.size(),
        );
        Ok(TargetPass::new(
            pass,
            AttachmentFormat {
                color: surface.format,
                samples: 1,
            },
        ))
    }

    /// Attachment format of passes begun with [`bind`](Self::bind) on a
    /// surface of the context's format.
    pub fn attachment_format(&self) -> AttachmentFormat {
        self.format
    }
}

fn allocate_depth(
    context: &RenderContext,
    width: u32,
    height: u32,
) -> Result<TargetTexture, RenderTargetError> {
    validate_extent(width, height, context.max_texture_dimension())
        .map_err(|e| report("screen", e))?;
    let device = &context.device;
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let depth = TargetTexture::new(
        device,
        "Screen Depth",
        (width, height),
        DEPTH_FORMAT,
        1,
    );
    if let Some(error) = pollster::block_on(device.pop_error_scope()) {
        return Err(report(
            "screen",
            RenderTargetError::Allocation(error.to_string()),
        ));
    }
    log::info!("allocated screen depth buffer {width}x{height}");
    Ok(depth)
}
