//! Texture allocation shared by the target variants.

use super::{AttachmentFormat, RenderTargetError, TargetPass};
use crate::gpu::pipeline_helpers::DEPTH_FORMAT;

/// A render-target texture and its default view.
#[derive(Debug)]
pub(crate) struct TargetTexture {
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
}

impl TargetTexture {
    pub(crate) fn new(
        device: &wgpu::Device,
        label: &str,
        (width, height): (u32, u32),
        format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> Self {
        // Multisampled textures can only be rendered to and resolved.
        let usage = if sample_count > 1 {
            wgpu::TextureUsages::RENDER_ATTACHMENT
        } else {
            wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    pub(crate) fn size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }
}

/// Color, optional resolve and depth textures of one off-screen target.
#[derive(Debug)]
pub(crate) struct Attachments {
    /// Drawn into; multisampled for MSAA.
    pub(crate) color: TargetTexture,
    /// Single-sample resolve destination, MSAA only.
    pub(crate) resolve: Option<TargetTexture>,
    pub(crate) depth: TargetTexture,
    pub(crate) format: AttachmentFormat,
}

impl Attachments {
    /// Allocate inside a validation error scope so device rejections come
    /// back as errors instead of uncaptured-error callbacks.
    pub(crate) fn allocate(
        device: &wgpu::Device,
        label: &str,
        size: (u32, u32),
        format: AttachmentFormat,
    ) -> Result<Self, RenderTargetError> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let color = TargetTexture::new(
            device,
            &format!("{label} Color"),
            size,
            format.color,
            format.samples,
        );
        let resolve = (format.samples > 1).then(|| {
            TargetTexture::new(
                device,
                &format!("{label} Resolve"),
                size,
                format.color,
                1,
            )
        });
        let depth = TargetTexture::new(
            device,
            &format!("{label} Depth"),
            size,
            DEPTH_FORMAT,
            format.samples,
        );

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(RenderTargetError::Allocation(error.to_string()));
        }
        log::info!(
            "allocated {label}: {}x{} {:?}, {} sample(s)",
            size.0,
            size.1,
            format.color,
            format.samples
        );
        Ok(Self {
            color,
            resolve,
            depth,
            format,
        })
    }

    /// Drawn-into size.
    pub(crate) fn size(&self) -> (u32, u32) {
        self.color.size()
    }

    /// The single-sample image to read back from.
    pub(crate) fn sampled(&self) -> &TargetTexture {
        self.resolve.as_ref().unwrap_or(&self.color)
    }

    /// Begin a pass into these attachments with a full-extent viewport.
    pub(crate) fn begin_pass<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        label: &str,
        clear: Option<wgpu::Color>,
    ) -> TargetPass<'e> {
        let pass = begin_pass(
            encoder,
            label,
            &self.color.view,
            self.resolve.as_ref().map(|r| &r.view),
            &self.depth.view,
            clear,
            self.size(),
        );
        TargetPass::new(pass, self.format)
    }

    pub(crate) fn destroy(&self) {
        self.color.texture.destroy();
        if let Some(resolve) = &self.resolve {
            resolve.texture.destroy();
        }
        self.depth.texture.destroy();
    }
}

/// Begin a render pass on explicit views and set the viewport to `size`.
pub(crate) fn begin_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    label: &str,
    color: &wgpu::TextureView,
    resolve: Option<&wgpu::TextureView>,
    depth: &wgpu::TextureView,
    clear: Option<wgpu::Color>,
    (width, height): (u32, u32),
) -> wgpu::RenderPass<'e> {
    let (color_load, depth_load) = match clear {
        Some(color) => (wgpu::LoadOp::Clear(color), wgpu::LoadOp::Clear(1.0)),
        None => (wgpu::LoadOp::Load, wgpu::LoadOp::Load),
    };
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: color,
            depth_slice: None,
            resolve_target: resolve,
            ops: wgpu::Operations {
                load: color_load,
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: depth,
            depth_ops: Some(wgpu::Operations {
                load: depth_load,
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
    });
    pass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);
    pass
}
