//! Fullscreen-triangle copies from a target's color image into a
//! destination rectangle.

use rustc_hash::FxHashMap;

use super::RenderTargetError;
use crate::gpu::{
    pipeline_helpers, render_context::RenderContext,
    shader_composer::{ShaderComposer, ShaderError},
};

/// Pixel rectangle in a blit destination, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlitRegion {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl BlitRegion {
    /// Region at `(x, y)` of the given size.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Region covering a whole `(width, height)` surface.
    pub const fn full((width, height): (u32, u32)) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Region size.
    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Check the region is non-empty and inside a `destination`-sized
    /// surface.
    ///
    /// # Errors
    ///
    /// [`RenderTargetError::OutOfBounds`].
    pub fn fits_within(
        &self,
        destination: (u32, u32),
    ) -> Result<(), RenderTargetError> {
        let inside = |start: u32, len: u32, limit: u32| {
            len > 0 && start.checked_add(len).is_some_and(|end| end <= limit)
        };
        if inside(self.x, self.width, destination.0)
            && inside(self.y, self.height, destination.1)
        {
            Ok(())
        } else {
            Err(RenderTargetError::OutOfBounds {
                region: *self,
                destination,
            })
        }
    }
}

/// Where a blit draws: a color view plus the format and size of the texture
/// behind it.
#[derive(Debug, Clone, Copy)]
pub struct BlitDestination<'a> {
    /// View to draw into.
    pub view: &'a wgpu::TextureView,
    /// Format of the viewed texture.
    pub format: wgpu::TextureFormat,
    /// Texture width.
    pub width: u32,
    /// Texture height.
    pub height: u32,
}

impl<'a> BlitDestination<'a> {
    /// Destination from a texture and one of its views.
    pub fn new(texture: &wgpu::Texture, view: &'a wgpu::TextureView) -> Self {
        Self {
            view,
            format: texture.format(),
            width: texture.width(),
            height: texture.height(),
        }
    }

    /// Destination size.
    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Owns the blit shader, samplers and one pipeline per destination format.
pub struct Blitter {
    device: wgpu::Device,
    shader: wgpu::ShaderModule,
    layout: wgpu::BindGroupLayout,
    nearest: wgpu::Sampler,
    linear: wgpu::Sampler,
    pipelines: FxHashMap<wgpu::TextureFormat, wgpu::RenderPipeline>,
}

impl Blitter {
    /// Compose the blit shader and create the samplers.
    ///
    /// # Errors
    ///
    /// Returns [`ShaderError`] if the blit shader fails to compose.
    pub fn new(
        context: &RenderContext,
        composer: &mut ShaderComposer,
    ) -> Result<Self, ShaderError> {
        let device = &context.device;
        let shader = composer.compose(
            device,
            "Blit Shader",
            include_str!("../../assets/shaders/screen/blit.wgsl"),
            "screen/blit.wgsl",
        )?;
        let layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Blit Bind Group Layout"),
                entries: &[
                    pipeline_helpers::texture_2d(0),
                    pipeline_helpers::filtering_sampler(1),
                ],
            });
        Ok(Self {
            device: device.clone(),
            shader,
            layout,
            nearest: pipeline_helpers::clamped_sampler(
                device,
                "Blit Nearest Sampler",
                wgpu::FilterMode::Nearest,
            ),
            linear: pipeline_helpers::clamped_sampler(
                device,
                "Blit Linear Sampler",
                wgpu::FilterMode::Linear,
            ),
            pipelines: FxHashMap::default(),
        })
    }

    /// Draw `source` stretched over `region` of `destination`. The region
    /// must already be validated.
    pub(crate) fn copy(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        source: &wgpu::TextureView,
        destination: &BlitDestination<'_>,
        region: BlitRegion,
        filter: wgpu::FilterMode,
    ) {
        let sampler = if filter == wgpu::FilterMode::Linear {
            &self.linear
        } else {
            &self.nearest
        };
        let bind_group =
            self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Blit Bind Group"),
                layout: &self.layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(source),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                ],
            });

        let pipeline = self
            .pipelines
            .entry(destination.format)
            .or_insert_with(|| {
                log::debug!(
                    "creating blit pipeline for {:?}",
                    destination.format
                );
                pipeline_helpers::create_screen_space_pipeline(
                    &self.device,
                    "Blit",
                    &self.shader,
                    destination.format,
                    &[&self.layout],
                )
            });

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Blit Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: destination.view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_viewport(
            region.x as f32,
            region.y as f32,
            region.width as f32,
            region.height as f32,
            0.0,
            1.0,
        );
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}
