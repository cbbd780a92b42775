//! Geometry upload and draw calls.
//!
//! [`Renderer`] owns the camera uniform, the mesh shader and a cache of
//! render pipelines keyed by topology and attachment format. Meshes are
//! uploaded once with [`Renderer::prepare`] and drawn into any open
//! [`TargetPass`]; the pass carries the color format and sample count, so
//! the same mesh can be drawn to the screen, an MSAA target or an SSAA
//! target without the caller picking pipelines.

mod gpu_mesh;

use glam::Mat4;
use rustc_hash::FxHashMap;
use wgpu::util::DeviceExt;

pub use gpu_mesh::{GpuMesh, ModelUniform};

use crate::camera::{Camera, CameraUniform};
use crate::gpu::dynamic_buffer::TypedBuffer;
use crate::gpu::pipeline_helpers;
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::{ShaderComposer, ShaderError};
use crate::mesh::{Mesh, MeshError, Topology, Vertex};
use crate::object::Object3D;
use crate::target::{AttachmentFormat, Blitter, TargetPass};

/// Pipelines differ only in primitive topology and attachment format.
type PipelineKey = (Topology, AttachmentFormat);

/// Uploads meshes and records draw calls.
pub struct Renderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    composer: ShaderComposer,
    shader: wgpu::ShaderModule,
    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    model_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: FxHashMap<PipelineKey, wgpu::RenderPipeline>,
    format: wgpu::TextureFormat,
    blitter: Blitter,
}

impl Renderer {
    /// Compose the built-in shaders and create the shared GPU state.
    ///
    /// # Errors
    ///
    /// Returns [`ShaderError`] if a built-in shader fails to compose.
    pub fn new(context: &RenderContext) -> Result<Self, ShaderError> {
        let device = &context.device;
        let mut composer = ShaderComposer::new()?;
        let shader = composer.compose(
            device,
            "Mesh Shader",
            include_str!("../../assets/shaders/raster/mesh.wgsl"),
            "raster/mesh.wgsl",
        )?;
        let blitter = Blitter::new(context, &mut composer)?;

        let camera_uniform = CameraUniform::new();
        let camera_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Buffer"),
                contents: bytemuck::cast_slice(&[camera_uniform]),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });
        let camera_layout =
            pipeline_helpers::uniform_layout(device, "Camera Layout");
        let camera_bind_group = pipeline_helpers::uniform_bind_group(
            device,
            "Camera Bind Group",
            &camera_layout,
            &camera_buffer,
        );
        let model_layout =
            pipeline_helpers::uniform_layout(device, "Model Layout");
        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Mesh Pipeline Layout"),
                bind_group_layouts: &[&camera_layout, &model_layout],
                push_constant_ranges: &[],
            });

        log::info!("renderer ready for {:?}", context.format());
        Ok(Self {
            device: device.clone(),
            queue: context.queue.clone(),
            composer,
            shader,
            camera_uniform,
            camera_buffer,
            camera_bind_group,
            model_layout,
            pipeline_layout,
            pipelines: FxHashMap::default(),
            format: context.format(),
            blitter,
        })
    }

    /// Compose a WGSL source that may `#import` the shared
    /// `primitiva::camera` and `primitiva::fullscreen` modules.
    ///
    /// # Errors
    ///
    /// Returns [`ShaderError`] with `path` and the composer diagnostic.
    pub fn new_shader(
        &mut self,
        label: &str,
        source: &str,
        path: &str,
    ) -> Result<wgpu::ShaderModule, ShaderError> {
        self.composer.compose(&self.device, label, source, path)
    }

    /// Draw meshes with `shader` from now on. It must expose `vs_main` and
    /// `fs_main` with the built-in mesh shader's vertex layout and bind
    /// groups. `path` names the shader in errors.
    ///
    /// The shader is linked into a pipeline for the context format before
    /// it is accepted; on failure the current shader stays in use.
    ///
    /// # Errors
    ///
    /// Returns [`ShaderError`] with the device's validation message if the
    /// shader does not link against the mesh pipeline.
    pub fn set_mesh_shader(
        &mut self,
        path: &str,
        shader: wgpu::ShaderModule,
    ) -> Result<(), ShaderError> {
        let key = (
            Topology::TriangleList,
            AttachmentFormat {
                color: self.format,
                samples: 1,
            },
        );
        let pipeline =
            create_mesh_pipeline(&self.device, &self.pipeline_layout, &shader, key)
                .map_err(|message| ShaderError {
                    path: path.to_owned(),
                    message,
                })
                .inspect_err(|e| log::error!("{e}"))?;

        self.shader = shader;
        self.pipelines.clear();
        let _ = self.pipelines.insert(key, pipeline);
        log::debug!("mesh shader replaced by {path}, pipeline cache cleared");
        Ok(())
    }

    /// Upload `mesh` with an identity model matrix.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError`] if the mesh fails [`Mesh::validate`].
    pub fn prepare(&self, mesh: &Mesh) -> Result<GpuMesh, MeshError> {
        mesh.validate().inspect_err(|e| log::warn!("rejecting mesh: {e}"))?;

        let vertices = TypedBuffer::new_with_data(
            &self.device,
            "Mesh Vertices",
            &mesh.vertices(),
            wgpu::BufferUsages::VERTEX,
        );
        let indices = TypedBuffer::new_with_data(
            &self.device,
            "Mesh Indices",
            &mesh.indices,
            wgpu::BufferUsages::INDEX,
        );
        let model_buffer =
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Model Buffer"),
                    contents: bytemuck::cast_slice(&[ModelUniform::from_model(
                        Mat4::IDENTITY,
                    )]),
                    usage: wgpu::BufferUsages::UNIFORM
                        | wgpu::BufferUsages::COPY_DST,
                });
        let model_bind_group = pipeline_helpers::uniform_bind_group(
            &self.device,
            "Model Bind Group",
            &self.model_layout,
            &model_buffer,
        );

        log::debug!(
            "prepared mesh: {} vertices, {} indices, {:?}",
            mesh.vertex_count(),
            mesh.indices.len(),
            mesh.topology
        );
        Ok(GpuMesh {
            vertices,
            indices,
            topology: mesh.topology,
            model_buffer,
            model_bind_group,
        })
    }

    /// Replace the geometry of an uploaded mesh, growing its buffers if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError`] if the mesh fails [`Mesh::validate`]; the GPU
    /// copy is left untouched.
    pub fn update_mesh(
        &self,
        gpu_mesh: &mut GpuMesh,
        mesh: &Mesh,
    ) -> Result<(), MeshError> {
        mesh.validate().inspect_err(|e| log::warn!("rejecting mesh: {e}"))?;
        let _ = gpu_mesh
            .vertices
            .write(&self.device, &self.queue, &mesh.vertices());
        let _ = gpu_mesh.indices.write(&self.device, &self.queue, &mesh.indices);
        gpu_mesh.topology = mesh.topology;
        Ok(())
    }

    /// Set the model matrix used when drawing `gpu_mesh`.
    pub fn set_transform(&self, gpu_mesh: &GpuMesh, model: Mat4) {
        self.queue.write_buffer(
            &gpu_mesh.model_buffer,
            0,
            bytemuck::cast_slice(&[ModelUniform::from_model(model)]),
        );
    }

    /// Set the model matrix from an object's transform, folding in its
    /// pending rotation.
    pub fn update_object(&self, gpu_mesh: &GpuMesh, object: &mut Object3D) {
        self.set_transform(gpu_mesh, object.model_matrix());
    }

    /// Upload the camera's view-projection, flushing its pending movement
    /// and rotation.
    pub fn update_camera(&mut self, camera: &mut Camera) {
        self.camera_uniform.update(camera);
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera_uniform]),
        );
    }

    /// Record a draw of `mesh` into `pass`, creating the pipeline for the
    /// pass's attachment format on first use. If that pipeline fails
    /// validation the error is logged and the draw is skipped.
    pub fn draw(&mut self, pass: &mut TargetPass<'_>, mesh: &GpuMesh) {
        if mesh.index_count() == 0 {
            return;
        }
        let key = (mesh.topology, pass.format());
        if !self.pipelines.contains_key(&key) {
            match create_mesh_pipeline(
                &self.device,
                &self.pipeline_layout,
                &self.shader,
                key,
            ) {
                Ok(pipeline) => {
                    let _ = self.pipelines.insert(key, pipeline);
                }
                Err(message) => {
                    log::error!("skipping draw, mesh pipeline invalid: {message}");
                    return;
                }
            }
        }
        let Some(pipeline) = self.pipelines.get(&key) else {
            return;
        };

        let rpass = pass.render_pass();
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, &self.camera_bind_group, &[]);
        rpass.set_bind_group(1, &mesh.model_bind_group, &[]);
        rpass.set_vertex_buffer(0, mesh.vertices.buffer().slice(..));
        rpass.set_index_buffer(
            mesh.indices.buffer().slice(..),
            wgpu::IndexFormat::Uint32,
        );
        rpass.draw_indexed(0..mesh.index_count(), 0, 0..1);
    }

    /// Shared blitter for copying targets to the screen.
    pub fn blitter(&mut self) -> &mut Blitter {
        &mut self.blitter
    }

    /// Number of cached mesh pipelines.
    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }
}

/// Build a mesh pipeline inside a validation error scope, returning the
/// device's message if it is rejected.
fn create_mesh_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    (topology, format): PipelineKey,
) -> Result<wgpu::RenderPipeline, String> {
    log::debug!(
        "creating mesh pipeline: {topology:?}, {:?}, {} sample(s)",
        format.color,
        format.samples
    );
    let strip_index_format = match topology {
        Topology::TriangleStrip => Some(wgpu::IndexFormat::Uint32),
        Topology::TriangleList => None,
    };
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Mesh Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: format.color,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: topology.to_wgpu(),
            strip_index_format,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(pipeline_helpers::depth_stencil_state()),
        multisample: wgpu::MultisampleState {
            count: format.samples,
            ..Default::default()
        },
        multiview: None,
        cache: None,
    });
    match pollster::block_on(device.pop_error_scope()) {
        Some(error) => Err(error.to_string()),
        None => Ok(pipeline),
    }
}
