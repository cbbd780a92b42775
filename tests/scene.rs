//! End-to-end scene tests: camera, objects and meshes on the CPU, then a
//! full bind/draw/blit frame on a headless GPU when one is available.

use glam::{Vec3, Vec4Swizzles};
use primitiva::camera::{Camera, CameraController};
use primitiva::gpu::RenderContext;
use primitiva::mesh::{cube, sphere, PlaneBuilder, PlaneDesc};
use primitiva::object::Object3D;
use primitiva::options::{AntialiasingMode, Options, RenderTargetOptions};
use primitiva::renderer::Renderer;
use primitiva::target::{
    create_target, BlitDestination, BlitRegion, FramebufferTarget, MsaaTarget,
    RenderTarget, RenderTargetError, ScreenTarget, SsaaTarget, TargetState,
};

const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
const SIZE: u32 = 64;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn headless() -> Option<RenderContext> {
    init_logging();
    match pollster::block_on(RenderContext::headless(FORMAT, SIZE, SIZE)) {
        Ok(context) => Some(context),
        Err(e) => {
            log::warn!("skipping GPU test: {e}");
            None
        }
    }
}

fn scene_camera(options: &Options) -> Camera {
    Camera::looking_at(
        Vec3::new(0.0, 0.0, 3.0),
        Vec3::ZERO,
        Vec3::Y,
        &options.camera,
        1.0,
    )
}

fn destination_texture(context: &RenderContext) -> wgpu::Texture {
    context.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Test Destination"),
        size: wgpu::Extent3d {
            width: SIZE,
            height: SIZE,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}

/// Copy `texture` to the CPU as tightly packed RGBA8 rows.
fn read_pixels(context: &RenderContext, texture: &wgpu::Texture) -> Vec<u8> {
    let bytes_per_row = SIZE * 4;
    let buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Readback"),
        size: u64::from(bytes_per_row * SIZE),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });
    let mut encoder = context.create_encoder();
    encoder.copy_texture_to_buffer(
        texture.as_image_copy(),
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(SIZE),
            },
        },
        texture.size(),
    );
    context.submit(encoder);

    buffer.slice(..).map_async(wgpu::MapMode::Read, |r| r.unwrap());
    let _ = context.device.poll(wgpu::PollType::Wait).unwrap();
    let pixels = buffer.slice(..).get_mapped_range().to_vec();
    buffer.unmap();
    pixels
}

fn pixel(pixels: &[u8], x: u32, y: u32) -> [u8; 4] {
    let i = ((y * SIZE + x) * 4) as usize;
    [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
}

#[test]
fn camera_projects_object_to_screen_centre() {
    let options = Options::default();
    let mut camera = scene_camera(&options);
    let mut object = Object3D::at(Vec3::new(0.0, 0.0, -1.0));
    object.rotate_yaw(0.4);

    let clip = camera.view_projection()
        * object.model_matrix()
        * Vec3::ZERO.extend(1.0);
    let ndc = clip.xyz() / clip.w;
    assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
    assert!((0.0..1.0).contains(&ndc.z));
}

#[test]
fn controller_drives_camera_from_bindings() {
    let options = Options::default();
    let mut camera = scene_camera(&options);
    let mut controller = CameraController::new(&options.camera);

    assert!(controller.handle_key(&options.keybindings, "KeyW", true));
    controller.update(&mut camera, 0.25);
    let _ = camera.view();

    let travelled = 3.0 - camera.position().z;
    assert!((travelled - options.camera.move_speed * 0.25).abs() < 1e-5);
    assert_eq!(camera.pending_movement(), Vec3::ZERO);
}

#[test]
fn generated_meshes_share_one_vertex_layout() {
    let mut planes = PlaneBuilder::new();
    planes.add_plane(&PlaneDesc::default()).unwrap();
    planes
        .add_plane(&PlaneDesc {
            horizontal: 8,
            vertical: 3,
            ..PlaneDesc::default()
        })
        .unwrap();

    for mesh in [cube(), sphere(3).unwrap(), planes.into_mesh()] {
        mesh.validate().unwrap();
        assert_eq!(mesh.vertices().len(), mesh.vertex_count());
    }
}

#[test]
fn geometry_options_drive_mesh_detail() {
    let options: Options = toml::from_str(
        "[geometry]\nsphere_level = 2\nplane_samples = 5\n",
    )
    .unwrap();
    let level = options.geometry.sphere_level;
    let samples = options.geometry.plane_samples;

    let globe = sphere(level).unwrap();
    let n = 1_usize << level;
    assert_eq!(globe.vertex_count(), 4 * n * (n + 1 + 2 * (n / 2).max(1)));

    let mut planes = PlaneBuilder::new();
    planes
        .add_plane(&PlaneDesc {
            horizontal: samples,
            vertical: samples,
            ..PlaneDesc::default()
        })
        .unwrap();
    assert_eq!(planes.mesh().vertex_count(), (samples * samples) as usize);
}

#[test]
fn screen_target_draws_into_surface_sized_view() {
    let Some(context) = headless() else { return };
    let mut renderer = Renderer::new(&context).unwrap();
    let mut screen = ScreenTarget::new(&context).unwrap();
    assert_eq!(screen.size(), context.size());

    let texture = destination_texture(&context);
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let surface = BlitDestination::new(&texture, &view);
    let gpu_cube = renderer.prepare(&cube()).unwrap();

    let mut encoder = context.create_encoder();
    let mut pass = screen
        .bind(&mut encoder, &surface, Some(wgpu::Color::BLACK))
        .unwrap();
    assert_eq!(pass.format(), screen.attachment_format());
    renderer.draw(&mut pass, &gpu_cube);
    pass.end();
    context.submit(encoder);

    screen.resize(&context, SIZE / 2, SIZE).unwrap();
    let mut encoder = context.create_encoder();
    assert!(matches!(
        screen.bind(&mut encoder, &surface, None),
        Err(RenderTargetError::SizeMismatch { .. })
    ));
}

#[test]
fn zero_sized_targets_fail_without_panicking() {
    let Some(context) = headless() else { return };

    let mut plain = FramebufferTarget::new();
    assert!(matches!(
        plain.init(&context, 0, SIZE),
        Err(RenderTargetError::Incomplete { width: 0, .. })
    ));
    assert_eq!(plain.state(), TargetState::Uninitialized);

    let mut msaa = MsaaTarget::new();
    assert!(msaa.init(&context, SIZE, 0, 4).is_err());
    assert!(matches!(
        msaa.init(&context, SIZE, SIZE, 3),
        Err(RenderTargetError::UnsupportedSampleCount { requested: 3, .. })
    ));

    let mut ssaa = SsaaTarget::new();
    assert_eq!(
        ssaa.init(&context, SIZE, SIZE, 0),
        Err(RenderTargetError::InvalidFactor(0))
    );
    let limit = context.max_texture_dimension();
    assert!(ssaa.init(&context, limit, 1, 2).is_err());
    assert_eq!(ssaa.state(), TargetState::Uninitialized);
}

#[test]
fn msaa_blit_requires_matching_size() {
    let Some(context) = headless() else { return };
    let Some(&samples) =
        context.supported_sample_counts().iter().find(|&&s| s > 1)
    else {
        return;
    };
    let mut renderer = Renderer::new(&context).unwrap();
    let mut target = MsaaTarget::new();
    target.init(&context, SIZE, SIZE, samples).unwrap();

    let texture = destination_texture(&context);
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let destination = BlitDestination::new(&texture, &view);
    let mut encoder = context.create_encoder();

    assert_eq!(
        target.blit(
            renderer.blitter(),
            &mut encoder,
            &destination,
            BlitRegion::new(0, 0, SIZE / 2, SIZE / 2),
        ),
        Err(RenderTargetError::SizeMismatch {
            expected: (SIZE, SIZE),
            actual: (SIZE / 2, SIZE / 2),
        })
    );
    target
        .blit(
            renderer.blitter(),
            &mut encoder,
            &destination,
            BlitRegion::full((SIZE, SIZE)),
        )
        .unwrap();
    context.submit(encoder);
}

#[test]
fn rendered_cube_reaches_destination() {
    let Some(context) = headless() else { return };
    let options = Options::default();
    let mut renderer = Renderer::new(&context).unwrap();
    let mut camera = scene_camera(&options);
    let gpu_cube = renderer.prepare(&cube()).unwrap();
    let mut object = Object3D::new();
    renderer.update_object(&gpu_cube, &mut object);
    renderer.update_camera(&mut camera);

    let mut target = FramebufferTarget::new();
    target.init(&context, SIZE, SIZE).unwrap();
    let texture = destination_texture(&context);
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let destination = BlitDestination::new(&texture, &view);

    let mut encoder = context.create_encoder();
    let mut pass = target.bind(&mut encoder, Some(wgpu::Color::BLACK)).unwrap();
    renderer.draw(&mut pass, &gpu_cube);
    target.unbind(pass);
    target
        .blit(
            renderer.blitter(),
            &mut encoder,
            &destination,
            BlitRegion::full((SIZE, SIZE)),
        )
        .unwrap();
    context.submit(encoder);

    let pixels = read_pixels(&context, &texture);
    let centre = pixel(&pixels, SIZE / 2, SIZE / 2);
    assert_ne!(&centre[..3], &[0, 0, 0], "cube missing at centre");
    assert_eq!(pixel(&pixels, 0, 0), [0, 0, 0, 255]);
    assert_eq!(renderer.pipeline_count(), 1);
}

#[test]
fn every_target_kind_draws_and_blits() {
    let Some(context) = headless() else { return };
    let options = Options::default();
    let mut renderer = Renderer::new(&context).unwrap();
    let mut camera = scene_camera(&options);
    renderer.update_camera(&mut camera);
    let gpu_sphere = renderer.prepare(&sphere(2).unwrap()).unwrap();

    let texture = destination_texture(&context);
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let destination = BlitDestination::new(&texture, &view);

    for antialiasing in [
        AntialiasingMode::None,
        AntialiasingMode::Msaa,
        AntialiasingMode::Ssaa,
    ] {
        let target_options = RenderTargetOptions {
            antialiasing,
            msaa_samples: 4,
            ..RenderTargetOptions::default()
        };
        let mut target =
            match create_target(&context, &target_options, SIZE, SIZE) {
                Ok(target) => target,
                Err(RenderTargetError::UnsupportedSampleCount { .. }) => {
                    continue
                }
                Err(e) => panic!("{antialiasing:?}: {e}"),
            };
        assert_eq!(target.size(), Some((SIZE, SIZE)));

        let mut encoder = context.create_encoder();
        let mut pass = target
            .bind(&mut encoder, Some(target_options.clear()))
            .unwrap();
        renderer.draw(&mut pass, &gpu_sphere);
        target.unbind(pass);

        let out_of_bounds = BlitRegion::new(SIZE / 2, 0, SIZE, SIZE);
        assert!(matches!(
            target.blit(
                renderer.blitter(),
                &mut encoder,
                &destination,
                out_of_bounds
            ),
            Err(RenderTargetError::OutOfBounds { .. })
        ));
        target
            .blit(
                renderer.blitter(),
                &mut encoder,
                &destination,
                BlitRegion::full((SIZE, SIZE)),
            )
            .unwrap();
        context.submit(encoder);

        target.resize(&context, SIZE / 2, SIZE / 2).unwrap();
        assert_eq!(target.size(), Some((SIZE / 2, SIZE / 2)));

        target.destroy();
        target.destroy();
        assert_eq!(target.state(), TargetState::Destroyed);
        let mut encoder = context.create_encoder();
        assert!(matches!(
            target.bind(&mut encoder, None),
            Err(RenderTargetError::Destroyed)
        ));
        assert_eq!(
            target.resize(&context, SIZE, SIZE),
            Err(RenderTargetError::Destroyed)
        );
    }
}

fn depth_texture(context: &RenderContext, size: (u32, u32)) -> wgpu::Texture {
    context.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Copy"),
        size: wgpu::Extent3d {
            width: size.0,
            height: size.1,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    })
}

#[test]
fn plain_target_copies_depth() {
    let Some(context) = headless() else { return };
    let mut target = FramebufferTarget::new();
    target.init(&context, SIZE, SIZE).unwrap();

    let mut encoder = context.create_encoder();
    let depth = depth_texture(&context, (SIZE, SIZE));
    target.blit_depth(&mut encoder, &depth).unwrap();

    let wrong = destination_texture(&context);
    assert!(matches!(
        target.blit_depth(&mut encoder, &wrong),
        Err(RenderTargetError::FormatMismatch { .. })
    ));
    let smaller = depth_texture(&context, (SIZE / 2, SIZE));
    assert_eq!(
        target.blit_depth(&mut encoder, &smaller),
        Err(RenderTargetError::SizeMismatch {
            expected: (SIZE, SIZE),
            actual: (SIZE / 2, SIZE),
        })
    );
    context.submit(encoder);
}

#[test]
fn destroyed_targets_refuse_init() {
    let Some(context) = headless() else { return };

    let mut plain = FramebufferTarget::new();
    plain.init(&context, SIZE, SIZE).unwrap();
    plain.destroy();
    assert_eq!(
        plain.init(&context, SIZE, SIZE),
        Err(RenderTargetError::Destroyed)
    );
    assert_eq!(plain.state(), TargetState::Destroyed);

    let mut ssaa = SsaaTarget::new();
    ssaa.destroy();
    assert_eq!(
        ssaa.init(&context, SIZE, SIZE, 2),
        Err(RenderTargetError::Destroyed)
    );

    let mut msaa = MsaaTarget::new();
    msaa.destroy();
    assert_eq!(
        msaa.init(&context, SIZE, SIZE, 4),
        Err(RenderTargetError::Destroyed)
    );
}

const VERTEX_ONLY_SHADER: &str = r#"
#import primitiva::camera::CameraUniform

@group(0) @binding(0) var<uniform> camera: CameraUniform;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return camera.view_proj * vec4<f32>(position, 1.0);
}
"#;

const FLAT_SHADER: &str = r#"
#import primitiva::camera::CameraUniform

@group(0) @binding(0) var<uniform> camera: CameraUniform;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return camera.view_proj * vec4<f32>(position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 0.0, 0.0, 1.0);
}
"#;

#[test]
fn mesh_shader_without_fragment_stage_is_rejected() {
    let Some(context) = headless() else { return };
    let options = Options::default();
    let mut renderer = Renderer::new(&context).unwrap();
    let mut camera = scene_camera(&options);
    renderer.update_camera(&mut camera);
    let gpu_cube = renderer.prepare(&cube()).unwrap();

    let broken = renderer
        .new_shader("Vertex Only", VERTEX_ONLY_SHADER, "custom/vertex_only.wgsl")
        .unwrap();
    let error = renderer
        .set_mesh_shader("custom/vertex_only.wgsl", broken)
        .unwrap_err();
    assert_eq!(error.path, "custom/vertex_only.wgsl");
    assert!(error.message.contains("fs_main"), "{}", error.message);

    // The built-in shader stays in use and still draws.
    let mut target = FramebufferTarget::new();
    target.init(&context, SIZE, SIZE).unwrap();
    let mut encoder = context.create_encoder();
    let mut pass = target.bind(&mut encoder, Some(wgpu::Color::BLACK)).unwrap();
    renderer.draw(&mut pass, &gpu_cube);
    target.unbind(pass);
    context.submit(encoder);
    assert_eq!(renderer.pipeline_count(), 1);

    let flat = renderer
        .new_shader("Flat", FLAT_SHADER, "custom/flat.wgsl")
        .unwrap();
    renderer.set_mesh_shader("custom/flat.wgsl", flat).unwrap();

    let texture = destination_texture(&context);
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let destination = BlitDestination::new(&texture, &view);
    let mut encoder = context.create_encoder();
    let mut pass = target.bind(&mut encoder, Some(wgpu::Color::BLACK)).unwrap();
    renderer.draw(&mut pass, &gpu_cube);
    target.unbind(pass);
    target
        .blit(
            renderer.blitter(),
            &mut encoder,
            &destination,
            BlitRegion::full((SIZE, SIZE)),
        )
        .unwrap();
    context.submit(encoder);

    let centre = pixel(&read_pixels(&context, &texture), SIZE / 2, SIZE / 2);
    assert_eq!(centre, [255, 0, 0, 255]);
}
