//! Benchmarks for procedural mesh generation and camera matrix rebuilds.
#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use primitiva::camera::Camera;
use primitiva::mesh::{sphere, PlaneBuilder, PlaneDesc};

fn sphere_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("sphere");
    for level in [2, 4, 6] {
        let _ = group.bench_function(format!("level_{level}"), |b| {
            b.iter(|| black_box(sphere(black_box(level))));
        });
    }
    group.finish();
}

fn plane_benchmark(c: &mut Criterion) {
    let desc = PlaneDesc {
        horizontal: 64,
        vertical: 64,
        ..PlaneDesc::default()
    };
    let _ = c.bench_function("plane_64x64_x6", |b| {
        b.iter(|| {
            let mut builder = PlaneBuilder::new();
            for _ in 0..6 {
                let _ = builder.add_plane(black_box(&desc));
            }
            black_box(builder.into_mesh())
        });
    });
}

fn camera_benchmark(c: &mut Criterion) {
    let mut camera = Camera::default();
    let _ = c.bench_function("camera_move_rotate_view", |b| {
        b.iter(|| {
            camera.forward(black_box(0.01));
            camera.right(black_box(0.02));
            camera.rotate_yaw(black_box(0.001));
            camera.rotate_pitch(black_box(0.0005));
            black_box(camera.view_projection())
        });
    });
}

criterion_group!(benches, sphere_benchmark, plane_benchmark, camera_benchmark);
criterion_main!(benches);
