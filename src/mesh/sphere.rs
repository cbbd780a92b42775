//! Unit sphere projected from a subdivided cube.

use glam::{Vec2, Vec3};

use super::{Mesh, MeshError, Topology};

/// Highest accepted subdivision level (`2^7` segments per cube edge).
pub const MAX_SPHERE_LEVEL: u32 = 7;

/// Square perimeter corners in (x, z), walked counter-clockwise seen from +Y.
const CORNERS: [Vec2; 4] = [
    Vec2::new(-1.0, 1.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(1.0, -1.0),
    Vec2::new(-1.0, -1.0),
];

/// Point on the perimeter of the `[-1, 1]` square for `column` of `4n`.
fn perimeter(column: u32, n: u32) -> Vec2 {
    let edge = (column / n) as usize % 4;
    let t = (column % n) as f32 / n as f32;
    CORNERS[edge].lerp(CORNERS[(edge + 1) % 4], t)
}

/// Unit sphere as a single triangle strip.
///
/// With `n = 2^level` segments per cube edge, the cube surface is cut into
/// rings of `4n` columns: `c = max(n / 2, 1)` top-cap rings from the pole
/// outward, `n + 1` side rows from top to bottom, then `c` bottom-cap rings
/// back in to the pole. Each ring point is normalized onto the sphere, so
/// normals equal positions. Colors map position from `[-1, 1]` to `[0, 1]`.
pub fn sphere(level: u32) -> Result<Mesh, MeshError> {
    if level > MAX_SPHERE_LEVEL {
        log::warn!(
            "rejecting sphere level {level}, maximum is {MAX_SPHERE_LEVEL}"
        );
        return Err(MeshError::LevelTooHigh(level));
    }

    let n = 1_u32 << level;
    let columns = 4 * n;
    let caps = (n / 2).max(1);

    // (scale of the square, height) per ring, top to bottom.
    let rings: Vec<(f32, f32)> = (0..caps)
        .map(|k| (k as f32 / caps as f32, 1.0))
        .chain((0..=n).map(|k| (1.0, 1.0 - 2.0 * k as f32 / n as f32)))
        .chain((0..caps).map(|k| ((caps - 1 - k) as f32 / caps as f32, -1.0)))
        .collect();

    let mut mesh = Mesh::new(Topology::TriangleStrip);
    let vertex_count = rings.len() * columns as usize;
    mesh.positions.reserve(vertex_count);
    mesh.colors.reserve(vertex_count);
    mesh.normals.reserve(vertex_count);

    for &(scale, y) in &rings {
        for column in 0..columns {
            let xz = perimeter(column, n) * scale;
            let p = Vec3::new(xz.x, y, xz.y).normalize();
            let _ = mesh.push_vertex(p, p * 0.5 + 0.5, p);
        }
    }

    let at = |ring: u32, column: u32| ring * columns + column;
    let bands = rings.len() as u32 - 1;
    mesh.indices.reserve((bands * (2 * columns + 4)) as usize);
    for r in 0..bands {
        if r > 0 {
            mesh.indices.push(at(r, 0));
            mesh.indices.push(at(r, 0));
        }
        for column in (0..columns).chain(std::iter::once(0)) {
            mesh.indices.push(at(r, column));
            mesh.indices.push(at(r + 1, column));
        }
    }

    log::trace!(
        "sphere level {level}: {} vertices, {} indices",
        mesh.positions.len(),
        mesh.indices.len()
    );
    Ok(mesh)
}
