//! Unit cube.

use glam::Vec3;

use super::{Mesh, Topology};

/// Two counter-clockwise triangles per face, corners numbered by octant
/// bits (x = 1, y = 2, z = 4).
const CUBE_INDICES: [u32; 36] = [
    5, 1, 3, 5, 3, 7, // +X
    0, 4, 6, 0, 6, 2, // -X
    6, 7, 3, 6, 3, 2, // +Y
    0, 1, 5, 0, 5, 4, // -Y
    4, 5, 7, 4, 7, 6, // +Z
    1, 0, 2, 1, 2, 3, // -Z
];

/// Cube centred on the origin with edge length 1.
///
/// Eight shared corners, each colored by its octant (positive x is red,
/// positive y green, positive z blue) with a normal pointing away from the
/// centre. The index buffer is a 36-entry triangle list.
pub fn cube() -> Mesh {
    let mut mesh = Mesh::new(Topology::TriangleList);
    for corner in 0..8_u32 {
        let octant = Vec3::new(
            (corner & 1) as f32,
            ((corner >> 1) & 1) as f32,
            ((corner >> 2) & 1) as f32,
        );
        let position = octant - Vec3::splat(0.5);
        let _ = mesh.push_vertex(position, octant, position.normalize());
    }
    mesh.indices.extend_from_slice(&CUBE_INDICES);
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_are_fixed() {
        for _ in 0..3 {
            let mesh = cube();
            assert_eq!(mesh.positions.len(), 8);
            assert_eq!(mesh.colors.len(), 8);
            assert_eq!(mesh.normals.len(), 8);
            assert_eq!(mesh.indices.len(), 36);
            assert_eq!(mesh.triangle_count(), 12);
            assert!(mesh.validate().is_ok());
        }
        assert_eq!(cube(), cube());
    }

    #[test]
    fn triangles_face_outward() {
        let mesh = cube();
        for tri in mesh.indices.chunks_exact(3) {
            let [a, b, c] = [0, 1, 2].map(|k| mesh.positions[tri[k] as usize]);
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0, "inward triangle {tri:?}");
        }
    }

    #[test]
    fn colors_follow_octant() {
        let mesh = cube();
        for (p, c) in mesh.positions.iter().zip(&mesh.colors) {
            assert_eq!(c.x, if p.x > 0.0 { 1.0 } else { 0.0 });
            assert_eq!(c.y, if p.y > 0.0 { 1.0 } else { 0.0 });
            assert_eq!(c.z, if p.z > 0.0 { 1.0 } else { 0.0 });
        }
    }
}
