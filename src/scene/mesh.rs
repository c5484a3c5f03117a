use crate::core::geometry::Vertex;
use nalgebra::{Point3, Vector2, Vector3};
use std::f32::consts::PI;

/// A collection of vertices and indices representing a 3D object.
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    /// Triangle list, counter-clockwise when seen from the front.
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Builds a UV sphere centered at the origin.
    ///
    /// Longitude starts at -X and sweeps toward +Z (u = 0.25 faces the +Z axis); the
    /// texture's top row maps to the north pole. The degenerate triangles touching each
    /// pole are skipped.
    pub fn create_uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);
        let stride = width_segments + 1;

        let mut vertices = Vec::with_capacity((stride * (height_segments + 1)) as usize);
        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            let theta = v * PI;
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let phi = u * 2.0 * PI;

                let normal = Vector3::new(
                    -phi.cos() * theta.sin(),
                    theta.cos(),
                    phi.sin() * theta.sin(),
                );
                vertices.push(Vertex::new(
                    Point3::from(normal * radius),
                    normal,
                    Vector2::new(u, 1.0 - v),
                ));
            }
        }

        let mut indices = Vec::new();
        for iy in 0..height_segments {
            for ix in 0..width_segments {
                let a = iy * stride + ix + 1;
                let b = iy * stride + ix;
                let c = (iy + 1) * stride + ix;
                let d = (iy + 1) * stride + ix + 1;

                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height_segments - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self::new(vertices, indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_topology() {
        let sphere = Mesh::create_uv_sphere(1.0, 64, 64);
        assert_eq!(sphere.vertices.len(), 65 * 65);
        // Two triangles per quad, minus one per quad on each polar ring.
        assert_eq!(sphere.triangle_count(), 64 * 64 * 2 - 2 * 64);
        assert!(sphere.indices.iter().all(|&i| (i as usize) < sphere.vertices.len()));
    }

    #[test]
    fn vertices_lie_on_the_radius() {
        let sphere = Mesh::create_uv_sphere(1.02, 16, 8);
        for v in &sphere.vertices {
            assert!((v.position.coords.norm() - 1.02).abs() < 1e-5);
            assert!((v.normal.norm() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn triangles_wind_outward() {
        let sphere = Mesh::create_uv_sphere(1.0, 12, 6);
        for tri in sphere.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| sphere.vertices[i as usize].position);
            let face_normal = (b - a).cross(&(c - a));
            let centroid = (a.coords + b.coords + c.coords) / 3.0;
            assert!(face_normal.dot(&centroid) > 0.0);
        }
    }
}
