//! Sphere mesh generation by recursive subdivision.
//!
//! The unit octahedron is split into four triangles per level, with every new
//! edge midpoint pushed back onto the unit sphere. The result is a flat
//! triangle soup: three vertices per triangle, no index buffer.
//!
//! ```ignore
//! let mesh = SphereMesh::generate(6)?;
//! assert_eq!(mesh.triangle_count(), 8 * 4usize.pow(6));
//! ```

use glam::Vec3;

use crate::error::{Result, SceneError};

/// Number of faces of the base octahedron.
pub const BASE_FACES: usize = 8;

/// Highest accepted subdivision depth (8 * 4^10 = ~8.4M triangles).
pub const MAX_SUBDIVISION_DEPTH: u32 = 10;

/// Immutable vertex data for a unit sphere.
///
/// `positions` and `normals` are flat `f32` sequences grouped in triples,
/// ready to upload as two vertex buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct SphereMesh {
    positions: Vec<f32>,
    normals: Vec<f32>,
    triangle_count: usize,
}

impl SphereMesh {
    /// Generate a sphere subdivided `depth` times.
    ///
    /// Returns [`SceneError::InvalidArgument`] when `depth` exceeds
    /// [`MAX_SUBDIVISION_DEPTH`].
    pub fn generate(depth: u32) -> Result<Self> {
        if depth > MAX_SUBDIVISION_DEPTH {
            return Err(SceneError::InvalidArgument(format!(
                "subdivision depth {} exceeds maximum {}",
                depth, MAX_SUBDIVISION_DEPTH
            )));
        }

        let triangle_count = BASE_FACES * 4usize.pow(depth);
        let mut mesh = Self {
            positions: Vec::with_capacity(triangle_count * 9),
            normals: Vec::with_capacity(triangle_count * 9),
            triangle_count: 0,
        };

        for [a, b, c] in octahedron() {
            mesh.divide_triangle(a, b, c, depth);
        }

        log::info!(
            "Generated sphere mesh: depth {}, {} triangles",
            depth,
            mesh.triangle_count
        );
        Ok(mesh)
    }

    fn divide_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3, depth: u32) {
        if depth == 0 {
            self.push_triangle(a, b, c);
            return;
        }

        let ab = a.lerp(b, 0.5).normalize();
        let ac = a.lerp(c, 0.5).normalize();
        let bc = b.lerp(c, 0.5).normalize();

        self.divide_triangle(a, ab, ac, depth - 1);
        self.divide_triangle(ab, b, bc, depth - 1);
        self.divide_triangle(bc, c, ac, depth - 1);
        self.divide_triangle(ab, bc, ac, depth - 1);
    }

    fn push_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) {
        for v in [a, b, c] {
            self.positions.extend_from_slice(&v.to_array());
            // On a unit sphere the normal is the position itself.
            self.normals.extend_from_slice(&v.normalize().to_array());
        }
        self.triangle_count += 1;
    }

    /// Flat vertex positions, three floats per vertex.
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Flat vertex normals, three floats per vertex.
    pub fn normals(&self) -> &[f32] {
        &self.normals
    }

    /// Number of triangles in the soup.
    pub fn triangle_count(&self) -> usize {
        self.triangle_count
    }

    /// Number of vertices (three per triangle).
    pub fn vertex_count(&self) -> usize {
        self.triangle_count * 3
    }
}

/// The eight faces of the unit octahedron, wound counter-clockwise from outside.
fn octahedron() -> [[Vec3; 3]; BASE_FACES] {
    let (px, nx) = (Vec3::X, Vec3::NEG_X);
    let (py, ny) = (Vec3::Y, Vec3::NEG_Y);
    let (pz, nz) = (Vec3::Z, Vec3::NEG_Z);

    [
        [py, pz, px],
        [py, nx, pz],
        [py, nz, nx],
        [py, px, nz],
        [ny, px, pz],
        [ny, pz, nx],
        [ny, nx, nz],
        [ny, nz, px],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertices(data: &[f32]) -> impl Iterator<Item = Vec3> + '_ {
        data.chunks_exact(3).map(Vec3::from_slice)
    }

    #[test]
    fn test_triangle_count_grows_by_four() {
        for depth in 0..=4 {
            let mesh = SphereMesh::generate(depth).unwrap();
            assert_eq!(mesh.triangle_count(), 8 * 4usize.pow(depth));
            assert_eq!(mesh.positions().len(), mesh.triangle_count() * 9);
            assert_eq!(mesh.normals().len(), mesh.positions().len());
        }
    }

    #[test]
    fn test_vertices_on_unit_sphere() {
        let mesh = SphereMesh::generate(3).unwrap();
        for v in vertices(mesh.positions()) {
            assert!((v.length() - 1.0).abs() < 1e-5, "vertex {:?} off sphere", v);
        }
    }

    #[test]
    fn test_normals_match_positions() {
        let mesh = SphereMesh::generate(2).unwrap();
        for (p, n) in vertices(mesh.positions()).zip(vertices(mesh.normals())) {
            assert!((p.normalize() - n).length() < 1e-6);
        }
    }

    #[test]
    fn test_base_faces_point_outward() {
        let mesh = SphereMesh::generate(0).unwrap();
        for tri in mesh.positions().chunks_exact(9) {
            let a = Vec3::from_slice(&tri[0..3]);
            let b = Vec3::from_slice(&tri[3..6]);
            let c = Vec3::from_slice(&tri[6..9]);
            let face_normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(face_normal.dot(centroid) > 0.0);
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        assert_eq!(SphereMesh::generate(3).unwrap(), SphereMesh::generate(3).unwrap());
    }

    #[test]
    fn test_depth_above_maximum_rejected() {
        let err = SphereMesh::generate(MAX_SUBDIVISION_DEPTH + 1).unwrap_err();
        assert!(matches!(err, SceneError::InvalidArgument(_)));
    }
}
