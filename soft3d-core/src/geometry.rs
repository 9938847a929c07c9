//! Mesh geometry: triangle faces, vertex attribute buffers, and primitives.

use std::sync::Arc;

use crate::texture::Texture;
use crate::vector::Vec3;

/// A triangle face: three index triples into a mesh's vertex, normal, and
/// texture-coordinate buffers.
///
/// The indices need not agree across the three attributes; a vertex can
/// combine any position with any normal and texture-coordinate slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    pub vertices: [usize; 3],
    pub normals: [usize; 3],
    pub tex_coords: [usize; 3],
}

impl Face {
    pub const fn new(vertices: [usize; 3], normals: [usize; 3], tex_coords: [usize; 3]) -> Self {
        Self {
            vertices,
            normals,
            tex_coords,
        }
    }

    /// A face whose normal and texture-coordinate slots reuse the vertex
    /// indices.
    pub const fn from_vertices(vertices: [usize; 3]) -> Self {
        Self {
            vertices,
            normals: vertices,
            tex_coords: vertices,
        }
    }
}

/// A renderable solid: vertex attribute buffers, triangle faces, a uniform
/// scale, and an optional shared texture.
///
/// The attribute buffers are append-only during construction; normals are
/// additionally rewritten in place by [`Mesh::calculate_normals`].
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub tex_coords: Vec<Vec3>,
    pub faces: Vec<Face>,
    scale: Vec3,
    texture: Option<Arc<Texture>>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            normals: Vec::new(),
            tex_coords: Vec::new(),
            faces: Vec::new(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            texture: None,
        }
    }

    /// The per-axis scale applied to vertices before rotation.
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Sets a uniform scale factor.
    pub fn set_scale(&mut self, scalar: f64) {
        self.scale = Vec3::new(scalar, scalar, scalar);
    }

    pub fn texture(&self) -> Option<&Arc<Texture>> {
        self.texture.as_ref()
    }

    /// Attaches a texture. Textures are shared; several meshes may hold
    /// the same one.
    pub fn set_texture(&mut self, texture: Arc<Texture>) {
        self.texture = Some(texture);
    }

    /// Recomputes every stored normal from the face geometry.
    ///
    /// Each face's non-normalized edge cross product `(v2-v1) × (v3-v1)`
    /// is accumulated into the normal slot of each of its corners, so
    /// larger faces weigh more, and every slot is normalized afterwards.
    /// Face normal indices must point at valid slots; slots no face
    /// references come out as NaN.
    pub fn calculate_normals(&mut self) {
        let mut accumulated = vec![Vec3::ZERO; self.normals.len()];

        for face in &self.faces {
            let v1 = self.vertices[face.vertices[0]];
            let v2 = self.vertices[face.vertices[1]];
            let v3 = self.vertices[face.vertices[2]];
            let face_normal = (v2 - v1).cross(v3 - v1);

            for &slot in &face.normals {
                accumulated[slot] = accumulated[slot] + face_normal;
            }
        }

        for (normal, sum) in self.normals.iter_mut().zip(&accumulated) {
            *normal = sum.normalize();
        }
    }

    /// Builds an axis-aligned box centered on the origin with the given
    /// edge lengths: 8 corners, 12 faces, per-corner texture coordinates,
    /// and freshly calculated smooth normals.
    pub fn cuboid(dimensions: Vec3) -> Mesh {
        let mut mesh = Mesh::new();

        for i in 0..8usize {
            mesh.vertices.push(Vec3::new(
                dimensions.x / 2.0 * if i % 2 == 1 { 1.0 } else { -1.0 },
                dimensions.y / 2.0 * if i % 4 > 1 { 1.0 } else { -1.0 },
                dimensions.z / 2.0 * if i > 3 { 1.0 } else { -1.0 },
            ));
            mesh.normals.push(Vec3::ZERO);
            mesh.tex_coords.push(Vec3::new(
                if (i % 2 == 1) != (i > 3) { 1.0 } else { 0.0 },
                if (i % 4 > 1) != (i > 3) { 1.0 } else { 0.0 },
                0.0,
            ));
        }

        const CORNERS: [[usize; 3]; 12] = [
            [0, 1, 2],
            [2, 1, 3],
            [3, 1, 5],
            [5, 7, 3],
            [3, 7, 2],
            [2, 7, 6],
            [6, 4, 2],
            [2, 4, 0],
            [0, 4, 1],
            [1, 4, 5],
            [5, 4, 7],
            [7, 4, 6],
        ];
        for corners in CORNERS {
            mesh.faces.push(Face::from_vertices(corners));
        }

        mesh.calculate_normals();
        mesh
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cuboid_has_expected_buffers() {
        let mesh = Mesh::cuboid(Vec3::new(2.0, 2.0, 2.0));
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.normals.len(), 8);
        assert_eq!(mesh.tex_coords.len(), 8);
        assert_eq!(mesh.faces.len(), 12);
    }

    #[test]
    fn cuboid_corner_normals_average_incident_faces() {
        let mesh = Mesh::cuboid(Vec3::new(2.0, 2.0, 2.0));

        // Recompute the expectation directly from the faces: each corner's
        // normal is the normalized sum of its incident face cross products.
        let mut sums = vec![Vec3::ZERO; mesh.normals.len()];
        for face in &mesh.faces {
            let v1 = mesh.vertices[face.vertices[0]];
            let v2 = mesh.vertices[face.vertices[1]];
            let v3 = mesh.vertices[face.vertices[2]];
            let cross = (v2 - v1).cross(v3 - v1);
            for &slot in &face.normals {
                sums[slot] = sums[slot] + cross;
            }
        }

        for (i, normal) in mesh.normals.iter().enumerate() {
            assert_relative_eq!(normal.magnitude(), 1.0, epsilon = 1e-9);

            let expected = sums[i].normalize();
            assert_relative_eq!(normal.dot(expected), 1.0, epsilon = 1e-9);

            // A cube corner's smooth normal lies along the corner diagonal.
            let diagonal = mesh.vertices[i].normalize();
            assert_relative_eq!(normal.dot(diagonal).abs(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn recalculation_overwrites_stale_normals() {
        let mut mesh = Mesh::cuboid(Vec3::new(1.0, 1.0, 1.0));
        for normal in &mut mesh.normals {
            *normal = Vec3::new(9.0, 9.0, 9.0);
        }
        mesh.calculate_normals();
        for normal in &mesh.normals {
            assert_relative_eq!(normal.magnitude(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn faces_only_construction_shares_indices() {
        let face = Face::from_vertices([3, 5, 7]);
        assert_eq!(face.normals, [3, 5, 7]);
        assert_eq!(face.tex_coords, [3, 5, 7]);
    }

    #[test]
    fn default_scale_is_unit() {
        let mut mesh = Mesh::new();
        assert_eq!(mesh.scale(), Vec3::new(1.0, 1.0, 1.0));
        mesh.set_scale(2.5);
        assert_eq!(mesh.scale(), Vec3::new(2.5, 2.5, 2.5));
    }
}
